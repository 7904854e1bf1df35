use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;
use tracing::debug;
use zombie_core::RawRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelimitedProfile {
    pub delimiter: u8,
}

impl Default for DelimitedProfile {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl DelimitedProfile {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Header-driven reader: the first record supplies the labels for every
/// following record.
pub struct DelimitedReader;

impl DelimitedReader {
    pub fn parse_rows<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<RawRow>, CsvError> {
        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();

        for (index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                // An undecodable record is noise, not a reason to drop the file.
                Err(e) if !is_fatal(&e) => {
                    debug!("Skipping undecodable record {}: {e}", index + 1);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .filter(|(label, _)| !label.is_empty())
                .map(|(label, value)| (label.to_string(), value.to_string()))
                .collect();
            rows.push(row);
        }

        Ok(rows)
    }

}

fn is_fatal(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(_))
}

fn reader_for<R: Read>(data: R, profile: &DelimitedProfile) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(profile.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data)
}

/// Parse delimited text into raw rows. Blank lines and undecodable records
/// are skipped; a file with only a header yields no rows.
pub fn read_rows<R: Read>(data: R, profile: &DelimitedProfile) -> Result<Vec<RawRow>, CsvError> {
    let mut reader = reader_for(data, profile);
    DelimitedReader::parse_rows(&mut reader)
}

pub fn read_rows_from_str(text: &str, profile: &DelimitedProfile) -> Result<Vec<RawRow>, CsvError> {
    read_rows(text.as_bytes(), profile)
}
