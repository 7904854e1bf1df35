use chrono::NaiveDate;
use rust_decimal::Decimal;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;
use zombie_core::{Amount, RawRow, Transaction};

/// Source labels accepted for each canonical field, highest priority first.
pub const DESCRIPTION_ALIASES: &[&str] = &["Description", "Payee"];
pub const AMOUNT_ALIASES: &[&str] = &["Amount"];
pub const DATE_ALIASES: &[&str] = &["Date", "Transaction Date"];

/// Accepted date layouts, tried in order; the first that parses wins.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Why a raw row did not become a transaction. Rejections are expected noise,
/// never an error for the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    #[error("missing description")]
    MissingDescription,
    #[error("invalid amount: '{0}'")]
    InvalidAmount(String),
    #[error("invalid date: '{0}'")]
    InvalidDate(String),
}

/// Valid transactions plus how many rows were dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub transactions: Vec<Transaction>,
    pub dropped: usize,
}

pub fn normalize_row(row: &RawRow) -> Result<Transaction, RowRejection> {
    let description = row
        .first_present(DESCRIPTION_ALIASES)
        .map(str::trim)
        .unwrap_or_default();
    if description.is_empty() {
        return Err(RowRejection::MissingDescription);
    }

    let raw_amount = row.first_present(AMOUNT_ALIASES).unwrap_or_default();
    let amount = parse_amount(raw_amount)?;

    let raw_date = row.first_present(DATE_ALIASES).unwrap_or_default();
    let date = parse_date(raw_date)?;

    Transaction::on_date(description, amount, date).map_err(|_| RowRejection::MissingDescription)
}

/// Normalize a batch, silently dropping rows that fail validation.
pub fn normalize_rows(rows: &[RawRow]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, row) in rows.iter().enumerate() {
        match normalize_row(row) {
            Ok(tx) => batch.transactions.push(tx),
            Err(reason) => {
                debug!("Dropping row {}: {reason}", index + 1);
                batch.dropped += 1;
            }
        }
    }
    batch
}

pub fn parse_date(s: &str) -> Result<NaiveDate, RowRejection> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| RowRejection::InvalidDate(s.to_string()))
}

/// Lenient about `$` and accounting parentheses. Commas are only accepted as
/// thousands separators (`1,234.56`); `30,00` or `1,2` are invalid.
pub fn parse_amount(s: &str) -> Result<Amount, RowRejection> {
    let s = s.trim();
    let invalid = || RowRejection::InvalidAmount(s.to_string());
    let (negative, body) = if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    let body = body.replace(['$', ' '], "");
    let (sign, digits) = match body.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", body.as_str()),
    };
    if digits.contains(',') && !thousands_grouped().is_match(digits) {
        return Err(invalid());
    }
    let clean = format!("{sign}{}", digits.replace(',', ""));

    let mut dec = Decimal::from_str(&clean).map_err(|_| invalid())?;
    if negative {
        dec = -dec;
    }
    Ok(Amount::from_decimal(dec))
}

fn thousands_grouped() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^\d{1,3}(,\d{3})+(\.\d+)?$").expect("invalid regex"))
}
