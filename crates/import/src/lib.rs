pub mod bank;
pub mod csv;
pub mod normalize;

pub use crate::csv::{read_rows, read_rows_from_str, CsvError, DelimitedProfile};
pub use bank::{rows_from_bank_json, rows_from_bank_json_str, BankFeedError, BankTransaction};
pub use normalize::{normalize_row, normalize_rows, NormalizedBatch, RowRejection};
