//! Conversion of bank-API transaction feeds into raw rows.
//!
//! The fetch client hands over the provider's JSON unchanged: either a bare
//! array of transactions or an object with a `transactions` array. Each record
//! needs `date`, `name` and `amount`; everything else is ignored.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use zombie_core::RawRow;

#[derive(Error, Debug)]
pub enum BankFeedError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a transaction list, found {0}")]
    UnexpectedShape(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankTransaction {
    pub date: String,
    pub name: String,
    pub amount: Value,
}

impl BankTransaction {
    pub fn to_raw_row(&self) -> RawRow {
        let amount = match &self.amount {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        [
            ("Date", self.date.clone()),
            ("Description", self.name.clone()),
            ("Amount", amount),
        ]
        .into_iter()
        .collect()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without a transactions array",
    }
}

pub fn rows_from_bank_json(value: &Value) -> Result<Vec<RawRow>, BankFeedError> {
    let list = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("transactions") {
            Some(Value::Array(items)) => items,
            _ => return Err(BankFeedError::UnexpectedShape(value_kind(value))),
        },
        other => return Err(BankFeedError::UnexpectedShape(value_kind(other))),
    };

    list.iter()
        .map(|item| {
            let tx: BankTransaction = serde_json::from_value(item.clone())?;
            Ok(tx.to_raw_row())
        })
        .collect()
}

pub fn rows_from_bank_json_str(json: &str) -> Result<Vec<RawRow>, BankFeedError> {
    let value: Value = serde_json::from_str(json)?;
    rows_from_bank_json(&value)
}
