// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Decoding of the users endpoint. The backend stores schemaless documents,
//! so every field is coerced individually and a bad value only blanks that
//! field.

use folio_app::{PortfolioType, Record, RecordId, SubscriptionTier, VerificationStatus};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

const PORTFOLIO_COUNT_KEYS: [&str; 2] = ["No. of Portfolios", "No. Of Portfolios"];

#[derive(Debug, Deserialize)]
pub(crate) struct UsersEnvelope {
    #[serde(default)]
    pub success: bool,
    pub data: Option<Vec<Value>>,
    pub error: Option<String>,
}

/// Error body some deployments send alongside a non-2xx status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Option<String>,
}

pub(crate) fn decode_records(data: Vec<Value>) -> Result<Vec<Record>, String> {
    data.into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(fields) => Ok(coerce_record(index, &fields)),
            other => Err(format!(
                "data[{index}] is {}, expected an object",
                value_kind(&other)
            )),
        })
        .collect()
}

pub fn coerce_record(index: usize, fields: &Map<String, Value>) -> Record {
    let id = fields
        .get("_id")
        .and_then(id_text)
        .map(RecordId::new)
        .unwrap_or_else(|| RecordId::synthesized(index));

    let mut record = Record::new(id);
    record.member_name = fields.get("Member Name").and_then(text);
    record.username = fields.get("Username").and_then(text);
    record.location = fields.get("Location").and_then(text);
    record.portfolio_type = categorical(fields, "Portfolio Type", PortfolioType::parse);
    record.portfolio_verification =
        categorical(fields, "Portfolio Verification", VerificationStatus::parse);
    record.id_verification = categorical(fields, "ID Verification", VerificationStatus::parse);
    record.subscription = categorical(fields, "Subscription", SubscriptionTier::parse);
    record.portfolio_count = PORTFOLIO_COUNT_KEYS
        .iter()
        .find_map(|key| fields.get(*key))
        .and_then(integer);
    record.size_kb = fields.get("Size (KB)").and_then(number);
    record
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        // Extended JSON, as emitted by some Mongo serializers.
        Value::Object(inner) => inner.get("$oid").and_then(id_text),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn categorical<T>(
    fields: &Map<String, Value>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = fields.get(key)?;
    let Value::String(label) = raw else {
        if !raw.is_null() {
            warn!(field = key, value = %raw, "non-text categorical value dropped");
        }
        return None;
    };
    if label.is_empty() {
        return None;
    }
    let parsed = parse(label);
    if parsed.is_none() {
        warn!(field = key, value = %label, "unrecognized categorical value dropped");
    }
    parsed
}

fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

/// Whole-number reading of a count; fractional values truncate toward zero.
fn integer(value: &Value) -> Option<i64> {
    if let Value::Number(number) = value
        && let Some(whole) = number.as_i64()
    {
        return Some(whole);
    }
    if let Value::String(text) = value
        && let Ok(whole) = text.trim().parse::<i64>()
    {
        return Some(whole);
    }
    number(value).map(|value| value.trunc() as i64)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
