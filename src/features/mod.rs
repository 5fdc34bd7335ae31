//! Tabular feature normalization.
//!
//! The fitted classifier was trained on lowercase string renderings of every
//! textual and boolean column, so inbound records get the same treatment
//! before prediction. Numeric columns pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One input sample: field name to scalar value.
pub type Record = Map<String, Value>;

/// Declared type of a model feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Categorical,
    Numeric,
}

/// Decides a type for every column appearing in the batch.
///
/// A type declared by the model schema wins; columns the schema does not know
/// are classified from the batch's own values, where a single string or
/// boolean anywhere in the column makes the whole column categorical.
pub fn classify_columns(
    batch: &[Record],
    declared: &HashMap<String, FieldType>,
) -> HashMap<String, FieldType> {
    let mut columns: HashMap<String, FieldType> = HashMap::new();
    for record in batch {
        for (name, value) in record {
            if let Some(field_type) = declared.get(name) {
                columns.insert(name.clone(), *field_type);
                continue;
            }
            let entry = columns.entry(name.clone()).or_insert(FieldType::Numeric);
            if matches!(value, Value::String(_) | Value::Bool(_)) {
                *entry = FieldType::Categorical;
            }
        }
    }
    columns
}

/// Coerces every categorical column to canonical lowercase string form.
///
/// Column-wide coercion means a number sharing a column with strings is
/// rendered as a string too. Missing and extra fields flow through as-is;
/// normalizing an already-normalized batch is a no-op.
pub fn normalize(batch: &[Record], declared: &HashMap<String, FieldType>) -> Vec<Record> {
    let columns = classify_columns(batch, declared);

    batch
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|(name, value)| {
                    let normalized = match columns.get(name) {
                        Some(FieldType::Categorical) => lowercase_value(value),
                        _ => value.clone(),
                    };
                    (name.clone(), normalized)
                })
                .collect()
        })
        .collect()
}

fn lowercase_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        other => other.clone(),
    }
}
