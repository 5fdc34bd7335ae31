use crate::features::Record;
use crate::pipeline::PredictionOutput;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

impl PingResponse {
    pub fn healthy() -> Self {
        Self { status: "healthy" }
    }

    pub fn unhealthy() -> Self {
        Self { status: "unhealthy" }
    }
}

#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    pub predictions: Vec<i64>,
    pub probabilities: Vec<f64>,
}

impl From<PredictionOutput> for InvocationResponse {
    fn from(output: PredictionOutput) -> Self {
        Self {
            predictions: output.predictions,
            probabilities: output.probabilities,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Parses one invocation body into the batch the pipeline expects.
///
/// Only `application/json` is accepted. The batch is the `data` field when
/// the body is an object carrying one, otherwise the body itself; a single
/// record is wrapped into a one-element batch.
pub fn parse_batch(content_type: Option<&str>, body: &[u8]) -> Result<Vec<Record>> {
    let content_type = content_type.unwrap_or("");
    if !is_json(content_type) {
        return Err(Error::UnsupportedMediaType(content_type.to_string()));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::invalid_request(format!("invalid JSON body: {e}")))?;

    let data = match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    };

    match data {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(Error::invalid_request(format!(
                    "batch elements must be objects, got: {other}"
                ))),
            })
            .collect(),
        other => Err(Error::invalid_request(format!(
            "expected an object or an array of objects, got: {other}"
        ))),
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}
