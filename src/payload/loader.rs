use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::{EventKind, TransactionEvent};

/// Errors that can occur while loading a payload file.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("expected a {expected} payload, found {found}")]
    WrongKind { expected: EventKind, found: EventKind },
}

/// Load a transaction event from a JSON or YAML file.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else as JSON.
pub fn load_event(path: impl AsRef<Path>) -> Result<TransactionEvent, PayloadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let event = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    Ok(event)
}

/// Reject an event whose variant doesn't match what the caller submits.
pub fn expect_kind(event: &TransactionEvent, expected: EventKind) -> Result<(), PayloadError> {
    let found = event.kind();
    if found != expected {
        return Err(PayloadError::WrongKind { expected, found });
    }
    Ok(())
}
