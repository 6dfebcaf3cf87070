use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::client::ExplorerTx;
use crate::domain::{BroadcastedTx, EventTime, Network, TransactionEvent};

/// Placeholder for signature components the explorer doesn't provide.
const ZERO_HEX: &str = "0x0";

/// Errors converting an explorer transaction into a policy event.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConversionError {
    #[error("invalid {field} '{value}' in transaction {hash}")]
    InvalidNumber {
        hash: String,
        field: &'static str,
        value: String,
    },

    #[error("timestamp {0} out of range")]
    TimestampOutOfRange(i64),
}

fn parse_number(tx: &ExplorerTx, field: &'static str, value: &str) -> Result<u128, ConversionError> {
    value
        .trim()
        .parse::<u128>()
        .map_err(|_| ConversionError::InvalidNumber {
            hash: tx.hash.clone(),
            field,
            value: value.to_string(),
        })
}

/// Parse the explorer's unix-seconds timestamp.
pub fn parse_timestamp(tx: &ExplorerTx) -> Result<DateTime<Utc>, ConversionError> {
    let secs = tx
        .time_stamp
        .trim()
        .parse::<i64>()
        .map_err(|_| ConversionError::InvalidNumber {
            hash: tx.hash.clone(),
            field: "timeStamp",
            value: tx.time_stamp.clone(),
        })?;

    DateTime::from_timestamp(secs, 0).ok_or(ConversionError::TimestampOutOfRange(secs))
}

/// Normalise a recovery id to hex. Decimal values are converted, anything
/// unparseable falls back to `0x0`.
fn v_to_hex(v: Option<&str>) -> String {
    match v {
        Some(v) if v.starts_with("0x") => v.to_string(),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map(|n| format!("{:#x}", n))
            .unwrap_or_else(|_| ZERO_HEX.to_string()),
        None => ZERO_HEX.to_string(),
    }
}

/// Build a broadcasted event from an explorer transaction.
pub fn to_broadcasted_event(
    tx: &ExplorerTx,
    network: &Network,
) -> Result<TransactionEvent, ConversionError> {
    let datetime = parse_timestamp(tx)?;
    let nonce = parse_number(tx, "nonce", &tx.nonce)?;
    let nonce = u64::try_from(nonce).map_err(|_| ConversionError::InvalidNumber {
        hash: tx.hash.clone(),
        field: "nonce",
        value: tx.nonce.clone(),
    })?;
    let gas = parse_number(tx, "gas", &tx.gas)?;
    let gas_price = parse_number(tx, "gasPrice", &tx.gas_price)?;

    Ok(TransactionEvent::broadcasted(
        EventTime::new(datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        BroadcastedTx {
            network: network.clone(),
            from: tx.from.clone(),
            to: tx.to.clone(),
            nonce,
            value: tx.value.clone(),
            data: tx.input.clone(),
            gas_limit: format!("{:#x}", gas),
            gas_price: format!("{:#x}", gas_price),
            r: tx.r.clone().unwrap_or_else(|| ZERO_HEX.to_string()),
            s: tx.s.clone().unwrap_or_else(|| ZERO_HEX.to_string()),
            y_parity_or_v: v_to_hex(tx.v.as_deref()),
        },
    ))
}
