use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain network identifier (e.g. "eth").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Network(pub String);

impl Network {
    pub fn new(network: impl Into<String>) -> Self {
        Network(network.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO-8601 timestamp, kept exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTime(pub String);

impl EventTime {
    pub fn new(datetime: impl Into<String>) -> Self {
        EventTime(datetime.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signed transaction that has already been sent to the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastedTx {
    pub network: Network,
    pub from: String,
    pub to: String,
    pub nonce: u64,

    /// Amount in base units (decimal string)
    pub value: String,

    /// Call data, hex encoded
    pub data: String,

    pub gas_limit: String,
    pub gas_price: String,

    /// Signature components
    pub r: String,
    pub s: String,
    pub y_parity_or_v: String,
}

/// A transaction that has not been signed or sent yet (EIP-1559 fee model).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebroadcastTx {
    pub network: Network,
    pub from: String,
    pub to: String,
    pub gas_limit: String,
    pub max_fee_per_gas: String,

    /// Amount in base units (decimal string)
    pub value: String,

    pub max_priority_fee_per_gas: String,
    pub nonce: u64,

    /// Call data, hex encoded
    pub input: String,
}

/// Transaction event submitted to the policy endpoint.
///
/// Each variant carries only the fields valid for its kind, so a payload that
/// mixes signature components with pre-broadcast fee fields cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TransactionEvent {
    #[serde(rename = "transaction:broadcasted")]
    Broadcasted {
        /// When the transaction was broadcast
        datetime: EventTime,
        data: BroadcastedTx,
    },

    #[serde(rename = "transaction:prebroadcast")]
    Prebroadcast { data: PrebroadcastTx },
}

/// Discriminant of a [`TransactionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Broadcasted,
    Prebroadcast,
}

impl EventKind {
    /// Wire value of the `kind` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Broadcasted => "transaction:broadcasted",
            EventKind::Prebroadcast => "transaction:prebroadcast",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TransactionEvent {
    /// Create a broadcasted event.
    pub fn broadcasted(datetime: EventTime, data: BroadcastedTx) -> Self {
        TransactionEvent::Broadcasted { datetime, data }
    }

    /// Create a pre-broadcast event.
    pub fn prebroadcast(data: PrebroadcastTx) -> Self {
        TransactionEvent::Prebroadcast { data }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            TransactionEvent::Broadcasted { .. } => EventKind::Broadcasted,
            TransactionEvent::Prebroadcast { .. } => EventKind::Prebroadcast,
        }
    }

    pub fn network(&self) -> &Network {
        match self {
            TransactionEvent::Broadcasted { data, .. } => &data.network,
            TransactionEvent::Prebroadcast { data } => &data.network,
        }
    }

    /// Sender address.
    pub fn from(&self) -> &str {
        match self {
            TransactionEvent::Broadcasted { data, .. } => &data.from,
            TransactionEvent::Prebroadcast { data } => &data.from,
        }
    }

    /// Recipient address.
    pub fn to(&self) -> &str {
        match self {
            TransactionEvent::Broadcasted { data, .. } => &data.to,
            TransactionEvent::Prebroadcast { data } => &data.to,
        }
    }
}
