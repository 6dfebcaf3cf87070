pub mod decision;
pub mod event;

pub use decision::{ActionKind, Classification, PolicyAction, PolicyDecision};
pub use event::{BroadcastedTx, EventKind, EventTime, Network, PrebroadcastTx, TransactionEvent};
