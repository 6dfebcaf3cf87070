pub mod convert;
pub mod scanner;

pub use convert::{to_broadcasted_event, ConversionError};
pub use scanner::{Monitor, MonitorError, MonitorSummary, TxOutcome};
