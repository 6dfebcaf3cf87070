pub mod client;
pub mod config;
pub mod domain;
pub mod monitor;
pub mod observability;
pub mod payload;
pub mod report;

pub use client::{BearerToken, ClientError, PolicyEventClient};
pub use config::Config;
pub use domain::{Classification, PolicyAction, PolicyDecision, TransactionEvent};
