use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{EtherscanError, ExplorerTx, PolicyEvaluator, TransactionSource};
use crate::domain::{Classification, Network, PolicyDecision};

use super::convert::{parse_timestamp, to_broadcasted_event};

/// Errors that abort a monitoring run.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("failed to list transactions: {0}")]
    Source(#[from] EtherscanError),
}

/// Outcome of evaluating one inbound transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TxOutcome {
    pub hash: String,
    pub result: Result<PolicyDecision, String>,
}

/// Tally of a monitoring run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorSummary {
    /// Inbound transactions inside the lookback window
    pub scanned: usize,
    pub automated: usize,
    pub manual_review: usize,
    pub unrecognized: usize,
    /// Transactions that could not be converted or evaluated
    pub failed: usize,
    pub outcomes: Vec<TxOutcome>,
}

impl MonitorSummary {
    fn record(&mut self, hash: &str, result: Result<PolicyDecision, String>) {
        match &result {
            Ok(decision) => match decision.classify() {
                Classification::Automated => self.automated += 1,
                Classification::ManualReview => self.manual_review += 1,
                Classification::Unrecognized(_) => self.unrecognized += 1,
            },
            Err(_) => self.failed += 1,
        }
        self.outcomes.push(TxOutcome {
            hash: hash.to_string(),
            result,
        });
    }
}

/// Scans an address's recent inbound transactions and submits each one
/// for a policy decision.
pub struct Monitor {
    source: Arc<dyn TransactionSource>,
    evaluator: Arc<dyn PolicyEvaluator>,
    network: Network,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn TransactionSource>,
        evaluator: Arc<dyn PolicyEvaluator>,
        network: Network,
    ) -> Self {
        Monitor {
            source,
            evaluator,
            network,
        }
    }

    /// Evaluate transactions sent to `address` within the last `lookback`.
    pub async fn run(&self, address: &str, lookback: Duration) -> Result<MonitorSummary, MonitorError> {
        self.run_since(address, Utc::now() - lookback).await
    }

    /// Evaluate transactions sent to `address` at or after `cutoff`.
    ///
    /// Events are submitted one at a time. A transaction that fails to
    /// convert or evaluate is counted and the scan moves on.
    pub async fn run_since(
        &self,
        address: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<MonitorSummary, MonitorError> {
        let address = address.to_lowercase();
        let txs = self.source.list_transactions(&address).await?;
        let inbound = inbound_since(txs, &address, cutoff);

        info!(
            address = %address,
            cutoff = %cutoff,
            count = inbound.len(),
            "Found inbound transactions"
        );

        let mut summary = MonitorSummary {
            scanned: inbound.len(),
            ..Default::default()
        };

        for tx in &inbound {
            let event = match to_broadcasted_event(tx, &self.network) {
                Ok(event) => event,
                Err(e) => {
                    warn!(hash = %tx.hash, error = %e, "Skipping unconvertible transaction");
                    summary.record(&tx.hash, Err(e.to_string()));
                    continue;
                }
            };

            match self.evaluator.evaluate(&event).await {
                Ok(decision) => {
                    if let Classification::Unrecognized(action) = decision.classify() {
                        warn!(hash = %tx.hash, action = %action, "Unrecognized policy action");
                    }
                    summary.record(&tx.hash, Ok(decision));
                }
                Err(e) => {
                    warn!(hash = %tx.hash, error = %e, "Failed to evaluate transaction");
                    summary.record(&tx.hash, Err(e.to_string()));
                }
            }
        }

        Ok(summary)
    }
}

/// Keep transactions addressed to `address` with a timestamp at or after `cutoff`.
fn inbound_since(txs: Vec<ExplorerTx>, address: &str, cutoff: DateTime<Utc>) -> Vec<ExplorerTx> {
    txs.into_iter()
        .filter(|tx| !tx.to.is_empty() && tx.to.eq_ignore_ascii_case(address))
        .filter(|tx| match parse_timestamp(tx) {
            Ok(ts) => ts >= cutoff,
            Err(_) => {
                warn!(hash = %tx.hash, time_stamp = %tx.time_stamp, "Unparseable timestamp");
                false
            }
        })
        .collect()
}
