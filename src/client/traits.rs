use async_trait::async_trait;

use crate::domain::{PolicyDecision, TransactionEvent};

use super::etherscan::{EtherscanError, ExplorerTx};
use super::policy::ClientError;

/// Something that can submit a transaction event for a policy decision.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
    async fn evaluate(&self, event: &TransactionEvent) -> Result<PolicyDecision, ClientError>;
}

/// Source of an address's on-chain transaction history, newest first.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn list_transactions(&self, address: &str) -> Result<Vec<ExplorerTx>, EtherscanError>;
}
