pub mod etherscan;
pub mod policy;
pub mod traits;

pub use etherscan::{EtherscanClient, EtherscanError, ExplorerTx, DEFAULT_ETHERSCAN_URL};
pub use policy::{BearerToken, ClientError, PolicyEventClient, DEFAULT_ENDPOINT};
pub use traits::{PolicyEvaluator, TransactionSource};
