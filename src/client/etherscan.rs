use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::traits::TransactionSource;

/// Public Etherscan API base URL.
pub const DEFAULT_ETHERSCAN_URL: &str = "https://api.etherscan.io/api";

/// Message Etherscan returns alongside status "0" for an empty history.
const NO_TRANSACTIONS: &str = "No transactions found";

/// Errors that can occur while listing transactions.
#[derive(Error, Debug)]
pub enum EtherscanError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("explorer returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("explorer API error: {message} ({detail})")]
    Api { message: String, detail: String },

    #[error("unexpected explorer response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Transaction as listed by the explorer. All numeric fields are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTx {
    pub hash: String,
    pub time_stamp: String,
    pub nonce: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    pub gas: String,
    pub gas_price: String,
    #[serde(default)]
    pub input: String,

    // Not part of the txlist response, but honoured when a source provides them
    #[serde(default)]
    pub r: Option<String>,
    #[serde(default)]
    pub s: Option<String>,
    #[serde(default)]
    pub v: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Etherscan `account/txlist` client.
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EtherscanError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(EtherscanClient {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TransactionSource for EtherscanClient {
    async fn list_transactions(&self, address: &str) -> Result<Vec<ExplorerTx>, EtherscanError> {
        debug!(address = address, "Fetching transaction list");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("sort", "desc"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EtherscanError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let list: TxListResponse = serde_json::from_str(&body)?;

        if list.status != "1" {
            if list.message == NO_TRANSACTIONS {
                return Ok(Vec::new());
            }

            // On failure `result` holds a human-readable reason
            let detail = match list.result {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            warn!(message = %list.message, detail = %detail, "Explorer API error");
            return Err(EtherscanError::Api {
                message: list.message,
                detail,
            });
        }

        let txs: Vec<ExplorerTx> = serde_json::from_value(list.result)?;
        debug!(address = address, count = txs.len(), "Fetched transactions");

        Ok(txs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const TXLIST_OK: &str = r#"{
        "status": "1",
        "message": "OK",
        "result": [
            {
                "blockNumber": "19000000",
                "timeStamp": "1740051499",
                "hash": "0xabc",
                "nonce": "16469",
                "from": "0x61ed4b62e03798305818607c7160b2abff15cfed",
                "to": "0xd756bf764ad08e0b67e7466ffa7a52d788935344",
                "value": "1000000000",
                "gas": "30400",
                "gasPrice": "10000000000000",
                "isError": "0",
                "input": "0x",
                "confirmations": "12"
            }
        ]
    }"#;

    fn client_for(server: &Server) -> EtherscanClient {
        EtherscanClient::new(server.url(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_transactions() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("module".into(), "account".into()),
                Matcher::UrlEncoded("action".into(), "txlist".into()),
                Matcher::UrlEncoded("address".into(), "0xd756".into()),
                Matcher::UrlEncoded("sort".into(), "desc".into()),
                Matcher::UrlEncoded("apikey".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_body(TXLIST_OK)
            .create_async()
            .await;

        let txs = client_for(&server).list_transactions("0xd756").await.unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].hash, "0xabc");
        assert_eq!(txs[0].gas_price, "10000000000000");
        assert_eq!(txs[0].v, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_transactions_is_empty() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"0","message":"No transactions found","result":[]}"#)
            .create_async()
            .await;

        let txs = client_for(&server).list_transactions("0x1").await.unwrap();
        assert!(txs.is_empty());
    }

    #[tokio::test]
    async fn test_api_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#)
            .create_async()
            .await;

        let err = client_for(&server).list_transactions("0x1").await.unwrap_err();

        assert!(matches!(err, EtherscanError::Api { .. }));
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = client_for(&server).list_transactions("0x1").await.unwrap_err();
        assert!(matches!(err, EtherscanError::Status { status: 503, .. }));
    }
}
