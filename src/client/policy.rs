use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{PolicyDecision, TransactionEvent};

use super::traits::PolicyEvaluator;

/// Production policy-evaluation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.web3firewall.io/api/v1/policy/event";

/// Errors returned by [`PolicyEventClient::evaluate`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    TransportFailure(#[from] reqwest::Error),

    #[error("endpoint rejected the event with status {status}: {}", .body.as_deref().unwrap_or("<empty body>"))]
    RemoteRejection { status: u16, body: Option<String> },

    #[error("invalid response body ({source}): {body}")]
    InvalidResponse {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("bearer token must not be empty")]
    InvalidToken,
}

/// Pre-issued credential sent as `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ClientError::InvalidToken);
        }
        Ok(BearerToken(token))
    }

    fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Client for the policy-evaluation endpoint.
///
/// Each call is a single POST with no retry. Idle connections are not
/// pooled, so nothing outlives the request.
#[derive(Debug, Clone)]
pub struct PolicyEventClient {
    http: Client,
    endpoint: String,
    token: BearerToken,
}

impl PolicyEventClient {
    /// Create a client for `endpoint` with the given request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        token: BearerToken,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .user_agent(concat!("txguard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(PolicyEventClient {
            http,
            endpoint: endpoint.into(),
            token,
        })
    }

    /// Submit an event and return the endpoint's decision unchanged.
    pub async fn evaluate(&self, event: &TransactionEvent) -> Result<PolicyDecision, ClientError> {
        debug!(
            endpoint = %self.endpoint,
            kind = %event.kind(),
            network = %event.network(),
            "Submitting transaction event"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, self.token.header_value())
            .header(CONTENT_TYPE, "application/json")
            .json(event)
            .send()
            .await?;

        let status = response.status();

        // The server answered; a body that can't be read is just absent
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            warn!(status = status.as_u16(), "Policy endpoint rejected event");
            return Err(ClientError::RemoteRejection {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;

        let decision: PolicyDecision = serde_json::from_str(&body)
            .map_err(|source| ClientError::InvalidResponse { source, body })?;

        info!(
            action = %decision.action_to_take,
            event_id = decision.event_id_or_na(),
            "Policy decision received"
        );

        Ok(decision)
    }
}

#[async_trait]
impl PolicyEvaluator for PolicyEventClient {
    async fn evaluate(&self, event: &TransactionEvent) -> Result<PolicyDecision, ClientError> {
        PolicyEventClient::evaluate(self, event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Network, PolicyAction, PrebroadcastTx};
    use crate::observability::tracing::init_test_tracing;
    use mockito::{Matcher, Server};

    fn prebroadcast_event() -> TransactionEvent {
        TransactionEvent::prebroadcast(PrebroadcastTx {
            network: Network::new("ETH"),
            from: "0x72a5843cc08275C8171E582972Aa42Da8C397B2A".to_string(),
            to: "0xA160cdAB225685dA1d56aa342Ad8841c3b53f291".to_string(),
            gas_limit: "1".to_string(),
            max_fee_per_gas: "1".to_string(),
            value: "1".to_string(),
            max_priority_fee_per_gas: "1".to_string(),
            nonce: 1,
            input: "0x".to_string(),
        })
    }

    fn client_for(url: String) -> PolicyEventClient {
        PolicyEventClient::new(
            url,
            BearerToken::new("test-token").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(BearerToken::new(""), Err(ClientError::InvalidToken)));
        assert!(matches!(BearerToken::new("   "), Err(ClientError::InvalidToken)));
    }

    #[test]
    fn test_token_debug_redacted() {
        let token = BearerToken::new("super-secret").unwrap();
        assert!(!format!("{:?}", token).contains("super-secret"));
    }

    #[tokio::test]
    async fn test_evaluate_passes_decision_through() {
        init_test_tracing();
        let mut server = Server::new_async().await;
        let event = prebroadcast_event();

        let mock = server
            .mock("POST", "/api/v1/policy/event")
            .match_header("authorization", "Bearer test-token")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::to_value(&event).unwrap()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"actionToTake":"allow","eventId":"E1"}"#)
            .create_async()
            .await;

        let client = client_for(format!("{}/api/v1/policy/event", server.url()));
        let decision = client.evaluate(&event).await.unwrap();

        assert_eq!(decision, PolicyDecision::new(PolicyAction::new("allow"), "E1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_evaluate_remote_rejection_carries_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(500)
            .with_body(r#"{"error":"bad payload"}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.evaluate(&prebroadcast_event()).await.unwrap_err();

        match err {
            ClientError::RemoteRejection { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.as_deref(), Some(r#"{"error":"bad payload"}"#));
            }
            other => panic!("expected RemoteRejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_evaluate_rejection_without_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.evaluate(&prebroadcast_event()).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::RemoteRejection { status: 401, body: None }
        ));
    }

    #[tokio::test]
    async fn test_evaluate_connection_refused() {
        // Grab a free port, then release it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}/api/v1/policy/event", addr));
        let err = client.evaluate(&prebroadcast_event()).await.unwrap_err();

        assert!(matches!(err, ClientError::TransportFailure(_)));
    }

    /// Read one HTTP request (headers plus Content-Length body) off the socket.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        use tokio::io::AsyncReadExt;

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn test_evaluate_truncated_error_body_is_rejection() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\n{\"error\"",
                )
                .await
                .unwrap();
            let _ = socket.shutdown().await;
        });

        let client = client_for(format!("http://{}/", addr));
        let err = client.evaluate(&prebroadcast_event()).await.unwrap_err();

        assert!(matches!(err, ClientError::RemoteRejection { status: 500, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_evaluate_timeout_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept and hold the connection without ever answering
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let client = PolicyEventClient::new(
            format!("http://{}/", addr),
            BearerToken::new("test-token").unwrap(),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = client.evaluate(&prebroadcast_event()).await.unwrap_err();

        match err {
            ClientError::TransportFailure(e) => assert!(e.is_timeout()),
            other => panic!("expected TransportFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_evaluate_invalid_json_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.evaluate(&prebroadcast_event()).await.unwrap_err();

        match err {
            ClientError::InvalidResponse { body, .. } => assert_eq!(body, "<html>gateway</html>"),
            other => panic!("expected InvalidResponse, got {other:?}"),
        }
    }
}
