//! HTTP JSON-RPC transport backed by `reqwest`, with retry on transient
//! failures inside a fixed per-call budget.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::retry::RetryConfig;
use crate::transport::RpcTransport;

#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub retry: RetryConfig,
    /// Wall-clock limit for one `send`, every attempt and pause included.
    pub budget: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self::within(Duration::from_secs(30))
    }
}

impl HttpTransportConfig {
    /// Default retry schedule, bounded by `budget`. Pass the fetcher's chunk
    /// timeout so retries finish before the chunk is abandoned.
    pub fn within(budget: Duration) -> Self {
        Self {
            retry: RetryConfig::default(),
            budget,
        }
    }
}

/// HTTP JSON-RPC transport.
pub struct HttpTransport {
    url: String,
    http: reqwest::Client,
    retry: RetryConfig,
    budget: Duration,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpTransportConfig) -> Result<Self, TransportError> {
        let url = url.into();
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        if !config.retry.fits_within(config.budget) {
            tracing::warn!(
                url = %url,
                budget_ms = config.budget.as_millis() as u64,
                backoff_ms = config.retry.total_backoff().as_millis() as u64,
                "retry backoff exceeds the call budget, later retries will be skipped"
            );
        }

        Ok(Self {
            url,
            http,
            retry: config.retry,
            budget: config.budget,
        })
    }

    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpTransportConfig::default())
    }

    async fn send_once(
        &self,
        req: &JsonRpcRequest,
        timeout: Duration,
    ) -> Result<JsonRpcResponse, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .timeout(timeout)
            .json(req)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        ms: timeout.as_millis() as u64,
                    }
                } else if e.is_connect() {
                    TransportError::Http(e.to_string())
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    ms: timeout.as_millis() as u64,
                }
            } else {
                TransportError::Other(e.to_string())
            }
        })?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let deadline = Instant::now() + self.budget;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());
            let err = match self.send_once(&req, remaining).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            let Some(delay) = self.retry.backoff(attempt) else {
                tracing::error!(
                    attempt,
                    error = %err,
                    url = %self.url,
                    method = %req.method,
                    "max retries exceeded"
                );
                return Err(err);
            };
            if Instant::now() + delay >= deadline {
                tracing::warn!(
                    attempt,
                    error = %err,
                    url = %self.url,
                    method = %req.method,
                    "call budget spent, not retrying"
                );
                return Err(err);
            }

            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                url = %self.url,
                method = %req.method,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    const BLOCK_NUMBER_OK: &str = r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#;

    fn fast_retry(budget: Duration, initial_backoff: Duration) -> HttpTransportConfig {
        HttpTransportConfig {
            retry: RetryConfig {
                max_retries: 3,
                initial_backoff,
                max_backoff: Duration::from_secs(1),
            },
            budget,
        }
    }

    /// Read one HTTP/1.1 request (headers plus `Content-Length` body).
    async fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(split) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..split]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= split + 4 + body_len {
                return;
            }
        }
    }

    /// Serve `replies` as `(status line, body)` in order, repeating the last
    /// one. Returns the endpoint URL and a hit counter.
    async fn serve(replies: Vec<(&'static str, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let (mut stream, _) = listener.accept().await.unwrap();
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = replies[n.min(replies.len() - 1)];
                read_request(&mut stream).await;
                let resp = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(resp.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });
        (url, hits)
    }

    #[tokio::test]
    async fn transient_failure_recovered_inside_budget() {
        let budget = Duration::from_secs(2);
        let (url, hits) = serve(vec![
            ("503 Service Unavailable", "busy"),
            ("200 OK", BLOCK_NUMBER_OK),
        ])
        .await;
        let transport =
            HttpTransport::new(url, fast_retry(budget, Duration::from_millis(20))).unwrap();

        let resp = tokio::time::timeout(
            budget,
            transport.send(JsonRpcRequest::new(1, "eth_blockNumber", vec![])),
        )
        .await
        .expect("retry finished inside the budget")
        .unwrap();
        assert_eq!(resp.into_result().unwrap(), serde_json::json!("0x10"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let (url, hits) = serve(vec![("413 Payload Too Large", "too big")]).await;
        let transport =
            HttpTransport::new(url, fast_retry(Duration::from_secs(2), Duration::from_millis(1)))
                .unwrap();

        let err = transport
            .send(JsonRpcRequest::new(1, "eth_getLogs", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 413, .. }), "{err}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_not_retried() {
        let (url, hits) = serve(vec![("200 OK", "<html>gateway</html>")]).await;
        let transport =
            HttpTransport::new(url, fast_retry(Duration::from_secs(2), Duration::from_millis(1)))
                .unwrap();

        let err = transport
            .send(JsonRpcRequest::new(1, "eth_blockNumber", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Deserialization(_)), "{err}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stops_retrying_when_backoff_outruns_budget() {
        let (url, hits) = serve(vec![("503 Service Unavailable", "busy")]).await;
        let transport = HttpTransport::new(
            url,
            fast_retry(Duration::from_millis(300), Duration::from_secs(1)),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let err = transport
            .send(JsonRpcRequest::new(1, "eth_blockNumber", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 503, .. }), "{err}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_after_retries() {
        let transport = HttpTransport::new(
            "http://127.0.0.1:1",
            fast_retry(Duration::from_secs(2), Duration::from_millis(1)),
        )
        .unwrap();
        assert_eq!(transport.url(), "http://127.0.0.1:1");

        let err = transport
            .send(JsonRpcRequest::new(1, "eth_blockNumber", vec![]))
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "unexpected error: {err}");
    }
}
