//! The capabilities the fetcher needs from a chain client, and a JSON-RPC
//! implementation of them.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use artify_core::types::LogFilter;
use artify_rpc::{RequestIds, RpcTransport, TransportError};

use crate::log::{parse_hex_u64, to_hex_quantity, RawLog};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected provider response: {0}")]
    Decode(String),
}

/// Read access to chain height and event history.
#[async_trait]
pub trait LogProvider: Send + Sync {
    /// Latest block height known to the provider.
    async fn block_number(&self) -> Result<u64, ProviderError>;

    /// Logs matching `filter` in `[from, to]`.
    async fn query_logs(
        &self,
        filter: &LogFilter,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>, ProviderError>;
}

#[async_trait]
impl<P: LogProvider + ?Sized> LogProvider for Arc<P> {
    async fn block_number(&self) -> Result<u64, ProviderError> {
        (**self).block_number().await
    }

    async fn query_logs(
        &self,
        filter: &LogFilter,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>, ProviderError> {
        (**self).query_logs(filter, from, to).await
    }
}

// ─── JSON-RPC provider ───────────────────────────────────────────────────────

/// `LogProvider` over any JSON-RPC transport, using `eth_blockNumber` and
/// `eth_getLogs`.
pub struct RpcLogProvider<T> {
    transport: T,
    ids: RequestIds,
}

impl<T: RpcTransport> RpcLogProvider<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            ids: RequestIds::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: RpcTransport> LogProvider for RpcLogProvider<T> {
    async fn block_number(&self) -> Result<u64, ProviderError> {
        let hex: String = self
            .transport
            .call(self.ids.next(), "eth_blockNumber", vec![])
            .await?;
        parse_hex_u64(&hex)
            .ok_or_else(|| ProviderError::Decode(format!("invalid block number {hex:?}")))
    }

    async fn query_logs(
        &self,
        filter: &LogFilter,
        from: u64,
        to: u64,
    ) -> Result<Vec<RawLog>, ProviderError> {
        let params = get_logs_params(filter, from, to);
        let logs: Vec<RawLog> = self
            .transport
            .call(self.ids.next(), "eth_getLogs", vec![params])
            .await?;
        Ok(logs)
    }
}

/// Build the `eth_getLogs` filter object for one chunk.
///
/// Topic positions without a constraint are sent as `null`; trailing
/// wildcards are dropped.
pub fn get_logs_params(filter: &LogFilter, from: u64, to: u64) -> Value {
    let mut obj = json!({
        "fromBlock": to_hex_quantity(from),
        "toBlock": to_hex_quantity(to),
    });

    match filter.addresses.as_slice() {
        [] => {}
        [one] => obj["address"] = json!(one),
        many => obj["address"] = json!(many),
    }

    let mut topics: Vec<Value> = Vec::with_capacity(4);
    topics.push(match filter.topic0_values.as_slice() {
        [] => Value::Null,
        [one] => json!(one),
        many => json!(many),
    });
    for t in &filter.indexed {
        topics.push(t.as_ref().map_or(Value::Null, |v| json!(v)));
    }
    while topics.last().is_some_and(Value::is_null) {
        topics.pop();
    }
    if !topics.is_empty() {
        obj["topics"] = Value::Array(topics);
    }

    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use artify_rpc::{JsonRpcRequest, JsonRpcResponse};
    use std::sync::Mutex;

    #[test]
    fn params_for_address_and_topic0() {
        let f = LogFilter::address("0xabc").topic0("0xddf2");
        let p = get_logs_params(&f, 20_000, 69_999);
        assert_eq!(
            p,
            json!({
                "fromBlock": "0x4e20",
                "toBlock": "0x1116f",
                "address": "0xabc",
                "topics": ["0xddf2"]
            })
        );
    }

    #[test]
    fn params_keep_inner_wildcards() {
        let f = LogFilter::default()
            .topic0("0xa")
            .topic0("0xb")
            .indexed_topic(2, "0xto");
        let p = get_logs_params(&f, 0, 0);
        assert_eq!(p["topics"], json!([["0xa", "0xb"], null, "0xto"]));
        assert!(p.get("address").is_none());
    }

    #[test]
    fn params_without_constraints() {
        let p = get_logs_params(&LogFilter::default(), 1, 2);
        assert!(p.get("topics").is_none());
        assert!(p.get("address").is_none());
    }

    /// Transport that answers from a fixed script and records requests.
    struct Scripted {
        responses: Mutex<Vec<JsonRpcResponse>>,
        seen: Mutex<Vec<JsonRpcRequest>>,
    }

    #[async_trait]
    impl RpcTransport for Scripted {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            self.seen.lock().unwrap().push(req);
            Ok(self.responses.lock().unwrap().remove(0))
        }

        fn url(&self) -> &str {
            "scripted://"
        }
    }

    #[tokio::test]
    async fn rpc_provider_round_trip() {
        let transport = Scripted {
            responses: Mutex::new(vec![
                JsonRpcResponse::ok(1, json!("0x1d4c0")),
                JsonRpcResponse::ok(
                    2,
                    json!([{
                        "address": "0xabc",
                        "topics": [],
                        "data": "0x",
                        "blockNumber": "0x1d4c0",
                        "blockHash": "0x01",
                        "transactionHash": "0x02",
                        "logIndex": "0x0"
                    }]),
                ),
            ]),
            seen: Mutex::new(vec![]),
        };
        let provider = RpcLogProvider::new(transport);

        assert_eq!(provider.block_number().await.unwrap(), 120_000);
        let logs = provider
            .query_logs(&LogFilter::address("0xabc"), 120_000, 120_000)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].block_number(), Some(120_000));

        let seen = provider.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, "eth_blockNumber");
        assert_eq!(seen[1].method, "eth_getLogs");
        assert_eq!(seen[1].params[0]["fromBlock"], "0x1d4c0");
    }

    #[tokio::test]
    async fn rpc_provider_surfaces_node_errors() {
        let transport = Scripted {
            responses: Mutex::new(vec![JsonRpcResponse::err(
                1,
                -32005,
                "query returned more than 10000 results",
            )]),
            seen: Mutex::new(vec![]),
        };
        let provider = RpcLogProvider::new(transport);
        let err = provider
            .query_logs(&LogFilter::default(), 0, 1_000_000)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(ref t) if t.is_range_limit()));
    }

    #[tokio::test]
    async fn rpc_provider_rejects_bad_block_number() {
        let transport = Scripted {
            responses: Mutex::new(vec![JsonRpcResponse::ok(1, json!("latest"))]),
            seen: Mutex::new(vec![]),
        };
        let err = RpcLogProvider::new(transport).block_number().await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
