//! artify-rpc — JSON-RPC plumbing for artify-logs.
//!
//! - [`RpcTransport`] — async trait every transport implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — JSON-RPC 2.0 wire types
//! - [`TransportError`] — structured transport error
//! - [`RetryConfig`] — backoff schedule for transient failures
//! - [`HttpTransport`] — `reqwest`-backed HTTP transport

pub mod error;
pub mod http;
pub mod request;
pub mod retry;
pub mod transport;

pub use error::TransportError;
pub use http::{HttpTransport, HttpTransportConfig};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use retry::RetryConfig;
pub use transport::{RequestIds, RpcTransport};
