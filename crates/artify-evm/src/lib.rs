//! artify-evm — chunked EVM log fetcher, JSON-RPC log provider and ERC-721
//! gallery scans.

pub mod builder;
pub mod fetcher;
pub mod log;
pub mod nft;
pub mod provider;

pub use builder::FetcherBuilder;
pub use fetcher::ChunkedLogFetcher;
pub use log::RawLog;
pub use nft::{mint_filter, transfer_filter, TransferEvent};
pub use provider::{LogProvider, ProviderError, RpcLogProvider};
