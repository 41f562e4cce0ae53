//! artify-core — chain-agnostic building blocks for chunked log retrieval.
//!
//! # Architecture
//!
//! ```text
//! FetchConfig ──► lookback_range() ──► ChunkIter ──► per-chunk query
//!                                                        │
//!                                          ChunkOutcome (Ok(logs) | Err(ChunkError))
//!                                                        │
//!                                                   FetchReport
//! ```
//!
//! The provider-facing fetcher lives in `artify-evm`; this crate only knows
//! about block ranges, filters, configuration and results.

pub mod chunk;
pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use chunk::{lookback_range, plan_chunks, ChunkIter};
pub use config::{FetchConfig, Lookback};
pub use error::{ChunkError, FetchError};
pub use report::{ChunkOutcome, FetchReport};
pub use types::{BlockRange, LogFilter};
