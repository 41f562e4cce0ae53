//! Error types for chunked log retrieval.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a fetch before (or instead of) scanning any chunk.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no log provider configured")]
    NoProvider,

    #[error("invalid fetch configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl FetchError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors caused by how the fetcher was set up rather
    /// than by the chain provider.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::NoProvider | Self::InvalidConfig { .. })
    }
}

/// Failure of a single chunk query. Recorded in the report, never escalated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ChunkError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("chunk query timed out after {ms}ms")]
    Timeout { ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_flagged() {
        assert!(FetchError::NoProvider.is_config());
        assert!(FetchError::invalid_config("zero width").is_config());
        assert!(!FetchError::Rpc("boom".into()).is_config());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            FetchError::invalid_config("max_chunk_width must be at least 1").to_string(),
            "invalid fetch configuration: max_chunk_width must be at least 1"
        );
        assert_eq!(
            ChunkError::Timeout { ms: 1500 }.to_string(),
            "chunk query timed out after 1500ms"
        );
    }
}
