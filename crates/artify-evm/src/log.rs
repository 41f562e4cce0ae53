//! EVM log records as returned by `eth_getLogs`.

use serde::{Deserialize, Serialize};

/// A raw EVM log. Quantities stay hex-encoded as on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: String,
    pub block_hash: String,
    #[serde(rename = "transactionHash")]
    pub tx_hash: String,
    pub log_index: String,
    #[serde(default)]
    pub removed: Option<bool>,
}

impl RawLog {
    pub fn block_number(&self) -> Option<u64> {
        parse_hex_u64(&self.block_number)
    }

    pub fn log_index(&self) -> Option<u64> {
        parse_hex_u64(&self.log_index)
    }

    /// Returns `true` if this log was removed by a reorg.
    pub fn is_removed(&self) -> bool {
        self.removed.unwrap_or(false)
    }

    /// Key used to order logs inside a chunk. Logs with unparseable
    /// positions sort last.
    pub fn position(&self) -> (u64, u64) {
        (
            self.block_number().unwrap_or(u64::MAX),
            self.log_index().unwrap_or(u64::MAX),
        )
    }
}

/// Parse a hex quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return None;
    }
    u64::from_str_radix(s, 16).ok()
}

/// Encode a block number as a JSON-RPC hex quantity.
pub fn to_hex_quantity(n: u64) -> String {
    format!("{n:#x}")
}
