//! ERC-721 helpers for the gallery: mint scans and transfer decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use artify_core::types::LogFilter;

use crate::log::RawLog;

/// `keccak256("Transfer(address,address,uint256)")`.
pub const TRANSFER_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// The zero address left-padded to a 32-byte topic.
pub const ZERO_ADDRESS_TOPIC: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// All `Transfer` events emitted by `contract`.
pub fn transfer_filter(contract: impl Into<String>) -> LogFilter {
    LogFilter::address(contract).topic0(TRANSFER_TOPIC)
}

/// `Transfer` events from the zero address, i.e. mints.
pub fn mint_filter(contract: impl Into<String>) -> LogFilter {
    transfer_filter(contract).indexed_topic(1, ZERO_ADDRESS_TOPIC)
}

/// A decoded ERC-721 `Transfer(from, to, tokenId)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub contract: String,
    pub from: String,
    pub to: String,
    /// Minimal hex encoding of the token id (`0x0`, `0x2a`, ...).
    pub token_id: String,
    pub block_number: u64,
    pub log_index: u64,
    pub tx_hash: String,
}

impl TransferEvent {
    /// Decode an ERC-721 transfer. Returns `None` for anything else,
    /// including ERC-20 transfers (which carry only three topics).
    pub fn from_log(log: &RawLog) -> Option<Self> {
        if log.is_removed() || log.topics.len() != 4 {
            return None;
        }
        if !log.topics[0].eq_ignore_ascii_case(TRANSFER_TOPIC) {
            return None;
        }
        Some(Self {
            contract: log.address.to_ascii_lowercase(),
            from: topic_to_address(&log.topics[1])?,
            to: topic_to_address(&log.topics[2])?,
            token_id: topic_to_quantity(&log.topics[3])?,
            block_number: log.block_number()?,
            log_index: log.log_index()?,
            tx_hash: log.tx_hash.clone(),
        })
    }

    pub fn is_mint(&self) -> bool {
        self.from == ZERO_ADDRESS
    }

    pub fn is_burn(&self) -> bool {
        self.to == ZERO_ADDRESS
    }

    /// The token id as an integer, if it fits in 128 bits.
    pub fn token_id_u128(&self) -> Option<u128> {
        u128::from_str_radix(self.token_id.trim_start_matches("0x"), 16).ok()
    }
}

/// Decode every ERC-721 transfer in `logs`, skipping anything else.
pub fn decode_transfers<'a>(logs: impl IntoIterator<Item = &'a RawLog>) -> Vec<TransferEvent> {
    logs.into_iter().filter_map(TransferEvent::from_log).collect()
}

/// Token id to current owner, for one contract.
pub type Owners = BTreeMap<String, String>;

/// Current owner of each token after replaying `events` in order, grouped
/// by contract. Burned tokens are dropped, and a contract left with no
/// tokens is dropped with them.
pub fn latest_owners(events: &[TransferEvent]) -> BTreeMap<String, Owners> {
    let mut by_contract: BTreeMap<String, Owners> = BTreeMap::new();
    for ev in events {
        if ev.is_burn() {
            if let Some(owners) = by_contract.get_mut(&ev.contract) {
                owners.remove(&ev.token_id);
                if owners.is_empty() {
                    by_contract.remove(&ev.contract);
                }
            }
        } else {
            by_contract
                .entry(ev.contract.clone())
                .or_default()
                .insert(ev.token_id.clone(), ev.to.clone());
        }
    }
    by_contract
}

fn strip_topic(topic: &str) -> Option<&str> {
    let hex = topic.strip_prefix("0x")?;
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(hex)
}

/// The low 20 bytes of a 32-byte topic, as a lowercase `0x` address.
fn topic_to_address(topic: &str) -> Option<String> {
    let hex = strip_topic(topic)?;
    Some(format!("0x{}", hex[24..].to_ascii_lowercase()))
}

/// A 32-byte topic as a minimal hex quantity.
fn topic_to_quantity(topic: &str) -> Option<String> {
    let hex = strip_topic(topic)?.trim_start_matches('0');
    if hex.is_empty() {
        Some("0x0".into())
    } else {
        Some(format!("0x{}", hex.to_ascii_lowercase()))
    }
}
