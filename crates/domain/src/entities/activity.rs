use crate::enums::ActivityDirection;
use crate::value_objects::amount::TokenAmount;
use crate::value_objects::asset_type::{AssetType, NAMESPACE_SEPARATOR};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counterparty label used when the other side of a transfer is unknown.
pub const EXTERNAL_PARTY: &str = "External";

/// Activity types containing this marker credit the owner.
pub const DEPOSIT_EVENT_MARKER: &str = "DepositEvent";

/// One row of the indexer's fungible asset activity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub transaction_version: u64,
    pub event_index: u64,
    pub owner_address: String,
    pub asset_type: Option<AssetType>,
    pub amount: Option<TokenAmount>,
    pub activity_type: String,
    pub transaction_timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    /// Identity of the event within the chain.
    pub fn event_key(&self) -> (u64, u64) {
        (self.transaction_version, self.event_index)
    }

    pub fn is_deposit(&self) -> bool {
        self.activity_type.contains(DEPOSIT_EVENT_MARKER)
    }
}

/// Transaction history line shown on the activity tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub hash: String,
    pub success: bool,
    pub kind: String,
    pub sender: String,
    pub receiver: String,
    pub amount: Option<TokenAmount>,
    /// Unix seconds.
    pub timestamp: i64,
    pub version: String,
    pub direction: ActivityDirection,
}

impl HistoryEntry {
    /// Builds a history line for `owner` from an indexer activity row.
    pub fn from_activity(record: &ActivityRecord, owner: &str) -> Self {
        let kind = record
            .activity_type
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(record.activity_type.as_str())
            .to_string();

        let (sender, receiver, direction) = if record.is_deposit() {
            (EXTERNAL_PARTY.to_string(), owner.to_string(), ActivityDirection::Received)
        } else {
            (owner.to_string(), EXTERNAL_PARTY.to_string(), ActivityDirection::Sent)
        };

        Self {
            hash: format!("0x{}", record.transaction_version),
            success: true,
            kind,
            sender,
            receiver,
            amount: record.amount,
            timestamp: record.transaction_timestamp.timestamp(),
            version: record.transaction_version.to_string(),
            direction,
        }
    }
}
