use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::ItemId;

/// Timestamped sample record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub timestamp: NaiveDateTime,
}
