use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One previously sent item. Serialized as `{"id": 603, "date": "2024-05-01"}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HistoryEntry {
    pub id: u64,
    #[serde(rename = "date")]
    pub sent_on: NaiveDate,
}

impl HistoryEntry {
    pub fn new(id: u64, sent_on: NaiveDate) -> Self {
        Self { id, sent_on }
    }

    /// Date given to entries that carry no usable date (legacy bare ids,
    /// unparseable strings). Old enough to never block a repeat.
    pub fn epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
    }
}
