use serde::{Deserialize, Serialize};

/// Size and revision metadata for one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiVolumeRecord {
    pub title: String,
    pub page_length: u64,
    pub last_touched: String,
    pub last_revision_id: u64,
}

/// Marker written into every text field of a no-data pageview record
pub const NO_DATA: &str = "no data";

/// One point of an article's pageview series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViewRecord {
    pub title: String,
    /// -1 marks the no-data sentinel; 0 is a real zero
    pub views: i64,
    pub granularity: String,
    pub timestamp: String,
    pub access: String,
    pub agent: String,
}

impl PageViewRecord {
    /// Sentinel for an article the pageview service had nothing for
    pub fn no_data(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            views: -1,
            granularity: NO_DATA.to_string(),
            timestamp: "00000000".to_string(),
            access: NO_DATA.to_string(),
            agent: NO_DATA.to_string(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.views < 0
    }
}
