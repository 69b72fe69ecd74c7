//! Canonical record types shared by every stage
//!
//! Field names are the column names of the persisted tables. Stages read and
//! write these structs directly, so a column is never renamed between stages.

mod entity;
mod literature;
mod ranking;
mod wiki;

pub use entity::{ExternalEntityRef, WikiLinkGroup, WikiLinkRecord};
pub use literature::{AuthorRecord, DateSource, EmailStatus, PmidFailure, PublicationRecord};
pub use ranking::{AuthorRollupRow, GeneScore, PublicationSummary, SizedArticle};
pub use wiki::{PageViewRecord, WikiVolumeRecord};

use crate::state::Stage;
use serde::{Deserialize, Serialize};

/// One quarantined item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub item_key: String,
    pub stage: Stage,
    pub reason: String,
    /// False for failures another attempt would not change (missing pages,
    /// rejected genes, undecodable bodies)
    pub retryable: bool,
}
