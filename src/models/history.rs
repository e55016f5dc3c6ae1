//! Review history records (kind B exports).

use serde::{Deserialize, Serialize};

use crate::store::{Cell, Row, RowExt};

/// Store table holding [`HistoryRecord`] rows, keyed by [`HistoryRecord::row_id`].
pub const HISTORY_TABLE: &str = "history";

/// Column ids of the history table.
pub mod columns {
    pub const MANUSCRIPT_ID: &str = "manuscriptId";
    pub const REVIEWER_NAME: &str = "reviewerName";
    pub const DATE_INVITED: &str = "dateInvited";
    pub const DATE_INVITED_RAW: &str = "dateInvitedRaw";
    pub const AGREE_DATE: &str = "agreeDate";
    pub const AGREE_DATE_RAW: &str = "agreeDateRaw";
    pub const REVIEW_COMPLETE: &str = "reviewComplete";
    pub const RECOMMENDATION: &str = "recommendation";
    pub const REVISION: &str = "revision";
}

/// One reviewer-invitation event.
///
/// `manuscript_id` is not checked against the manuscripts table; history for
/// a manuscript that was never imported is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub manuscript_id: String,
    pub reviewer_name: String,
    /// Milliseconds since the Unix epoch, `0` when unknown.
    pub date_invited: i64,
    pub date_invited_raw: String,
    /// Milliseconds since the Unix epoch, `0` when unknown.
    pub agree_date: i64,
    pub agree_date_raw: String,
    /// Passed through verbatim: usually `"True"`, `"False"` or empty.
    pub review_complete: String,
    pub recommendation: String,
    /// `"0"` is the original submission.
    pub revision: String,
}

impl HistoryRecord {
    /// Composite key `manuscriptId|revision|reviewerName|dateInvitedRaw`.
    ///
    /// Two rows with the same key are the same event; the later import wins.
    pub fn row_id(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.manuscript_id, self.revision, self.reviewer_name, self.date_invited_raw
        )
    }

    /// True when this event is for a revision rather than the original submission.
    pub fn is_revision(&self) -> bool {
        !self.revision.is_empty() && self.revision != super::sentinel::ORIGINAL_REVISION
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert(columns::MANUSCRIPT_ID.into(), Cell::from(self.manuscript_id.as_str()));
        row.insert(columns::REVIEWER_NAME.into(), Cell::from(self.reviewer_name.as_str()));
        row.insert(columns::DATE_INVITED.into(), Cell::from(self.date_invited));
        row.insert(
            columns::DATE_INVITED_RAW.into(),
            Cell::from(self.date_invited_raw.as_str()),
        );
        row.insert(columns::AGREE_DATE.into(), Cell::from(self.agree_date));
        row.insert(columns::AGREE_DATE_RAW.into(), Cell::from(self.agree_date_raw.as_str()));
        row.insert(
            columns::REVIEW_COMPLETE.into(),
            Cell::from(self.review_complete.as_str()),
        );
        row.insert(columns::RECOMMENDATION.into(), Cell::from(self.recommendation.as_str()));
        row.insert(columns::REVISION.into(), Cell::from(self.revision.as_str()));
        row
    }

    pub fn from_row(row: &Row) -> Self {
        Self {
            manuscript_id: row.text(columns::MANUSCRIPT_ID).to_string(),
            reviewer_name: row.text(columns::REVIEWER_NAME).to_string(),
            date_invited: row.number(columns::DATE_INVITED),
            date_invited_raw: row.text(columns::DATE_INVITED_RAW).to_string(),
            agree_date: row.number(columns::AGREE_DATE),
            agree_date_raw: row.text(columns::AGREE_DATE_RAW).to_string(),
            review_complete: row.text(columns::REVIEW_COMPLETE).to_string(),
            recommendation: row.text(columns::RECOMMENDATION).to_string(),
            revision: row.text(columns::REVISION).to_string(),
        }
    }
}
