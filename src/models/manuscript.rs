//! Manuscript metadata records (kind A exports).

use serde::{Deserialize, Serialize};

use crate::store::{Cell, Row, RowExt};

/// Store table holding [`ManuscriptRecord`] rows, keyed by manuscript id.
pub const MANUSCRIPTS_TABLE: &str = "manuscripts";

/// Column ids of the manuscripts table.
pub mod columns {
    pub const MANUSCRIPT_ID: &str = "manuscriptId";
    pub const AUTHOR: &str = "author";
    pub const TITLE: &str = "title";
    pub const TYPE: &str = "type";
    pub const EDITOR: &str = "editor";
    pub const DAYS_WITH_EDITOR: &str = "daysWithEditor";
    pub const INITIAL_SUBMISSION_DATE: &str = "initialSubmissionDate";
    pub const INITIAL_SUBMISSION_DATE_RAW: &str = "initialSubmissionDateRaw";
    pub const EDITORIAL_STATUS: &str = "editorialStatus";
}

/// One manuscript, as last imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManuscriptRecord {
    /// Primary key: non-empty, trimmed.
    pub manuscript_id: String,
    pub author: String,
    pub title: String,
    /// Article type.
    #[serde(rename = "type")]
    pub article_type: String,
    pub editor: String,
    pub days_with_editor: u32,
    /// Milliseconds since the Unix epoch, `0` when unknown.
    pub initial_submission_date: i64,
    /// Source text the submission date was parsed from.
    pub initial_submission_date_raw: String,
    pub editorial_status: String,
}

impl ManuscriptRecord {
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert(columns::MANUSCRIPT_ID.into(), Cell::from(self.manuscript_id.as_str()));
        row.insert(columns::AUTHOR.into(), Cell::from(self.author.as_str()));
        row.insert(columns::TITLE.into(), Cell::from(self.title.as_str()));
        row.insert(columns::TYPE.into(), Cell::from(self.article_type.as_str()));
        row.insert(columns::EDITOR.into(), Cell::from(self.editor.as_str()));
        row.insert(columns::DAYS_WITH_EDITOR.into(), Cell::from(self.days_with_editor));
        row.insert(
            columns::INITIAL_SUBMISSION_DATE.into(),
            Cell::from(self.initial_submission_date),
        );
        row.insert(
            columns::INITIAL_SUBMISSION_DATE_RAW.into(),
            Cell::from(self.initial_submission_date_raw.as_str()),
        );
        row.insert(
            columns::EDITORIAL_STATUS.into(),
            Cell::from(self.editorial_status.as_str()),
        );
        row
    }

    /// Rebuild a record from a stored row. Missing cells read as empty or zero.
    pub fn from_row(row_id: &str, row: &Row) -> Self {
        Self {
            manuscript_id: row_id.to_string(),
            author: row.text(columns::AUTHOR).to_string(),
            title: row.text(columns::TITLE).to_string(),
            article_type: row.text(columns::TYPE).to_string(),
            editor: row.text(columns::EDITOR).to_string(),
            days_with_editor: u32::try_from(row.number(columns::DAYS_WITH_EDITOR)).unwrap_or(0),
            initial_submission_date: row.number(columns::INITIAL_SUBMISSION_DATE),
            initial_submission_date_raw: row.text(columns::INITIAL_SUBMISSION_DATE_RAW).to_string(),
            editorial_status: row.text(columns::EDITORIAL_STATUS).to_string(),
        }
    }
}
