//! Header aliases for each logical field.
//!
//! Export files spell the same column several ways. Each field lists the
//! spellings it accepts; the first one present in a row is used, even when
//! its cell is empty.

use crate::parser::TabularRow;

/// Ordered header spellings for one logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    pub field: &'static str,
    pub headers: &'static [&'static str],
}

impl FieldAliases {
    /// Cell of the first alias present in `row`, untrimmed.
    pub fn resolve<'a>(&self, row: &'a TabularRow) -> Option<&'a str> {
        self.headers.iter().find_map(|header| row.get(header))
    }

    /// Trimmed cell of the first alias present, `""` when none is present.
    pub fn text(&self, row: &TabularRow) -> String {
        self.resolve(row).map(str::trim).unwrap_or("").to_string()
    }

    /// Like [`text`](Self::text), with `default` substituted for a blank value.
    pub fn text_or(&self, row: &TabularRow, default: &str) -> String {
        let value = self.text(row);
        if value.is_empty() {
            default.to_string()
        } else {
            value
        }
    }
}

/// Free-function form of [`FieldAliases::resolve`].
pub fn resolve_field<'a>(row: &'a TabularRow, aliases: &FieldAliases) -> Option<&'a str> {
    aliases.resolve(row)
}

pub mod metadata {
    use super::FieldAliases;

    pub const MANUSCRIPT_ID: FieldAliases = FieldAliases {
        field: "manuscriptId",
        headers: &[
            "Manuscript Number",
            "ManuscriptNumber",
            "manuscript number",
            "Manuscript_Number",
        ],
    };

    pub const AUTHOR: FieldAliases = FieldAliases {
        field: "author",
        headers: &[
            "Corresponding Author First Name",
            "Author",
            "Corresponding Author",
            "author",
        ],
    };

    pub const TITLE: FieldAliases = FieldAliases {
        field: "title",
        headers: &["Article Title", "Title"],
    };

    pub const TYPE: FieldAliases = FieldAliases {
        field: "type",
        headers: &["Article Type", "ArticleType", "type"],
    };

    pub const EDITOR: FieldAliases = FieldAliases {
        field: "editor",
        headers: &["Editor First Name", "Editor"],
    };

    pub const DAYS_WITH_EDITOR: FieldAliases = FieldAliases {
        field: "daysWithEditor",
        headers: &["Days with Editor"],
    };

    pub const INITIAL_SUBMISSION_DATE: FieldAliases = FieldAliases {
        field: "initialSubmissionDate",
        headers: &["Initial Submission Date"],
    };

    pub const EDITORIAL_STATUS: FieldAliases = FieldAliases {
        field: "editorialStatus",
        headers: &["Editorial Status"],
    };
}

pub mod history {
    use super::FieldAliases;

    pub const MANUSCRIPT_ID: FieldAliases = super::metadata::MANUSCRIPT_ID;

    pub const REVIEWER_NAME: FieldAliases = FieldAliases {
        field: "reviewerName",
        headers: &["Reviewer First Name", "Reviewer"],
    };

    pub const DATE_INVITED: FieldAliases = FieldAliases {
        field: "dateInvited",
        headers: &["Date Reviewer Invited"],
    };

    pub const AGREE_DATE: FieldAliases = FieldAliases {
        field: "agreeDate",
        headers: &["Agree Date"],
    };

    pub const REVIEW_COMPLETE: FieldAliases = FieldAliases {
        field: "reviewComplete",
        headers: &["Review Complete"],
    };

    pub const RECOMMENDATION: FieldAliases = FieldAliases {
        field: "recommendation",
        headers: &["Reviewer Recommendation"],
    };

    pub const REVISION: FieldAliases = FieldAliases {
        field: "revision",
        headers: &["Revision Number", "Revision"],
    };
}
