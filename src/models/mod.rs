//! Normalized domain records for manuscripts and their review history.

pub mod history;
pub mod manuscript;

pub use history::{HistoryRecord, HISTORY_TABLE};
pub use manuscript::{ManuscriptRecord, MANUSCRIPTS_TABLE};

/// Placeholder strings stored when an export leaves a field blank.
pub mod sentinel {
    /// Editor not yet assigned ("not yet assigned").
    pub const EDITOR_UNASSIGNED: &str = "لم يحدد بعد";
    /// Editorial status missing ("unspecified").
    pub const STATUS_UNSPECIFIED: &str = "غير محدد";
    /// Reviewer without a name ("unnamed").
    pub const REVIEWER_UNNAMED: &str = "بدون اسم";
    /// Recommendation not yet given ("not yet determined").
    pub const RECOMMENDATION_PENDING: &str = "لم يحدد بعد";
    /// Revision number of the original submission.
    pub const ORIGINAL_REVISION: &str = "0";
}
