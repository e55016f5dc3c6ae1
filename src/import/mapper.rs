//! Maps parsed export rows to normalized records.
//!
//! Mapping is a pure transform. Every field falls back to a default or a
//! sentinel, so a mapped record always carries the full column set. The only
//! rejection is a row with no manuscript id.

use crate::models::sentinel;
use crate::models::{HistoryRecord, ManuscriptRecord};
use crate::parser::TabularRow;
use crate::services::date_detection::NormalizedDate;
use crate::utils::parse_leading_int;

use super::aliases::{history, metadata};

/// Map a metadata (kind A) row. `None` when the manuscript id is blank.
pub fn map_metadata_row(row: &TabularRow) -> Option<ManuscriptRecord> {
    let manuscript_id = metadata::MANUSCRIPT_ID.text(row);
    if manuscript_id.is_empty() {
        return None;
    }

    let submitted = NormalizedDate::parse(&metadata::INITIAL_SUBMISSION_DATE.text(row));

    Some(ManuscriptRecord {
        manuscript_id,
        author: metadata::AUTHOR.text(row),
        title: metadata::TITLE.text(row),
        article_type: metadata::TYPE.text(row),
        editor: metadata::EDITOR.text_or(row, sentinel::EDITOR_UNASSIGNED),
        days_with_editor: parse_day_count(&metadata::DAYS_WITH_EDITOR.text(row)),
        initial_submission_date: submitted.timestamp_millis(),
        initial_submission_date_raw: submitted.raw,
        editorial_status: metadata::EDITORIAL_STATUS.text_or(row, sentinel::STATUS_UNSPECIFIED),
    })
}

/// Map a history (kind B) row. `None` when the manuscript id is blank.
pub fn map_history_row(row: &TabularRow) -> Option<HistoryRecord> {
    let manuscript_id = history::MANUSCRIPT_ID.text(row);
    if manuscript_id.is_empty() {
        return None;
    }

    let invited = NormalizedDate::parse(&history::DATE_INVITED.text(row));
    let agreed = NormalizedDate::parse(&history::AGREE_DATE.text(row));

    Some(HistoryRecord {
        manuscript_id,
        reviewer_name: history::REVIEWER_NAME.text_or(row, sentinel::REVIEWER_UNNAMED),
        date_invited: invited.timestamp_millis(),
        date_invited_raw: invited.raw,
        agree_date: agreed.timestamp_millis(),
        agree_date_raw: agreed.raw,
        review_complete: history::REVIEW_COMPLETE.text(row),
        recommendation: history::RECOMMENDATION.text_or(row, sentinel::RECOMMENDATION_PENDING),
        revision: history::REVISION.text_or(row, sentinel::ORIGINAL_REVISION),
    })
}

/// Leading integer of a day count; non-numeric and negative values read as 0.
fn parse_day_count(raw: &str) -> u32 {
    parse_leading_int(raw)
        .map(|n| n.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> TabularRow {
        cells.iter().copied().collect()
    }

    #[test]
    fn test_manuscript_id_aliases() {
        for header in [
            "Manuscript Number",
            "ManuscriptNumber",
            "manuscript number",
            "Manuscript_Number",
        ] {
            let record = map_metadata_row(&row(&[(header, "M-100")])).unwrap();
            assert_eq!(record.manuscript_id, "M-100", "header {:?}", header);
        }
    }

    #[test]
    fn test_blank_id_is_skipped() {
        assert!(map_metadata_row(&row(&[("Manuscript Number", "   ")])).is_none());
        assert!(map_metadata_row(&row(&[("Title", "No id")])).is_none());
        assert!(map_history_row(&row(&[("Manuscript Number", "")])).is_none());
    }

    #[test]
    fn test_metadata_defaults() {
        let record = map_metadata_row(&row(&[("Manuscript Number", " M-1 ")])).unwrap();
        assert_eq!(
            record,
            ManuscriptRecord {
                manuscript_id: "M-1".into(),
                author: String::new(),
                title: String::new(),
                article_type: String::new(),
                editor: sentinel::EDITOR_UNASSIGNED.into(),
                days_with_editor: 0,
                initial_submission_date: 0,
                initial_submission_date_raw: String::new(),
                editorial_status: sentinel::STATUS_UNSPECIFIED.into(),
            }
        );
    }

    #[test]
    fn test_metadata_full_row() {
        let record = map_metadata_row(&row(&[
            ("Manuscript Number", "AJSR-2024-17"),
            ("Corresponding Author", "Omar Haddad"),
            ("Article Title", "Soil salinity in the Jordan valley"),
            ("Article Type", "Original Research"),
            ("Editor", "Rana"),
            ("Days with Editor", "12 days"),
            ("Initial Submission Date", "15/03/2024 09:10:00"),
            ("Editorial Status", "Under Review"),
        ]))
        .unwrap();

        assert_eq!(record.author, "Omar Haddad");
        assert_eq!(record.article_type, "Original Research");
        assert_eq!(record.editor, "Rana");
        assert_eq!(record.days_with_editor, 12);
        assert_eq!(record.initial_submission_date_raw, "15/03/2024 09:10:00");
        assert_eq!(
            record.initial_submission_date,
            NormalizedDate::parse("2024-03-15").timestamp_millis()
        );
        assert_eq!(record.editorial_status, "Under Review");
    }

    #[test]
    fn test_day_count_coercion() {
        assert_eq!(parse_day_count("n/a"), 0);
        assert_eq!(parse_day_count(""), 0);
        assert_eq!(parse_day_count("-4"), 0);
        assert_eq!(parse_day_count("7"), 7);
    }

    #[test]
    fn test_unparseable_date_keeps_raw() {
        let record = map_metadata_row(&row(&[
            ("Manuscript Number", "M-2"),
            ("Initial Submission Date", "99-99-9999"),
        ]))
        .unwrap();
        assert_eq!(record.initial_submission_date, 0);
        assert_eq!(record.initial_submission_date_raw, "99-99-9999");
    }

    #[test]
    fn test_history_row() {
        let record = map_history_row(&row(&[
            ("Manuscript Number", "M-1"),
            ("Reviewer", "Dr. Noor"),
            ("Date Reviewer Invited", "01/02/2024"),
            ("Agree Date", "2024-02-03"),
            ("Review Complete", "True"),
            ("Reviewer Recommendation", "Minor Revision"),
            ("Revision Number", "1"),
        ]))
        .unwrap();

        assert_eq!(record.reviewer_name, "Dr. Noor");
        assert_eq!(record.date_invited_raw, "01/02/2024");
        assert_eq!(
            record.date_invited,
            NormalizedDate::parse("2024-01-02").timestamp_millis()
        );
        assert_eq!(record.review_complete, "True");
        assert_eq!(record.row_id(), "M-1|1|Dr. Noor|01/02/2024");
    }

    #[test]
    fn test_history_defaults() {
        let record = map_history_row(&row(&[("ManuscriptNumber", "M-9")])).unwrap();
        assert_eq!(record.reviewer_name, sentinel::REVIEWER_UNNAMED);
        assert_eq!(record.recommendation, sentinel::RECOMMENDATION_PENDING);
        assert_eq!(record.revision, "0");
        assert_eq!(record.review_complete, "");
        assert_eq!(record.agree_date, 0);
    }
}
