//! Typed access to the manuscripts and history tables.

use serde::Serialize;

use crate::models::{history, HistoryRecord, ManuscriptRecord};
use crate::models::{HISTORY_TABLE, MANUSCRIPTS_TABLE};
use crate::store::{IndexDefinition, Store, Table};

/// Index over history rows sliced by manuscript id, ascending by agree date.
pub const HISTORY_BY_MANUSCRIPT: &str = "historyByManuscript";

/// Repository over a shared [`Store`].
///
/// Clones share the same store.
#[derive(Clone)]
pub struct ManuscriptRepository {
    store: Store,
}

impl ManuscriptRepository {
    /// Wrap a store and define the indexes the repository reads through.
    pub fn new(store: Store) -> Self {
        store.define_index(
            HISTORY_BY_MANUSCRIPT,
            IndexDefinition::new(HISTORY_TABLE, history::columns::MANUSCRIPT_ID)
                .sorted_by(history::columns::AGREE_DATE, false),
        );
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Upsert manuscripts as one batch. Returns the number of rows that changed.
    pub fn save_manuscripts<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = ManuscriptRecord>,
    {
        self.store.write_batch(
            MANUSCRIPTS_TABLE,
            records
                .into_iter()
                .map(|record| (record.manuscript_id.clone(), record.to_row())),
        )
    }

    /// Upsert history events as one batch, keyed by their composite id.
    pub fn save_history<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = HistoryRecord>,
    {
        self.store.write_batch(
            HISTORY_TABLE,
            records
                .into_iter()
                .map(|record| (record.row_id(), record.to_row())),
        )
    }

    pub fn manuscript(&self, manuscript_id: &str) -> Option<ManuscriptRecord> {
        self.store
            .get_row(MANUSCRIPTS_TABLE, manuscript_id)
            .map(|row| ManuscriptRecord::from_row(manuscript_id, &row))
    }

    /// Manuscript ids in first-import order.
    pub fn manuscript_ids(&self) -> Vec<String> {
        self.store.row_ids(MANUSCRIPTS_TABLE)
    }

    pub fn manuscript_count(&self) -> usize {
        self.store.row_count(MANUSCRIPTS_TABLE)
    }

    pub fn history_count(&self) -> usize {
        self.store.row_count(HISTORY_TABLE)
    }

    /// History of one manuscript by ascending agree date; unknown dates first.
    pub fn history_for(&self, manuscript_id: &str) -> Vec<HistoryRecord> {
        self.store
            .slice_rows(HISTORY_BY_MANUSCRIPT, manuscript_id)
            .unwrap_or_default()
            .iter()
            .map(|(_, row)| HistoryRecord::from_row(row))
            .collect()
    }

    /// A consistent copy of both tables for rendering and export.
    pub fn snapshot(&self) -> Snapshot {
        let mut tables = self
            .store
            .get_tables(&[MANUSCRIPTS_TABLE, HISTORY_TABLE])
            .into_iter();
        let manuscripts: Table = tables.next().unwrap_or_default();
        let events: Table = tables.next().unwrap_or_default();

        Snapshot {
            manuscripts: manuscripts
                .iter()
                .map(|(id, row)| ManuscriptRecord::from_row(id, row))
                .collect(),
            history: events.iter().map(|(_, row)| HistoryRecord::from_row(row)).collect(),
        }
    }
}

/// Read-only copy of the repository's records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub manuscripts: Vec<ManuscriptRecord>,
    pub history: Vec<HistoryRecord>,
}

impl Snapshot {
    pub fn manuscript(&self, manuscript_id: &str) -> Option<&ManuscriptRecord> {
        self.manuscripts
            .iter()
            .find(|m| m.manuscript_id == manuscript_id)
    }

    /// History of one manuscript by ascending agree date; unknown dates first.
    pub fn history_for(&self, manuscript_id: &str) -> Vec<&HistoryRecord> {
        let mut events: Vec<&HistoryRecord> = self
            .history
            .iter()
            .filter(|h| h.manuscript_id == manuscript_id)
            .collect();
        events.sort_by_key(|h| h.agree_date);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sentinel;

    fn manuscript(id: &str, date: i64) -> ManuscriptRecord {
        ManuscriptRecord {
            manuscript_id: id.into(),
            author: "Author".into(),
            title: format!("Title {}", id),
            article_type: "Research".into(),
            editor: sentinel::EDITOR_UNASSIGNED.into(),
            days_with_editor: 0,
            initial_submission_date: date,
            initial_submission_date_raw: String::new(),
            editorial_status: sentinel::STATUS_UNSPECIFIED.into(),
        }
    }

    fn event(id: &str, reviewer: &str, agree: i64) -> HistoryRecord {
        HistoryRecord {
            manuscript_id: id.into(),
            reviewer_name: reviewer.into(),
            date_invited: 0,
            date_invited_raw: String::new(),
            agree_date: agree,
            agree_date_raw: String::new(),
            review_complete: String::new(),
            recommendation: sentinel::RECOMMENDATION_PENDING.into(),
            revision: "0".into(),
        }
    }

    #[test]
    fn test_save_and_read_manuscript() {
        let repo = ManuscriptRepository::new(Store::new());
        assert_eq!(repo.save_manuscripts(vec![manuscript("M1", 5)]), 1);
        assert_eq!(repo.manuscript("M1"), Some(manuscript("M1", 5)));
        assert_eq!(repo.manuscript("M2"), None);
    }

    #[test]
    fn test_history_sorted_by_agree_date() {
        let repo = ManuscriptRepository::new(Store::new());
        repo.save_history(vec![
            event("M1", "late", 300),
            event("M2", "other", 100),
            event("M1", "unknown", 0),
            event("M1", "early", 200),
        ]);

        let names: Vec<String> = repo
            .history_for("M1")
            .into_iter()
            .map(|h| h.reviewer_name)
            .collect();
        assert_eq!(names, vec!["unknown", "early", "late"]);
        assert!(repo.history_for("M9").is_empty());
    }

    #[test]
    fn test_history_without_manuscript_is_kept() {
        let repo = ManuscriptRepository::new(Store::new());
        repo.save_history(vec![event("ghost", "A", 1)]);
        assert_eq!(repo.history_count(), 1);
        assert_eq!(repo.manuscript_count(), 0);
    }

    #[test]
    fn test_snapshot_matches_repository() {
        let repo = ManuscriptRepository::new(Store::new());
        repo.save_manuscripts(vec![manuscript("M2", 2), manuscript("M1", 1)]);
        repo.save_history(vec![event("M1", "b", 20), event("M1", "a", 10)]);

        let snapshot = repo.snapshot();
        assert_eq!(snapshot.manuscripts.len(), 2);
        assert_eq!(snapshot.manuscripts[0].manuscript_id, "M2");
        let names: Vec<&str> = snapshot
            .history_for("M1")
            .iter()
            .map(|h| h.reviewer_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(snapshot.manuscript("M1").map(|m| m.initial_submission_date), Some(1));
    }
}
