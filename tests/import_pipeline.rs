//! End-to-end import, store and query behavior through the public API.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use ajsr_reports::models::{sentinel, HISTORY_TABLE, MANUSCRIPTS_TABLE};
use ajsr_reports::{FileKind, ImportError, Importer, ManuscriptRepository, SearchView, Store};

const METADATA: &str = "Manuscript Number\tCorresponding Author\tArticle Title\tArticle Type\tEditor\tDays with Editor\tInitial Submission Date\tEditorial Status\n\
AJSR-101\tOmar\tGroundwater recharge\tResearch\tRana\t4\t2024-03-15\tUnder Review\n\
AJSR-102\tMaha\tDate palm genetics\tReview\t\t-2\t10/01/2024\t\n\
AJSR-103\tSalim\tDust storms\tResearch\tRana\t12\tsoon\tAccepted\n";

const HISTORY: &str = "Manuscript Number,Reviewer,Date Reviewer Invited,Agree Date,Review Complete,Reviewer Recommendation,Revision Number\n\
AJSR-101,Dr. Noor,01/02/2024,2024-02-05,True,Minor Revision,0\n\
AJSR-101,Dr. Adel,01/02/2024,,False,,0\n\
AJSR-101,Dr. Noor,01/05/2024,2024-05-03,,Accept,1\n\
AJSR-999,Dr. Ghost,01/02/2024,2024-02-01,True,Reject,0\n";

fn importer() -> Importer {
    Importer::new(ManuscriptRepository::new(Store::new()))
}

async fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, contents).await.unwrap();
    path
}

#[tokio::test]
async fn test_metadata_import_normalizes_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "manuscripts.tsv", METADATA).await;

    let importer = importer();
    let summary = importer.import_file(&path, None).await.unwrap();
    assert_eq!(summary.kind, FileKind::Metadata);
    assert_eq!(summary.records_written, 3);

    let repo = importer.repository();
    let first = repo.manuscript("AJSR-101").unwrap();
    assert_eq!(first.author, "Omar");
    assert_eq!(first.days_with_editor, 4);
    assert!(first.initial_submission_date > 0);

    let second = repo.manuscript("AJSR-102").unwrap();
    assert_eq!(second.editor, sentinel::EDITOR_UNASSIGNED);
    assert_eq!(second.editorial_status, sentinel::STATUS_UNSPECIFIED);
    assert_eq!(second.days_with_editor, 0);
    assert_eq!(second.initial_submission_date_raw, "10/01/2024");

    let third = repo.manuscript("AJSR-103").unwrap();
    assert_eq!(third.initial_submission_date, 0);
    assert_eq!(third.initial_submission_date_raw, "soon");
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let meta = write(dir.path(), "manuscripts.tsv", METADATA).await;
    let history = write(dir.path(), "status_history.csv", HISTORY).await;

    let importer = importer();
    importer.import_files(&[meta.clone(), history.clone()], None).await;
    let before = importer.repository().snapshot();

    let again = importer.import_files(&[meta, history], None).await;
    for summary in again {
        assert_eq!(summary.unwrap().rows_changed, 0);
    }
    assert_eq!(importer.repository().snapshot(), before);
}

#[tokio::test]
async fn test_import_order_does_not_matter() {
    let a = importer();
    a.import_text("manuscripts.tsv", METADATA, FileKind::Metadata);
    a.import_text("history.csv", HISTORY, FileKind::History);

    let b = importer();
    b.import_text("history.csv", HISTORY, FileKind::History);
    b.import_text("manuscripts.tsv", METADATA, FileKind::Metadata);

    assert_eq!(a.repository().snapshot(), b.repository().snapshot());
}

fn reverse_rows(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    lines[1..].reverse();
    lines.join("\n")
}

#[test]
fn test_row_order_within_file_does_not_matter() {
    let forward = importer();
    forward.import_text("manuscripts.tsv", METADATA, FileKind::Metadata);
    forward.import_text("history.csv", HISTORY, FileKind::History);

    let reversed = importer();
    reversed.import_text("manuscripts.tsv", &reverse_rows(METADATA), FileKind::Metadata);
    reversed.import_text("history.csv", &reverse_rows(HISTORY), FileKind::History);

    let by_id = |importer: &Importer| {
        let snapshot = importer.repository().snapshot();
        let manuscripts: BTreeMap<_, _> = snapshot
            .manuscripts
            .into_iter()
            .map(|m| (m.manuscript_id.clone(), m))
            .collect();
        let history: BTreeMap<_, _> = snapshot
            .history
            .into_iter()
            .map(|h| (h.row_id(), h))
            .collect();
        (manuscripts, history)
    };

    let (forward_manuscripts, forward_history) = by_id(&forward);
    let (reversed_manuscripts, reversed_history) = by_id(&reversed);
    assert_eq!(forward_manuscripts.len(), 3);
    assert_eq!(forward_manuscripts, reversed_manuscripts);
    assert_eq!(forward_history.len(), 4);
    assert_eq!(forward_history, reversed_history);
}

#[test]
fn test_history_composite_key() {
    let importer = importer();
    importer.import_text("history.csv", HISTORY, FileKind::History);
    let repo = importer.repository();

    // Same reviewer on a revision is a separate event.
    let events = repo.history_for("AJSR-101");
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].reviewer_name, "Dr. Adel");
    assert_eq!(events[0].agree_date, 0);
    assert_eq!(events[0].recommendation, sentinel::RECOMMENDATION_PENDING);
    assert!(events[2].is_revision());

    // History for a manuscript that was never imported is kept.
    assert_eq!(repo.history_for("AJSR-999").len(), 1);

    let updated = "Manuscript Number,Reviewer,Date Reviewer Invited,Reviewer Recommendation,Revision Number\n\
                   AJSR-101,Dr. Noor,01/02/2024,Major Revision,0\n";
    let summary = importer.import_text("history.csv", updated, FileKind::History);
    assert_eq!(summary.rows_changed, 1);

    let events = repo.history_for("AJSR-101");
    assert_eq!(events.len(), 3);
    let noor = events
        .iter()
        .find(|e| e.reviewer_name == "Dr. Noor" && e.revision == "0")
        .unwrap();
    assert_eq!(noor.recommendation, "Major Revision");
    // Full replacement: the agree date from the earlier import is gone.
    assert_eq!(noor.agree_date, 0);
}

#[test]
fn test_reader_never_sees_partial_import() {
    let mut text = String::from("Manuscript Number\tArticle Title\n");
    for i in 0..1000 {
        text.push_str(&format!("M-{:04}\tTitle {}\n", i, i));
    }

    let importer = importer();
    let store = importer.repository().store().clone();
    let done = Arc::new(AtomicBool::new(false));
    let started = Arc::new(Barrier::new(2));

    let reader = {
        let done = Arc::clone(&done);
        let started = Arc::clone(&started);
        std::thread::spawn(move || {
            let mut observed = vec![store.row_count(MANUSCRIPTS_TABLE)];
            started.wait();
            while !done.load(Ordering::SeqCst) {
                observed.push(store.row_count(MANUSCRIPTS_TABLE));
            }
            observed.push(store.row_count(MANUSCRIPTS_TABLE));
            observed
        })
    };

    started.wait();
    let summary = importer.import_text("big.tsv", &text, FileKind::Metadata);
    done.store(true, Ordering::SeqCst);

    assert_eq!(summary.records_written, 1000);
    let observed = reader.join().unwrap();
    assert_eq!(observed.first(), Some(&0));
    assert!(observed.iter().all(|&n| n == 0 || n == 1000));
    assert_eq!(observed.last(), Some(&1000));
}

#[test]
fn test_one_notification_per_import() {
    let importer = importer();
    let store = importer.repository().store().clone();

    let table_events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&table_events);
    store.add_table_listener(MANUSCRIPTS_TABLE, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut search = SearchView::new(importer.repository());
    let query_events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&query_events);
    search.on_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    importer.import_text("manuscripts.tsv", METADATA, FileKind::Metadata);
    assert_eq!(table_events.load(Ordering::SeqCst), 1);
    assert_eq!(query_events.load(Ordering::SeqCst), 1);

    importer.import_text("manuscripts.tsv", METADATA, FileKind::Metadata);
    assert_eq!(table_events.load(Ordering::SeqCst), 1);
    assert_eq!(query_events.load(Ordering::SeqCst), 1);

    search.set_search("102");
    assert_eq!(search.ids(), vec!["AJSR-102"]);
    assert_eq!(query_events.load(Ordering::SeqCst), 2);
}

#[test]
fn test_search_sorted_by_submission_date() {
    let importer = importer();
    importer.import_text("manuscripts.tsv", METADATA, FileKind::Metadata);

    let mut search = SearchView::new(importer.repository());
    search.set_search("AJSR-10");
    // Unknown date (0) first, then 10 Jan, then 15 Mar.
    assert_eq!(search.ids(), vec!["AJSR-103", "AJSR-102", "AJSR-101"]);
}

#[tokio::test]
async fn test_unreadable_file_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "manuscripts.tsv", METADATA).await;
    let missing = dir.path().join("missing_history.csv");

    let importer = importer();
    let results = importer.import_files(&[missing.clone(), good], None).await;

    match &results[0] {
        Err(ImportError::Read { path, .. }) => assert_eq!(path, &missing),
        other => panic!("expected read error, got {:?}", other),
    }
    assert_eq!(results[1].as_ref().unwrap().records_written, 3);
    assert_eq!(importer.repository().history_count(), 0);
    assert_eq!(importer.repository().manuscript_count(), 3);
}

#[tokio::test]
async fn test_classification_and_override() {
    let dir = tempfile::tempdir().unwrap();
    let history = write(dir.path(), "Manuscript Status.csv", HISTORY).await;
    let odd = write(dir.path(), "export-7.csv", HISTORY).await;

    let importer = importer();
    let results = importer.import_files(&[history, odd.clone()], None).await;
    let kinds: Vec<FileKind> = results.iter().map(|r| r.as_ref().unwrap().kind).collect();
    assert_eq!(kinds, vec![FileKind::History, FileKind::Metadata]);

    let other = self::importer();
    let summary = other.import_file(&odd, Some(FileKind::History)).await.unwrap();
    assert_eq!(summary.kind, FileKind::History);
    assert_eq!(other.repository().store().row_count(HISTORY_TABLE), 4);
}

#[test]
fn test_alias_headers_across_files() {
    let importer = importer();
    let csv = "ManuscriptNumber,Title,Author,ArticleType\nM-100,Salt flats,Huda,Letter\n";
    importer.import_text("m.csv", csv, FileKind::Metadata);

    let record = importer.repository().manuscript("M-100").unwrap();
    assert_eq!(record.title, "Salt flats");
    assert_eq!(record.author, "Huda");
    assert_eq!(record.article_type, "Letter");
}
