//! Interactive search command.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::helpers::load_files;
use crate::cli::icons::arrow;
use crate::config::Settings;
use crate::models::manuscript::columns;
use crate::repository::SearchView;
use crate::services::report::format_date_arabic;
use crate::store::RowExt;
use crate::utils::debounce;

/// Read search terms from stdin and print the live result after each change.
pub async fn cmd_search(settings: &Settings, files: &[PathBuf]) -> anyhow::Result<()> {
    let (importer, _) = load_files(settings, files, None).await?;
    let mut view = SearchView::new(importer.repository())
        .sorted_by(settings.sort_column.clone(), settings.sort_descending);

    let changed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&changed);
    view.on_change(move |_| flag.store(true, Ordering::SeqCst));

    eprintln!(
        "{} Type a manuscript number fragment; an empty line shows all. Ctrl-D exits.",
        arrow()
    );
    print_results(&view);

    let (tx, rx) = mpsc::unbounded_channel();
    let mut terms = debounce(rx, settings.debounce);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    while let Some(term) = terms.recv().await {
        view.set_search(term.trim());
        if changed.swap(false, Ordering::SeqCst) {
            print_results(&view);
        }
    }
    Ok(())
}

fn print_results(view: &SearchView) {
    let ids = view.ids();
    println!(
        "{} {} matches for {:?}",
        arrow(),
        style(ids.len()).cyan(),
        view.term()
    );
    for id in ids {
        let Some(row) = view.row(&id) else {
            continue;
        };
        println!(
            "  {:<16} {:<12} {}",
            style(&id).bold(),
            format_date_arabic(row.number(columns::INITIAL_SUBMISSION_DATE)),
            row.text(columns::TITLE)
        );
    }
}
