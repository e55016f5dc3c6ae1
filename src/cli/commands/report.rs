//! Review report command.

use std::path::PathBuf;

use console::style;

use super::helpers::load_files;
use crate::config::Settings;
use crate::models::{sentinel, HistoryRecord, ManuscriptRecord};
use crate::repository::SearchView;
use crate::services::report::{
    completion_mark, format_date_arabic, report_text, revision_label,
};

/// Print one report per manuscript matching `search`, in sort order.
///
/// `descending` overrides the configured direction when set.
pub async fn cmd_report(
    settings: &Settings,
    files: &[PathBuf],
    search: &str,
    sort: Option<&str>,
    descending: Option<bool>,
    plain: bool,
) -> anyhow::Result<()> {
    let (importer, _) = load_files(settings, files, None).await?;
    let repo = importer.repository();

    let column = sort.unwrap_or(&settings.sort_column).to_string();
    let descending = descending.unwrap_or(settings.sort_descending);
    let mut view = SearchView::new(repo).sorted_by(column, descending);
    view.set_search(search);

    let snapshot = repo.snapshot();
    let ids = view.ids();
    if ids.is_empty() {
        println!("{}", style("No matching manuscripts").dim());
        return Ok(());
    }

    for (i, id) in ids.iter().enumerate() {
        let Some(manuscript) = snapshot.manuscript(id) else {
            continue;
        };
        let history = snapshot.history_for(id);
        if i > 0 {
            println!();
        }
        if plain {
            println!("{}", report_text(manuscript, history));
        } else {
            print_card(manuscript, &history);
        }
    }
    Ok(())
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn print_card(manuscript: &ManuscriptRecord, history: &[&HistoryRecord]) {
    println!(
        "{}  {}",
        style(or_default(&manuscript.author, "بدون مؤلف")).bold(),
        style(&manuscript.manuscript_id).cyan()
    );
    if !manuscript.title.is_empty() {
        println!("{}", style(&manuscript.title).dim());
    }
    println!(
        "  النوع: {}",
        or_default(&manuscript.article_type, sentinel::STATUS_UNSPECIFIED)
    );
    println!(
        "  المحرر: {}",
        or_default(&manuscript.editor, sentinel::EDITOR_UNASSIGNED)
    );

    if history.is_empty() {
        return;
    }
    println!("  {}", style("سجل المراجعة").bold());
    for event in history {
        let mark = completion_mark(&event.review_complete);
        println!("    {} {}", style(&event.reviewer_name).bold(), mark);
        println!("      دعوة: {}", format_date_arabic(event.date_invited));
        println!("      موافقة: {}", format_date_arabic(event.agree_date));
        println!("      {}", event.recommendation);
        if let Some(label) = revision_label(&event.revision) {
            println!("      {}", style(label).dim());
        }
    }
}
