//! Plain-text review reports.
//!
//! A report lists one manuscript's metadata followed by its review history,
//! one bullet per reviewer invitation, in ascending agree-date order.

use chrono::{DateTime, Datelike, Utc};

use crate::models::{sentinel, HistoryRecord, ManuscriptRecord};

pub const ARABIC_MONTHS: [&str; 12] = [
    "يناير",
    "فبراير",
    "مارس",
    "أبريل",
    "مايو",
    "يونيو",
    "يوليو",
    "أغسطس",
    "سبتمبر",
    "أكتوبر",
    "نوفمبر",
    "ديسمبر",
];

/// `"{day} {month} {year}"` with an Arabic month name; `""` for unknown (0) dates.
pub fn format_date_arabic(millis: i64) -> String {
    if millis == 0 {
        return String::new();
    }
    let Some(date) = DateTime::<Utc>::from_timestamp_millis(millis) else {
        return String::new();
    };
    let month = ARABIC_MONTHS[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

/// `✓` for `"True"`, `✗` for `"False"`, nothing otherwise.
pub fn completion_mark(review_complete: &str) -> &'static str {
    match review_complete {
        "True" => "✓",
        "False" => "✗",
        _ => "",
    }
}

/// `(R{n})` for revisions; `None` for the original submission.
pub fn revision_label(revision: &str) -> Option<String> {
    if revision.is_empty() || revision == sentinel::ORIGINAL_REVISION {
        None
    } else {
        Some(format!("(R{})", revision))
    }
}

/// One bullet line of the review history.
pub fn history_line(event: &HistoryRecord) -> String {
    format!(
        "• {} - دعوة: {} - موافقة: {} - {} - {}",
        event.reviewer_name,
        format_date_arabic(event.date_invited),
        format_date_arabic(event.agree_date),
        completion_mark(&event.review_complete),
        event.recommendation
    )
}

/// The copyable report block for one manuscript.
pub fn report_text<'a, I>(manuscript: &ManuscriptRecord, history: I) -> String
where
    I: IntoIterator<Item = &'a HistoryRecord>,
{
    let editor = if manuscript.editor.is_empty() {
        sentinel::EDITOR_UNASSIGNED
    } else {
        manuscript.editor.as_str()
    };

    let mut lines = vec![
        format!("{} ({})", manuscript.author, manuscript.manuscript_id),
        format!("العنوان: {}", manuscript.title),
        format!("النوع: {}", manuscript.article_type),
        format!("المحرر: {}", editor),
        String::new(),
        "سجل المراجعة:".to_string(),
    ];
    lines.extend(history.into_iter().map(history_line));
    lines.join("\n")
}
