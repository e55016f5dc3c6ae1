//! Date normalization for export cells of unknown format.
//!
//! The export tool does not commit to a date format, so several strategies
//! are tried in order and the first one that yields a real calendar date wins:
//! 1. General formats (ISO 8601, RFC 3339/2822, month-first `M/D/YYYY`,
//!    a bare year, spelled-out months)
//! 2. Slash-separated day/month/year, reached only by slash dates that are not
//!    a valid month-first date (`15/03/2024`)
//! 3. Dash-separated triple, disambiguated by which component exceeds 31
//!
//! Nothing here fails. An unrecognized string is "unknown" and the raw text is
//! always kept next to the estimate.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::utils::parse_leading_int;

/// Which strategy produced a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStrategy {
    General,
    DayMonthYear,
    DashTriple,
}

impl DateStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateStrategy::General => "general",
            DateStrategy::DayMonthYear => "day_month_year",
            DateStrategy::DashTriple => "dash_triple",
        }
    }
}

/// A resolved date and the strategy that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateEstimate {
    pub date: DateTime<Utc>,
    pub strategy: DateStrategy,
}

/// A raw date cell together with its best-effort interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    pub raw: String,
    pub estimate: Option<DateEstimate>,
}

impl NormalizedDate {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            estimate: normalize_date(raw),
        }
    }

    /// Milliseconds since the Unix epoch, `0` when unknown.
    pub fn timestamp_millis(&self) -> i64 {
        self.estimate
            .map(|e| e.date.timestamp_millis())
            .unwrap_or(0)
    }

    pub fn is_known(&self) -> bool {
        self.estimate.is_some()
    }
}

/// Year-first shapes handled by the general strategy. Anything else that
/// is purely numeric goes to the day-first and dash strategies.
static YEAR_FIRST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}[-/]\d{1,2}").unwrap());

/// `M/D/YYYY` with an optional `H:MM[:SS]` time.
static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$").unwrap()
});

static BARE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const YEAR_FIRST_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const NAMED_MONTH_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%d-%b-%Y"];

type Strategy = fn(&str) -> Option<DateTime<Utc>>;

/// Strategies in the order they are tried.
const STRATEGIES: &[(DateStrategy, Strategy)] = &[
    (DateStrategy::General, parse_general),
    (DateStrategy::DayMonthYear, parse_day_month_year),
    (DateStrategy::DashTriple, parse_dash_triple),
];

/// Resolve a raw date string, or `None` when no strategy recognizes it.
pub fn normalize_date(raw: &str) -> Option<DateEstimate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    STRATEGIES.iter().find_map(|(strategy, parse)| {
        parse(raw).map(|date| DateEstimate {
            date,
            strategy: *strategy,
        })
    })
}

fn parse_general(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if YEAR_FIRST.is_match(raw) {
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(dt.and_utc());
            }
        }
        for format in YEAR_FIRST_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                return midnight_utc(date);
            }
        }
        return None;
    }

    if let Some(date) = parse_month_first(raw) {
        return Some(date);
    }
    if BARE_YEAR.is_match(raw) {
        return calendar_date(raw.parse().ok()?, 1, 1);
    }

    NAMED_MONTH_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(midnight_utc)
}

fn parse_month_first(raw: &str) -> Option<DateTime<Utc>> {
    let caps = MONTH_FIRST.captures(raw)?;
    let number = |i: usize| -> Option<u32> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let date = NaiveDate::from_ymd_opt(caps[3].parse().ok()?, number(1)?, number(2)?)?;
    Some(date.and_hms_opt(number(4)?, number(5)?, number(6)?)?.and_utc())
}

fn parse_day_month_year(raw: &str) -> Option<DateTime<Utc>> {
    let [day, month, year] = date_triple(raw, '/')?;
    calendar_date(year, month, day)
}

fn parse_dash_triple(raw: &str) -> Option<DateTime<Utc>> {
    let [a, b, c] = date_triple(raw, '-')?;
    if a > 31 {
        // year-month-day
        calendar_date(a, b, c)
    } else if c > 31 {
        // month-day-year
        calendar_date(c, a, b)
    } else {
        None
    }
}

/// Split the part before the first space into exactly three integers.
fn date_triple(raw: &str, separator: char) -> Option<[i64; 3]> {
    let date_part = raw.split(' ').next().unwrap_or(raw);
    let parts: Vec<&str> = date_part.split(separator).collect();
    if parts.len() != 3 {
        return None;
    }
    Some([
        parse_leading_int(parts[0])?,
        parse_leading_int(parts[1])?,
        parse_leading_int(parts[2])?,
    ])
}

/// Build a date only when the components name a real calendar day.
fn calendar_date(year: i64, month: i64, day: i64) -> Option<DateTime<Utc>> {
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(midnight_utc)
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
