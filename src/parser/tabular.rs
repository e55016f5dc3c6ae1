//! Tolerant parser for delimited text exports.
//!
//! The upstream export tool is not under our control, so the parser accepts
//! whatever it is given:
//! - `\r` is stripped and empty lines are dropped; a line holding only
//!   delimiters or spaces is still a row
//! - the delimiter (tab or comma) is picked once, from the header line
//! - short rows are padded with empty cells, long rows are truncated
//!
//! Records are read with a non-quoting `csv` reader: quote characters are
//! ordinary text and every cell is trimmed.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::debug;

/// Field delimiter detected from the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    /// Pick the delimiter for a whole file from its header line.
    ///
    /// Tab wins over comma; a header with neither is treated as tab-separated
    /// (a single-column file).
    pub fn detect(header_line: &str) -> Self {
        if header_line.contains('\t') {
            Delimiter::Tab
        } else if header_line.contains(',') {
            Delimiter::Comma
        } else {
            Delimiter::Tab
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

/// One data line, keyed by header name in header order.
///
/// Headers may repeat in an export. A repeated header keeps the position of
/// its first occurrence and takes the value of its last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TabularRow {
    cells: Vec<(String, String)>,
}

impl TabularRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell, overwriting any earlier cell with the same header.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((header, value)),
        }
    }

    /// Value for a header, if the header exists in this row.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_header(&self, header: &str) -> bool {
        self.cells.iter().any(|(h, _)| h == header)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for TabularRow {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut row = TabularRow::new();
        for (h, v) in iter {
            row.insert(h, v);
        }
        row
    }
}

/// Parse delimited text into header-keyed rows, in input order.
///
/// Never fails: empty input gives an empty vector.
pub fn parse_tabular(input: &str) -> Vec<TabularRow> {
    let normalized = input.replace('\r', "");
    let Some(header_line) = normalized.split('\n').find(|line| !line.is_empty()) else {
        return Vec::new();
    };
    let delimiter = Delimiter::detect(header_line);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(normalized.as_bytes());

    let mut records = reader.records().filter_map(|record| match record {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Skipping unreadable line: {}", e);
            None
        }
    });

    let Some(headers) = records.next() else {
        return Vec::new();
    };
    records.map(|record| to_row(&headers, &record)).collect()
}

/// Pair cells with headers, padding short records and dropping extra cells.
fn to_row(headers: &StringRecord, record: &StringRecord) -> TabularRow {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| (header, record.get(i).unwrap_or("")))
        .collect()
}
