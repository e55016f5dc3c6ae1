//! Insertion-ordered tables.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::cell::Row;

/// Rows keyed by id, iterated in first-insertion order.
///
/// Overwriting an existing id replaces the whole row but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: HashMap<String, Row>,
    order: Vec<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row_id: &str) -> Option<&Row> {
        self.rows.get(row_id)
    }

    pub fn contains(&self, row_id: &str) -> bool {
        self.rows.contains_key(row_id)
    }

    pub fn row_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).map(|row| (id.as_str(), row)))
    }

    /// Upsert a row. Returns `false` when the stored row was already identical.
    pub(crate) fn set_row(&mut self, row_id: String, row: Row) -> bool {
        match self.rows.get_mut(&row_id) {
            Some(existing) if *existing == row => false,
            Some(existing) => {
                *existing = row;
                true
            }
            None => {
                self.order.push(row_id.clone());
                self.rows.insert(row_id, row);
                true
            }
        }
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, row) in self.iter() {
            map.serialize_entry(id, row)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Cell;

    fn row(title: &str) -> Row {
        let mut row = Row::new();
        row.insert("title".into(), Cell::from(title));
        row
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut table = Table::new();
        assert!(table.set_row("b".into(), row("one")));
        assert!(table.set_row("a".into(), row("two")));
        assert!(table.set_row("b".into(), row("three")));

        assert_eq!(table.row_ids(), ["b".to_string(), "a".to_string()]);
        assert_eq!(table.get("b"), Some(&row("three")));
    }

    #[test]
    fn test_identical_write_is_not_a_change() {
        let mut table = Table::new();
        assert!(table.set_row("a".into(), row("x")));
        assert!(!table.set_row("a".into(), row("x")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_full_replacement() {
        let mut table = Table::new();
        let mut wide = row("x");
        wide.insert("extra".into(), Cell::from(1i64));
        table.set_row("a".into(), wide);
        table.set_row("a".into(), row("y"));
        assert!(table.get("a").unwrap().get("extra").is_none());
    }
}
