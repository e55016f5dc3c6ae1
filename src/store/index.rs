//! Secondary indexes: a table sliced by the value of one column.

use std::collections::BTreeMap;

use super::cell::Row;
use super::query::sort_row_ids;
use super::table::Table;

/// How to slice a table and order ids within each slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub source_table: String,
    pub slice_column: String,
    pub sort_column: Option<String>,
    pub descending: bool,
}

impl IndexDefinition {
    pub fn new(source_table: impl Into<String>, slice_column: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            slice_column: slice_column.into(),
            sort_column: None,
            descending: false,
        }
    }

    pub fn sorted_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.sort_column = Some(column.into());
        self.descending = descending;
        self
    }

    /// Slice id to row ids. Rows without the slice column are left out.
    pub(crate) fn build(&self, table: Option<&Table>) -> Slices {
        let mut grouped: BTreeMap<String, Vec<(&str, &Row)>> = BTreeMap::new();
        if let Some(table) = table {
            for (row_id, row) in table.iter() {
                if let Some(cell) = row.get(&self.slice_column) {
                    grouped
                        .entry(cell.to_string())
                        .or_default()
                        .push((row_id, row));
                }
            }
        }

        grouped
            .into_iter()
            .map(|(slice, rows)| {
                let ids = sort_row_ids(rows, self.sort_column.as_deref(), self.descending);
                (slice, ids)
            })
            .collect()
    }
}

pub(crate) type Slices = BTreeMap<String, Vec<String>>;

pub(crate) struct IndexState {
    pub(crate) definition: IndexDefinition,
    pub(crate) slices: Slices,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Cell;

    fn history() -> Table {
        let mut table = Table::new();
        for (id, manuscript, agree) in [
            ("h1", "M1", 300i64),
            ("h2", "M2", 100),
            ("h3", "M1", 0),
            ("h4", "M1", 200),
        ] {
            let mut row = Row::new();
            row.insert("manuscriptId".into(), Cell::from(manuscript));
            row.insert("agreeDate".into(), Cell::from(agree));
            table.set_row(id.into(), row);
        }
        table
    }

    #[test]
    fn test_slices_sorted_by_column() {
        let def = IndexDefinition::new("history", "manuscriptId").sorted_by("agreeDate", false);
        let slices = def.build(Some(&history()));
        assert_eq!(slices["M1"], vec!["h3", "h4", "h1"]);
        assert_eq!(slices["M2"], vec!["h2"]);
    }

    #[test]
    fn test_unsorted_slices_keep_table_order() {
        let def = IndexDefinition::new("history", "manuscriptId");
        let slices = def.build(Some(&history()));
        assert_eq!(slices["M1"], vec!["h1", "h3", "h4"]);
    }

    #[test]
    fn test_rows_without_slice_column_are_skipped() {
        let mut table = history();
        table.set_row("orphan".into(), Row::new());
        let def = IndexDefinition::new("history", "manuscriptId");
        let total: usize = def.build(Some(&table)).values().map(Vec::len).sum();
        assert_eq!(total, 4);
    }
}
