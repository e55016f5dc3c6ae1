//! Live queries over a single table.
//!
//! A query selects a set of columns from its source table and keeps the rows
//! for which its `having` predicate holds. Results are recomputed inside the
//! same write that changes the source table, so a consumer only ever sees a
//! result that matches one committed state and one definition.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::cell::{Cell, Row};
use super::table::Table;
use super::{ListenerId, Store, StoreEvent};

/// Row predicate evaluated against the selected cells of each source row.
pub type Having = Arc<dyn Fn(&RowAccessor<'_>) -> bool + Send + Sync>;

/// Read access to the selected cells of the row under test.
pub struct RowAccessor<'a> {
    row_id: &'a str,
    cells: &'a Row,
}

impl<'a> RowAccessor<'a> {
    pub fn row_id(&self) -> &str {
        self.row_id
    }

    pub fn get_cell(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Text value of a selected cell, `""` when missing or numeric.
    pub fn text(&self, column: &str) -> &str {
        self.get_cell(column).and_then(Cell::as_str).unwrap_or("")
    }
}

/// What a query selects and filters.
///
/// An empty selection projects every cell of the source row.
#[derive(Clone)]
pub struct QueryDefinition {
    source_table: String,
    select: Vec<String>,
    having: Option<Having>,
}

impl fmt::Debug for QueryDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDefinition")
            .field("source_table", &self.source_table)
            .field("select", &self.select)
            .field("having", &self.having.is_some())
            .finish()
    }
}

impl QueryDefinition {
    pub fn new(source_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            select: Vec::new(),
            having: None,
        }
    }

    pub fn select(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.select.contains(&column) {
            self.select.push(column);
        }
        self
    }

    pub fn select_columns<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        columns.into_iter().fold(self, |def, column| def.select(column))
    }

    pub fn having<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RowAccessor<'_>) -> bool + Send + Sync + 'static,
    {
        self.having = Some(Arc::new(predicate));
        self
    }

    pub fn source_table(&self) -> &str {
        &self.source_table
    }

    pub fn selected(&self) -> &[String] {
        &self.select
    }

    fn project(&self, row: &Row) -> Row {
        if self.select.is_empty() {
            return row.clone();
        }
        self.select
            .iter()
            .filter_map(|column| row.get(column).map(|cell| (column.clone(), cell.clone())))
            .collect()
    }

    /// Matching rows in source table order.
    pub(crate) fn evaluate(&self, table: Option<&Table>) -> ResultTable {
        let Some(table) = table else {
            return Vec::new();
        };

        table
            .iter()
            .filter_map(|(row_id, row)| {
                let cells = self.project(row);
                let keep = match &self.having {
                    Some(having) => having(&RowAccessor {
                        row_id,
                        cells: &cells,
                    }),
                    None => true,
                };
                keep.then(|| (row_id.to_string(), cells))
            })
            .collect()
    }
}

/// Query output: `(row id, selected cells)` in source table order.
pub(crate) type ResultTable = Vec<(String, Row)>;

pub(crate) struct QueryState {
    pub(crate) definition: QueryDefinition,
    pub(crate) result: ResultTable,
}

/// Stable sort of row ids by one column.
///
/// Missing cells sort first when ascending. Rows with equal keys keep their
/// input order in both directions.
pub(crate) fn sort_row_ids<'a, I>(rows: I, column: Option<&str>, descending: bool) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a Row)>,
{
    let mut keyed: Vec<(&str, Option<&Cell>)> = rows
        .into_iter()
        .map(|(id, row)| (id, column.and_then(|c| row.get(c))))
        .collect();

    if column.is_some() {
        keyed.sort_by(|a, b| compare_keys(a.1, b.1, descending));
    }

    keyed.into_iter().map(|(id, _)| id.to_string()).collect()
}

fn compare_keys(a: Option<&Cell>, b: Option<&Cell>, descending: bool) -> Ordering {
    if descending {
        b.cmp(&a)
    } else {
        a.cmp(&b)
    }
}

/// A consumer-owned query: defined on creation, undefined on drop.
pub struct QueryView {
    store: Store,
    query_id: String,
    listeners: Vec<ListenerId>,
}

impl QueryView {
    pub fn define(store: &Store, query_id: impl Into<String>, definition: QueryDefinition) -> Self {
        let query_id = query_id.into();
        store.define_query(query_id.clone(), definition);
        Self {
            store: store.clone(),
            query_id,
            listeners: Vec::new(),
        }
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Swap in a new definition. Readers see either the old result or the new one.
    pub fn redefine(&self, definition: QueryDefinition) {
        self.store.define_query(self.query_id.clone(), definition);
    }

    pub fn row_ids(&self) -> Vec<String> {
        self.store
            .result_row_ids(&self.query_id)
            .unwrap_or_default()
    }

    pub fn row(&self, row_id: &str) -> Option<Row> {
        self.store
            .result_row(&self.query_id, row_id)
            .ok()
            .flatten()
    }

    pub fn sorted_ids(&self, column: Option<&str>, descending: bool) -> Vec<String> {
        self.store
            .sorted_ids(&self.query_id, column, descending)
            .unwrap_or_default()
    }

    /// Register a callback for result changes; removed when the view drops.
    pub fn on_change<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = self.store.add_query_listener(self.query_id.clone(), callback);
        self.listeners.push(id);
        id
    }
}

impl Drop for QueryView {
    fn drop(&mut self) {
        for id in self.listeners.drain(..) {
            let _ = self.store.remove_listener(id);
        }
        self.store.undefine_query(&self.query_id);
    }
}
