//! In-memory reactive table store.
//!
//! The store holds named tables of rows plus derived state (queries and
//! indexes) and notifies listeners after each committed batch.
//!
//! Writes are staged in a [`Transaction`] and applied under a single write
//! lock, together with the recomputation of every dependent query and index.
//! Readers therefore see either the state before a batch or the state after
//! it, never a prefix. Listeners run after the lock is released, once per
//! batch per changed table, query, or index, so they may read the store.

mod cell;
pub mod index;
pub mod query;
mod table;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

pub use cell::{Cell, Row, RowExt};
pub use index::IndexDefinition;
pub use query::{Having, QueryDefinition, QueryView, RowAccessor};
pub use table::Table;

use index::IndexState;
use query::QueryState;

/// Handle returned when registering a listener.
pub type ListenerId = u64;

/// Errors from store operations that name derived state or listeners.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Listener not registered: {0}")]
    UnknownListener(ListenerId),

    #[error("Query not defined: {0}")]
    UnknownQuery(String),

    #[error("Index not defined: {0}")]
    UnknownIndex(String),
}

/// Change notification delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Rows of a table were created or replaced by one batch.
    TableChanged {
        table_id: String,
        row_ids: Vec<String>,
    },
    /// A query's result changed, or the query was removed.
    QueryChanged { query_id: String },
    /// An index's slices changed, or the index was redefined or removed.
    IndexChanged { index_id: String },
}

impl StoreEvent {
    fn topic(&self) -> Topic {
        match self {
            StoreEvent::TableChanged { table_id, .. } => Topic::Table(table_id.clone()),
            StoreEvent::QueryChanged { query_id } => Topic::Query(query_id.clone()),
            StoreEvent::IndexChanged { index_id } => Topic::Index(index_id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Topic {
    Table(String),
    Query(String),
    Index(String),
}

type Callback = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

#[derive(Default)]
struct StoreState {
    tables: HashMap<String, Table>,
    queries: BTreeMap<String, QueryState>,
    indexes: BTreeMap<String, IndexState>,
}

impl StoreState {
    /// Recompute queries and indexes over changed tables, returning the events to send.
    fn refresh_derived(&mut self, changed: &BTreeMap<String, Vec<String>>) -> Vec<StoreEvent> {
        let mut events: Vec<StoreEvent> = changed
            .iter()
            .map(|(table_id, row_ids)| StoreEvent::TableChanged {
                table_id: table_id.clone(),
                row_ids: row_ids.clone(),
            })
            .collect();

        let StoreState {
            tables,
            queries,
            indexes,
        } = self;

        for (query_id, query) in queries.iter_mut() {
            let source = query.definition.source_table();
            if !changed.contains_key(source) {
                continue;
            }
            let result = query.definition.evaluate(tables.get(source));
            if result != query.result {
                query.result = result;
                events.push(StoreEvent::QueryChanged {
                    query_id: query_id.clone(),
                });
            }
        }

        for (index_id, index) in indexes.iter_mut() {
            let source = index.definition.source_table.as_str();
            if !changed.contains_key(source) {
                continue;
            }
            let slices = index.definition.build(tables.get(source));
            if slices != index.slices {
                index.slices = slices;
                events.push(StoreEvent::IndexChanged {
                    index_id: index_id.clone(),
                });
            }
        }

        events
    }
}

#[derive(Default)]
struct Listeners {
    next_id: ListenerId,
    entries: BTreeMap<ListenerId, (Topic, Callback)>,
}

#[derive(Default)]
struct Inner {
    state: RwLock<StoreState>,
    listeners: Mutex<Listeners>,
}

/// Shared handle to the store. Clones refer to the same data.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Inner>,
}

/// Writes staged for one atomic batch.
///
/// Reads through the transaction see its own staged writes first.
pub struct Transaction<'a> {
    store: &'a Store,
    writes: Vec<(String, String, Row)>,
    latest: HashMap<(String, String), usize>,
}

impl<'a> Transaction<'a> {
    fn new(store: &'a Store) -> Self {
        Self {
            store,
            writes: Vec::new(),
            latest: HashMap::new(),
        }
    }

    /// Stage a full replacement of one row.
    pub fn set_row(&mut self, table_id: impl Into<String>, row_id: impl Into<String>, row: Row) {
        let key = (table_id.into(), row_id.into());
        self.latest.insert(key.clone(), self.writes.len());
        self.writes.push((key.0, key.1, row));
    }

    pub fn get_row(&self, table_id: &str, row_id: &str) -> Option<Row> {
        let key = (table_id.to_string(), row_id.to_string());
        match self.latest.get(&key) {
            Some(&i) => Some(self.writes[i].2.clone()),
            None => self.store.get_row(table_id, row_id),
        }
    }

    /// Number of staged writes, including overwrites of the same row.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ---- writes ----

    /// Run `f` against a fresh transaction and commit everything it staged as one batch.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut Transaction<'_>) -> R) -> R {
        let mut tx = Transaction::new(self);
        let result = f(&mut tx);
        let writes = std::mem::take(&mut tx.writes);
        self.commit(writes);
        result
    }

    /// Upsert one row. Returns `true` if stored data changed.
    pub fn set_row(&self, table_id: impl Into<String>, row_id: impl Into<String>, row: Row) -> bool {
        self.commit(vec![(table_id.into(), row_id.into(), row)]) > 0
    }

    /// Upsert many rows of one table as a single batch.
    ///
    /// Returns the number of distinct rows whose stored data changed.
    pub fn write_batch<I, K>(&self, table_id: &str, rows: I) -> usize
    where
        I: IntoIterator<Item = (K, Row)>,
        K: Into<String>,
    {
        let writes = rows
            .into_iter()
            .map(|(row_id, row)| (table_id.to_string(), row_id.into(), row))
            .collect();
        self.commit(writes)
    }

    fn commit(&self, writes: Vec<(String, String, Row)>) -> usize {
        if writes.is_empty() {
            return 0;
        }
        let staged = writes.len();

        let (events, changed_rows) = {
            let mut state = self.write_state();
            let mut changed: BTreeMap<String, Vec<String>> = BTreeMap::new();
            let mut seen: HashSet<(String, String)> = HashSet::new();

            for (table_id, row_id, row) in writes {
                let table = state.tables.entry(table_id.clone()).or_default();
                if table.set_row(row_id.clone(), row)
                    && seen.insert((table_id.clone(), row_id.clone()))
                {
                    changed.entry(table_id).or_default().push(row_id);
                }
            }

            let changed_rows = changed.values().map(Vec::len).sum::<usize>();
            (state.refresh_derived(&changed), changed_rows)
        };

        debug!(
            "Committed batch: {} writes, {} rows changed, {} events",
            staged,
            changed_rows,
            events.len()
        );
        self.dispatch(&events);
        changed_rows
    }

    // ---- reads ----

    pub fn get_row(&self, table_id: &str, row_id: &str) -> Option<Row> {
        self.read_state()
            .tables
            .get(table_id)
            .and_then(|t| t.get(row_id))
            .cloned()
    }

    pub fn get_cell(&self, table_id: &str, row_id: &str, column: &str) -> Option<Cell> {
        self.read_state()
            .tables
            .get(table_id)
            .and_then(|t| t.get(row_id))
            .and_then(|row| row.get(column))
            .cloned()
    }

    pub fn has_row(&self, table_id: &str, row_id: &str) -> bool {
        self.read_state()
            .tables
            .get(table_id)
            .is_some_and(|t| t.contains(row_id))
    }

    /// Copy of a table; empty if it does not exist.
    pub fn get_table(&self, table_id: &str) -> Table {
        self.read_state()
            .tables
            .get(table_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Run `f` against a table without copying it.
    pub fn with_table<R>(&self, table_id: &str, f: impl FnOnce(Option<&Table>) -> R) -> R {
        let state = self.read_state();
        f(state.tables.get(table_id))
    }

    /// Copies of several tables taken under one read, so they agree with each other.
    pub fn get_tables(&self, table_ids: &[&str]) -> Vec<Table> {
        let state = self.read_state();
        table_ids
            .iter()
            .map(|id| state.tables.get(*id).cloned().unwrap_or_default())
            .collect()
    }

    pub fn row_ids(&self, table_id: &str) -> Vec<String> {
        self.with_table(table_id, |t| t.map(|t| t.row_ids().to_vec()).unwrap_or_default())
    }

    pub fn row_count(&self, table_id: &str) -> usize {
        self.with_table(table_id, |t| t.map_or(0, Table::len))
    }

    pub fn table_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read_state().tables.keys().cloned().collect();
        ids.sort();
        ids
    }

    // ---- queries ----

    /// Define or replace a query. The new result is computed and swapped in
    /// under the write lock.
    pub fn define_query(&self, query_id: impl Into<String>, definition: QueryDefinition) {
        let query_id = query_id.into();
        let changed = {
            let mut state = self.write_state();
            let result = definition.evaluate(state.tables.get(definition.source_table()));
            let changed = state
                .queries
                .get(&query_id)
                .map_or(true, |old| old.result != result);
            state
                .queries
                .insert(query_id.clone(), QueryState { definition, result });
            changed
        };

        debug!("Defined query {}", query_id);
        if changed {
            self.dispatch(&[StoreEvent::QueryChanged { query_id }]);
        }
    }

    /// Remove a query. Returns `false` if it was not defined.
    pub fn undefine_query(&self, query_id: &str) -> bool {
        let removed = self.write_state().queries.remove(query_id).is_some();
        if removed {
            debug!("Removed query {}", query_id);
            self.dispatch(&[StoreEvent::QueryChanged {
                query_id: query_id.to_string(),
            }]);
        }
        removed
    }

    pub fn has_query(&self, query_id: &str) -> bool {
        self.read_state().queries.contains_key(query_id)
    }

    /// Result row ids in source table order.
    pub fn result_row_ids(&self, query_id: &str) -> Result<Vec<String>, StoreError> {
        let state = self.read_state();
        let query = state
            .queries
            .get(query_id)
            .ok_or_else(|| StoreError::UnknownQuery(query_id.to_string()))?;
        Ok(query.result.iter().map(|(id, _)| id.clone()).collect())
    }

    /// Selected cells of one result row.
    pub fn result_row(&self, query_id: &str, row_id: &str) -> Result<Option<Row>, StoreError> {
        let state = self.read_state();
        let query = state
            .queries
            .get(query_id)
            .ok_or_else(|| StoreError::UnknownQuery(query_id.to_string()))?;
        Ok(query
            .result
            .iter()
            .find(|(id, _)| id == row_id)
            .map(|(_, row)| row.clone()))
    }

    /// Result row ids stably sorted by a selected column.
    pub fn sorted_ids(
        &self,
        query_id: &str,
        sort_column: Option<&str>,
        descending: bool,
    ) -> Result<Vec<String>, StoreError> {
        let state = self.read_state();
        let query = state
            .queries
            .get(query_id)
            .ok_or_else(|| StoreError::UnknownQuery(query_id.to_string()))?;
        Ok(query::sort_row_ids(
            query.result.iter().map(|(id, row)| (id.as_str(), row)),
            sort_column,
            descending,
        ))
    }

    // ---- indexes ----

    pub fn define_index(&self, index_id: impl Into<String>, definition: IndexDefinition) {
        let index_id = index_id.into();
        let changed = {
            let mut state = self.write_state();
            let slices = definition.build(state.tables.get(&definition.source_table));
            let changed = state
                .indexes
                .get(&index_id)
                .map_or(true, |old| old.slices != slices || old.definition != definition);
            state
                .indexes
                .insert(index_id.clone(), IndexState { definition, slices });
            changed
        };

        if changed {
            self.dispatch(&[StoreEvent::IndexChanged { index_id }]);
        }
    }

    pub fn undefine_index(&self, index_id: &str) -> bool {
        let removed = self.write_state().indexes.remove(index_id).is_some();
        if removed {
            self.dispatch(&[StoreEvent::IndexChanged {
                index_id: index_id.to_string(),
            }]);
        }
        removed
    }

    pub fn has_index(&self, index_id: &str) -> bool {
        self.read_state().indexes.contains_key(index_id)
    }

    pub fn slice_ids(&self, index_id: &str) -> Result<Vec<String>, StoreError> {
        let state = self.read_state();
        let index = state
            .indexes
            .get(index_id)
            .ok_or_else(|| StoreError::UnknownIndex(index_id.to_string()))?;
        Ok(index.slices.keys().cloned().collect())
    }

    /// Row ids in one slice; empty when the slice has no rows.
    pub fn slice_row_ids(&self, index_id: &str, slice_id: &str) -> Result<Vec<String>, StoreError> {
        let state = self.read_state();
        let index = state
            .indexes
            .get(index_id)
            .ok_or_else(|| StoreError::UnknownIndex(index_id.to_string()))?;
        Ok(index.slices.get(slice_id).cloned().unwrap_or_default())
    }

    /// Rows of one slice, in slice order, read from the index's source table.
    pub fn slice_rows(
        &self,
        index_id: &str,
        slice_id: &str,
    ) -> Result<Vec<(String, Row)>, StoreError> {
        let state = self.read_state();
        let index = state
            .indexes
            .get(index_id)
            .ok_or_else(|| StoreError::UnknownIndex(index_id.to_string()))?;
        let Some(table) = state.tables.get(&index.definition.source_table) else {
            return Ok(Vec::new());
        };
        Ok(index
            .slices
            .get(slice_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| table.get(id).map(|row| (id.clone(), row.clone())))
                    .collect()
            })
            .unwrap_or_default())
    }

    // ---- listeners ----

    fn add_listener(&self, topic: Topic, callback: Callback) -> ListenerId {
        let mut listeners = self.lock_listeners();
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners.entries.insert(id, (topic, callback));
        id
    }

    /// Called once per committed batch that changes the table.
    pub fn add_table_listener<F>(&self, table_id: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.add_listener(Topic::Table(table_id.into()), Arc::new(callback))
    }

    /// Called when the query's result changes or the query is removed.
    pub fn add_query_listener<F>(&self, query_id: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.add_listener(Topic::Query(query_id.into()), Arc::new(callback))
    }

    pub fn add_index_listener<F>(&self, index_id: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.add_listener(Topic::Index(index_id.into()), Arc::new(callback))
    }

    pub fn remove_listener(&self, id: ListenerId) -> Result<(), StoreError> {
        self.lock_listeners()
            .entries
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::UnknownListener(id))
    }

    fn dispatch(&self, events: &[StoreEvent]) {
        for event in events {
            let topic = event.topic();
            let callbacks: Vec<Callback> = self
                .lock_listeners()
                .entries
                .values()
                .filter(|(t, _)| *t == topic)
                .map(|(_, cb)| Arc::clone(cb))
                .collect();
            for callback in callbacks {
                callback(event);
            }
        }
    }
}
