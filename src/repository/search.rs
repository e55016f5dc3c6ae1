//! The live manuscript search.

use crate::models::manuscript::columns;
use crate::models::MANUSCRIPTS_TABLE;
use crate::store::{ListenerId, QueryDefinition, QueryView, Row, StoreEvent};

use super::ManuscriptRepository;

pub const SEARCH_QUERY_ID: &str = "manuscriptsQuery";

/// Columns the search result carries.
pub const SEARCH_COLUMNS: &[&str] = &[
    columns::MANUSCRIPT_ID,
    columns::TITLE,
    columns::AUTHOR,
    columns::EDITOR,
    columns::TYPE,
    columns::INITIAL_SUBMISSION_DATE,
    columns::EDITORIAL_STATUS,
    columns::DAYS_WITH_EDITOR,
];

/// Manuscripts whose id contains `term` (case-sensitive). An empty term matches all.
pub fn search_definition(term: &str) -> QueryDefinition {
    let term = term.to_string();
    QueryDefinition::new(MANUSCRIPTS_TABLE)
        .select_columns(SEARCH_COLUMNS.iter().copied())
        .having(move |row| term.is_empty() || row.text(columns::MANUSCRIPT_ID).contains(&term))
}

/// Search query owned by one consumer; removed from the store on drop.
pub struct SearchView {
    view: QueryView,
    term: String,
    sort_column: String,
    descending: bool,
}

impl SearchView {
    pub fn new(repo: &ManuscriptRepository) -> Self {
        Self::with_id(repo, SEARCH_QUERY_ID)
    }

    /// Use a distinct query id when several searches share one store.
    pub fn with_id(repo: &ManuscriptRepository, query_id: &str) -> Self {
        Self {
            view: QueryView::define(repo.store(), query_id, search_definition("")),
            term: String::new(),
            sort_column: columns::INITIAL_SUBMISSION_DATE.to_string(),
            descending: false,
        }
    }

    pub fn sorted_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.sort_column = column.into();
        self.descending = descending;
        self
    }

    pub fn query_id(&self) -> &str {
        self.view.query_id()
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Replace the search term. The result swaps in one step.
    pub fn set_search(&mut self, term: &str) {
        if term == self.term {
            return;
        }
        self.term = term.to_string();
        self.view.redefine(search_definition(term));
    }

    /// Matching ids in the configured sort order.
    pub fn ids(&self) -> Vec<String> {
        self.view.sorted_ids(Some(&self.sort_column), self.descending)
    }

    pub fn row(&self, manuscript_id: &str) -> Option<Row> {
        self.view.row(manuscript_id)
    }

    pub fn on_change<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.view.on_change(callback)
    }
}
