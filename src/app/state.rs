// JobPulse - app/state.rs
//
// Session state: the loaded table, its load error, the active filter and
// the current filtered view.

use crate::app::loader::LoadOutcome;
use crate::core::filter::{FilterOptions, FilterState};
use crate::core::model::NormalizedTable;
use crate::core::summary::{Summary, SummaryConfig};
use crate::util::error::LoadError;
use std::sync::Arc;

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Shared, immutable normalised table (empty after a failed load).
    pub table: Arc<NormalizedTable>,

    /// Table-level error from the most recent load.
    pub load_error: Option<LoadError>,

    /// Current filter configuration.
    pub filter_state: FilterState,

    /// Indices of rows matching the current filter (into `table.records()`).
    pub filtered_indices: Vec<usize>,
}

impl AppState {
    /// Create state from a load outcome. The view starts unfiltered.
    pub fn new(outcome: LoadOutcome) -> Self {
        let filtered_indices = (0..outcome.table.len()).collect();
        Self {
            table: outcome.table,
            load_error: outcome.error,
            filter_state: FilterState::default(),
            filtered_indices,
        }
    }

    /// Replace the filter and recompute the view.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter_state = filter;
        self.apply_filters();
    }

    /// Recompute filtered indices from the table and filter state.
    pub fn apply_filters(&mut self) {
        self.filtered_indices =
            crate::core::filter::apply_filters(&self.table, &self.filter_state);
        tracing::debug!(
            total = self.table.len(),
            visible = self.filtered_indices.len(),
            "Filters applied"
        );
    }

    /// Number of rows in the current view.
    pub fn filtered_count(&self) -> usize {
        self.filtered_indices.len()
    }

    /// Choices available for filtering the full table.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_table(&self.table)
    }

    /// Summary of the current view.
    pub fn summary(&self, config: &SummaryConfig) -> Summary {
        Summary::compute(&self.table, &self.filtered_indices, config)
    }
}
