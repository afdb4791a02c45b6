use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::data::aggregate::Summary;
use crate::data::cache::DatasetCache;
use crate::data::filter::{filtered_indices, FilteredView, Selection};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Memoized dataset loads.
    pub cache: DatasetCache,

    /// File the current dataset came from (or failed to come from).
    pub data_path: PathBuf,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Sidebar year / genre selections.
    pub selection: Selection,

    /// Indices of tracks passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates of the visible tracks (cached).
    pub summary: Summary,

    /// Length of the detail table.
    pub top_n: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            cache: DatasetCache::new(),
            data_path: config.data.clone(),
            dataset: None,
            selection: Selection::default(),
            visible_indices: Vec::new(),
            summary: Summary::default(),
            top_n: config.top_n,
            status_message: None,
        }
    }

    /// Load `path` through the cache. On failure the dashboard is cleared
    /// and the error kept for display.
    pub fn open(&mut self, path: PathBuf) {
        match self.cache.load(&path) {
            Ok(dataset) => {
                self.data_path = path;
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.data_path = path;
                self.dataset = None;
                self.selection = Selection::default();
                self.visible_indices.clear();
                self.summary = Summary::default();
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Drop every cached dataset and read the current file again.
    pub fn reload(&mut self) {
        log::info!(
            "Reloading {} ({} cached dataset(s) dropped)",
            self.data_path.display(),
            self.cache.len()
        );
        self.cache.clear();
        self.open(self.data_path.clone());
    }

    /// Ingest a newly loaded dataset with everything selected.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        if dataset.is_empty() {
            log::warn!("{} contains no tracks", self.data_path.display());
        }
        self.selection = Selection::all(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and `summary` after a selection change.
    pub fn refilter(&mut self) {
        let Some(ds) = self.dataset.as_deref() else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.selection);
        self.summary = Summary::compute(FilteredView::new(ds, &self.visible_indices), self.top_n);
        log::debug!(
            "{} of {} tracks selected ({} years, {} genres)",
            self.visible_indices.len(),
            ds.len(),
            self.selection.years.len(),
            self.selection.genres.len()
        );
    }

    pub fn toggle_year(&mut self, year: i32) {
        self.selection.toggle_year(year);
        self.refilter();
    }

    pub fn toggle_genre(&mut self, genre: &str) {
        self.selection.toggle_genre(genre);
        self.refilter();
    }

    /// Select every year (`true`) or none (`false`).
    pub fn select_all_years(&mut self, all: bool) {
        self.selection.years = match (&self.dataset, all) {
            (Some(ds), true) => ds.years.clone(),
            _ => Default::default(),
        };
        self.refilter();
    }

    /// Select every genre (`true`) or none (`false`).
    pub fn select_all_genres(&mut self, all: bool) {
        self.selection.genres = match (&self.dataset, all) {
            (Some(ds), true) => ds.genres.clone(),
            _ => Default::default(),
        };
        self.refilter();
    }
}
