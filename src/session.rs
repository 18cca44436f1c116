//! The per-session context shared by every dashboard view.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::filter::{FilterParams, FilteredView, apply_filters};
use crate::loader::{Dataset, DatasetCache, SourcePaths, SourceVersion};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ViewKey {
    version: SourceVersion,
    params: FilterParams,
}

/// Owns the loaded dataset and memoizes filtered views on
/// (source version, filter parameters).
#[derive(Debug)]
pub struct Session {
    dataset: Arc<Dataset>,
    views: HashMap<ViewKey, Arc<FilteredView>>,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            views: HashMap::new(),
        }
    }

    /// Loads (or reuses) the dataset for `paths` and starts a session on it.
    pub fn open(cache: &mut DatasetCache, paths: &SourcePaths) -> Result<Self> {
        Ok(Self::new(cache.get_or_load(paths)?))
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Filter state matching the dashboard's initial controls.
    pub fn default_filters(&self) -> Option<FilterParams> {
        FilterParams::defaults_for(&self.dataset)
    }

    /// The view for `params`, computed once per distinct parameter set.
    pub fn filtered(&mut self, params: &FilterParams) -> Arc<FilteredView> {
        let key = ViewKey {
            version: self.dataset.version.clone(),
            params: params.clone(),
        };

        if let Some(view) = self.views.get(&key) {
            debug!("Filtered view cache hit");
            return Arc::clone(view);
        }

        let view = Arc::new(apply_filters(&self.dataset, params));
        debug!(
            articles = view.articles.len(),
            readers = view.readers.len(),
            "Filtered view computed"
        );
        self.views.insert(key, Arc::clone(&view));
        view
    }

    pub fn cached_views(&self) -> usize {
        self.views.len()
    }
}
