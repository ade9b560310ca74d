use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StoreError, MODULE_PROGRESS, REVIEWED_REGIONS};

/// Pages a learner has finished in one training module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module_id: String,
    pub total_pages: u32,
    pub completed_pages: BTreeSet<u32>,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionReview {
    pub region: String,
    pub reviewed_at: DateTime<Utc>,
}

/// Auxiliary entries kept next to assessments: module progress and reviewed regions.
#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Mark `page` of `module_id` as read. Pages beyond `total_pages` are ignored.
    pub fn record_page(
        &self,
        module_id: &str,
        page: u32,
        total_pages: u32,
        now: DateTime<Utc>,
    ) -> Result<ModuleProgress, StoreError> {
        let mut progress = self
            .module_progress(module_id)?
            .unwrap_or_else(|| ModuleProgress {
                module_id: module_id.to_string(),
                total_pages,
                completed_pages: BTreeSet::new(),
                completed: false,
                updated_at: now,
            });

        progress.total_pages = total_pages;
        if page >= 1 && page <= total_pages {
            progress.completed_pages.insert(page);
        }
        progress.completed_pages.retain(|page| *page <= total_pages);
        progress.completed =
            total_pages > 0 && progress.completed_pages.len() as u32 >= total_pages;
        progress.updated_at = now;

        self.store
            .save(MODULE_PROGRESS, module_id, serde_json::to_value(&progress)?)?;
        Ok(progress)
    }

    pub fn module_progress(&self, module_id: &str) -> Result<Option<ModuleProgress>, StoreError> {
        self.store
            .load(MODULE_PROGRESS, module_id)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    pub fn all_module_progress(&self) -> Result<Vec<ModuleProgress>, StoreError> {
        self.store
            .entries(MODULE_PROGRESS)?
            .into_iter()
            .map(|(_, value)| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }

    /// Idempotent: a region already marked keeps its first review time.
    pub fn mark_region_reviewed(
        &self,
        region: &str,
        now: DateTime<Utc>,
    ) -> Result<RegionReview, StoreError> {
        if let Some(existing) = self.region_review(region)? {
            return Ok(existing);
        }

        let review = RegionReview {
            region: region.to_string(),
            reviewed_at: now,
        };
        self.store
            .save(REVIEWED_REGIONS, region, serde_json::to_value(&review)?)?;
        Ok(review)
    }

    pub fn region_review(&self, region: &str) -> Result<Option<RegionReview>, StoreError> {
        self.store
            .load(REVIEWED_REGIONS, region)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    pub fn reviewed_regions(&self) -> Result<Vec<RegionReview>, StoreError> {
        self.store
            .entries(REVIEWED_REGIONS)?
            .into_iter()
            .map(|(_, value)| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }
}
