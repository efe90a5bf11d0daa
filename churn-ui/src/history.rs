//! Per-session prediction history
//!
//! Owned, ordered, most-recent-first. Only [`PredictionHistory::add`] and
//! [`PredictionHistory::remove`] change it; the rendered table is derived
//! from [`PredictionHistory::entries`] on every page load.

use chrono::{DateTime, Utc};
use churn_common::{ChurnLabel, FeatureVector};
use uuid::Uuid;

/// One successful prediction made in this session
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub features: FeatureVector,
    /// Free-text label typed by the user; display only, never sent to the service
    pub display_name: Option<String>,
    pub prediction: ChurnLabel,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        features: FeatureVector,
        display_name: Option<String>,
        prediction: ChurnLabel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            features,
            display_name,
            prediction,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PredictionHistory {
    entries: Vec<HistoryEntry>,
}

impl PredictionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front; the newest entry is always first
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
    }

    /// Remove the entry with `id`, keeping the order of the rest
    ///
    /// Returns false if no such entry exists (already deleted or never added).
    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
