//! Per-category high scores
//!
//! Saved as part of [`crate::persistence::SaveData`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Best level score for each category that has been completed at least once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    scores: BTreeMap<String, u32>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best score for `category`, 0 if never completed
    pub fn best(&self, category: &str) -> u32 {
        self.scores.get(category).copied().unwrap_or(0)
    }

    /// Check if a score would replace the current best
    pub fn qualifies(&self, category: &str, score: u32) -> bool {
        score > self.best(category)
    }

    /// Record a completed level. Returns true on a new best.
    pub fn record(&mut self, category: &str, score: u32) -> bool {
        if !self.qualifies(category, score) {
            return false;
        }
        self.scores.insert(category.to_string(), score);
        log::info!("New high score for {}: {}", category, score);
        true
    }

    /// Drop categories not in `known`
    pub fn retain_known(&mut self, known: impl Fn(&str) -> bool) {
        self.scores.retain(|id, _| known(id));
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Highest score over all categories
    pub fn top_score(&self) -> Option<u32> {
        self.scores.values().copied().max()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.scores.iter().map(|(id, score)| (id.as_str(), *score))
    }
}
