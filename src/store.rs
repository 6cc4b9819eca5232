//! Named layouts kept in a JSON file.

use crate::error::Result;
use crate::model::Block;
use chrono::{DateTime, Local, Utc};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SavedLayout {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub data: Vec<Block>,
}

impl SavedLayout {
    /// `name (local time)` as shown in the saved layouts table.
    pub fn label(&self) -> String {
        let local: DateTime<Local> = self.timestamp.with_timezone(&Local);
        format!("{} ({})", self.name, local.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[derive(Debug)]
pub struct LayoutStore {
    path: PathBuf,
    layouts: Vec<SavedLayout>,
}

impl LayoutStore {
    /// Reads the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let layouts = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            Vec::new()
        };
        Ok(Self { path, layouts })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layouts(&self) -> &[SavedLayout] {
        &self.layouts
    }

    pub fn get(&self, index: usize) -> Option<&SavedLayout> {
        self.layouts.get(index)
    }

    pub fn save_layout(&mut self, name: &str, data: &[Block]) -> Result<()> {
        self.layouts.push(SavedLayout {
            name: name.to_string(),
            timestamp: Utc::now(),
            data: data.to_vec(),
        });
        self.persist()?;
        log::info!("saved layout `{name}` to {}", self.path.display());
        Ok(())
    }

    /// Removes every layout called `name`. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> Result<usize> {
        let before = self.layouts.len();
        self.layouts.retain(|l| l.name != name);
        let removed = before - self.layouts.len();
        if removed > 0 {
            self.persist()?;
            log::info!("deleted layout `{name}` ({removed} entries)");
        }
        Ok(removed)
    }

    /// Indices of layouts whose name fuzzily matches `query`, best first.
    /// An empty query lists everything in save order.
    pub fn filter(&self, query: &str) -> Vec<usize> {
        let query = query.trim();
        if query.is_empty() {
            return (0..self.layouts.len()).collect();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, usize)> = self
            .layouts
            .iter()
            .enumerate()
            .filter_map(|(i, l)| matcher.fuzzy_match(&l.name, query).map(|s| (s, i)))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, i)| i).collect()
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.layouts)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
