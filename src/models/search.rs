use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::catalog::Category;

/// Normalized projection of a catalog item plus its navigation target.
/// Built fresh per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub thumbnail: Option<String>,
    pub url: String,
    pub metadata: Option<serde_json::Value>,
}

/// Ranked results for one query. `total == results.len()` and equals the sum
/// of the grouped lengths; `grouped` preserves adapter order within each
/// category.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub grouped: BTreeMap<Category, Vec<SearchResult>>,
    pub total: usize,
}

impl SearchResults {
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            results: Vec::new(),
            grouped: BTreeMap::new(),
            total: 0,
        }
    }
}
