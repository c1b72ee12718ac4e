use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;

use crate::catalog::Catalog;
use crate::data::KeyValueStore;
use crate::models::catalog::Category;
use crate::models::search::SearchResult;

pub const RECENT_SEARCHES_KEY: &str = "recent_searches";
const MAX_RECENT_SEARCHES: usize = 10;
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Produces ranked results for a free-text query and owns recent-search
/// persistence. Query-length validation lives in the calling service.
pub trait SearchAdapter: Send + Sync {
    fn search(&self, query: &str) -> Vec<SearchResult>;
    fn add_recent_search(&self, query: &str);
    fn recent_searches(&self) -> Vec<String>;
    fn clear_recent_searches(&self);
}

/// Permissive two-way match: the field contains the whole query, or every
/// query token is a substring of (or contains) some field token. The reverse
/// containment is limited to field tokens of at least two characters so that
/// single-letter field tokens do not match every query word.
pub fn fuzzy_match(field: &str, query: &str) -> bool {
    let field = field.to_lowercase();
    let query = query.to_lowercase();
    if field.contains(&query) {
        return true;
    }

    let field_tokens: Vec<&str> = field.split_whitespace().collect();
    if field_tokens.is_empty() {
        return false;
    }

    query.split_whitespace().all(|qt| {
        field_tokens
            .iter()
            .any(|ft| ft.contains(qt) || (ft.chars().count() >= 2 && qt.contains(*ft)))
    })
}

/// Title-only relevance: exact 100, prefix 80, substring 60, else the
/// fraction of query words present in the title scaled to 40.
pub fn relevance_score(title: &str, query: &str) -> f32 {
    let title = title.to_lowercase();
    let query = query.to_lowercase();

    if title == query {
        return 100.0;
    }
    if title.starts_with(&query) {
        return 80.0;
    }
    if title.contains(&query) {
        return 60.0;
    }

    let words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let found = words.iter().filter(|w| title.contains(*w)).count();
    (found as f32 / words.len() as f32) * 40.0
}

struct CachedQuery {
    results: Vec<SearchResult>,
    stored_at: Instant,
}

impl CachedQuery {
    fn expired(&self) -> bool {
        self.stored_at.elapsed() >= CACHE_TTL
    }
}

/// In-memory search over the static catalog with a per-query TTL cache.
/// The cache is unbounded between sweeps; the catalog is small enough that
/// this is acceptable.
pub struct CatalogSearchAdapter {
    catalog: Arc<Catalog>,
    store: Arc<dyn KeyValueStore>,
    cache: Mutex<HashMap<String, CachedQuery>>,
}

impl CatalogSearchAdapter {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            catalog,
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Periodic eviction of expired cache entries.
    pub fn spawn_cache_sweeper(adapter: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let adapter = Arc::clone(adapter);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tick.tick().await;
                adapter.sweep_cache();
            }
        })
    }

    pub fn sweep_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|_, entry| !entry.expired());
    }

    #[cfg(test)]
    fn cached_query_count(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Full scan of every collection, in category order: books, bhajans,
    /// videos, vidhis, panchang.
    fn scan(&self, query: &str) -> Vec<SearchResult> {
        self.catalog.record_scan();
        let mut scored: Vec<(f32, SearchResult)> = Vec::new();

        for book in &self.catalog.books {
            let fields = [
                book.title.as_str(),
                book.author.as_str(),
                book.description.as_str(),
                book.category.as_str(),
            ];
            if fields.iter().any(|f| fuzzy_match(f, query)) {
                scored.push((
                    relevance_score(&book.title, query),
                    SearchResult {
                        id: book.id.clone(),
                        title: book.title.clone(),
                        description: Some(book.description.clone()),
                        category: Category::Books,
                        thumbnail: book.cover_url.clone(),
                        url: format!("{}/{}", Category::Books.route_prefix(), book.id),
                        metadata: Some(json!({
                            "author": book.author,
                            "price": book.price,
                        })),
                    },
                ));
            }
        }

        for bhajan in &self.catalog.bhajans {
            let fields = [
                bhajan.title.as_str(),
                bhajan.artist.as_str(),
                bhajan.lyrics.as_str(),
                bhajan.deity.as_str(),
                bhajan.category.as_str(),
            ];
            if fields.iter().any(|f| fuzzy_match(f, query)) {
                scored.push((
                    relevance_score(&bhajan.title, query),
                    SearchResult {
                        id: bhajan.id.clone(),
                        title: bhajan.title.clone(),
                        description: Some(bhajan.artist.clone()),
                        category: Category::Bhajans,
                        thumbnail: None,
                        url: format!("{}/{}", Category::Bhajans.route_prefix(), bhajan.id),
                        metadata: Some(json!({
                            "deity": bhajan.deity,
                            "audio_url": bhajan.audio_url,
                        })),
                    },
                ));
            }
        }

        for video in &self.catalog.videos {
            let fields = [
                video.title.as_str(),
                video.description.as_str(),
                video.channel.as_str(),
            ];
            if fields.iter().any(|f| fuzzy_match(f, query)) {
                scored.push((
                    relevance_score(&video.title, query),
                    SearchResult {
                        id: video.id.clone(),
                        title: video.title.clone(),
                        description: Some(video.description.clone()),
                        category: Category::Videos,
                        thumbnail: video.thumbnail_url.clone(),
                        url: format!("{}/{}", Category::Videos.route_prefix(), video.id),
                        metadata: Some(json!({ "channel": video.channel })),
                    },
                ));
            }
        }

        for vidhi in &self.catalog.vidhis {
            let mut matched = [
                vidhi.title.as_str(),
                vidhi.description.as_str(),
                vidhi.deity.as_str(),
            ]
            .iter()
            .any(|f| fuzzy_match(f, query));
            matched = matched || vidhi.steps.iter().any(|s| fuzzy_match(&s.title, query));

            if matched {
                scored.push((
                    relevance_score(&vidhi.title, query),
                    SearchResult {
                        id: vidhi.id.clone(),
                        title: vidhi.title.clone(),
                        description: Some(vidhi.description.clone()),
                        category: Category::Vidhis,
                        thumbnail: None,
                        url: format!("{}/{}", Category::Vidhis.route_prefix(), vidhi.id),
                        metadata: Some(json!({
                            "deity": vidhi.deity,
                            "steps": vidhi.steps.len(),
                        })),
                    },
                ));
            }
        }

        // Panchang is scanned across every (date, city) entry, past and
        // future alike.
        for entry in &self.catalog.panchang {
            let mut matched = entry.festivals.iter().any(|f| fuzzy_match(f, query));
            matched = matched
                || fuzzy_match(&entry.tithi, query)
                || fuzzy_match(&entry.nakshatra, query);

            if matched {
                let title = format!("Panchang for {} on {}", entry.city, entry.date);
                scored.push((
                    relevance_score(&title, query),
                    SearchResult {
                        id: entry.id(),
                        title,
                        description: Some(format!(
                            "Tithi {}, Nakshatra {}",
                            entry.tithi, entry.nakshatra
                        )),
                        category: Category::Panchang,
                        thumbnail: None,
                        url: format!(
                            "{}/{}/{}",
                            Category::Panchang.route_prefix(),
                            entry.date,
                            entry.city.to_lowercase().replace(' ', "-"),
                        ),
                        metadata: Some(json!({ "festivals": entry.festivals })),
                    },
                ));
            }
        }

        // Stable sort keeps scan order among equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().map(|(_, result)| result).collect()
    }
}

impl SearchAdapter for CatalogSearchAdapter {
    fn search(&self, query: &str) -> Vec<SearchResult> {
        let key = query.trim().to_lowercase();

        {
            let cache = self
                .cache
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(entry) = cache.get(&key) {
                if !entry.expired() {
                    return entry.results.clone();
                }
            }
        }

        let results = self.scan(query.trim());

        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                key,
                CachedQuery {
                    results: results.clone(),
                    stored_at: Instant::now(),
                },
            );

        results
    }

    fn add_recent_search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let mut list = self.recent_searches();
        let lowered = query.to_lowercase();
        list.retain(|entry| entry.to_lowercase() != lowered);
        list.insert(0, query.to_string());
        list.truncate(MAX_RECENT_SEARCHES);

        match serde_json::to_string(&list) {
            Ok(json) => self.store.set(RECENT_SEARCHES_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to encode recent searches"),
        }
    }

    /// Soft-fail: absent or corrupt stored history reads as empty.
    fn recent_searches(&self) -> Vec<String> {
        let Some(raw) = self.store.get(RECENT_SEARCHES_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "corrupt recent-search history, treating as empty");
                Vec::new()
            }
        }
    }

    fn clear_recent_searches(&self) {
        self.store.remove(RECENT_SEARCHES_KEY);
    }
}
