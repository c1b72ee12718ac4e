use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::models::catalog::Category;
use crate::models::search::{SearchResult, SearchResults};
use crate::services::search_adapter::SearchAdapter;

const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Single search entry point for the UI layer. Constructed explicitly and
/// passed through the composition root; there is no module-level instance.
pub struct SearchService {
    adapter: RwLock<Arc<dyn SearchAdapter>>,
}

impl SearchService {
    pub fn new(adapter: Arc<dyn SearchAdapter>) -> Self {
        Self {
            adapter: RwLock::new(adapter),
        }
    }

    /// Swap the underlying adapter.
    pub fn set_adapter(&self, adapter: Arc<dyn SearchAdapter>) {
        let mut guard = self
            .adapter
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = adapter;
    }

    fn adapter(&self) -> Arc<dyn SearchAdapter> {
        self.adapter
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Trims the query; queries shorter than two characters return an empty
    /// result without touching the adapter. Successful non-empty queries are
    /// recorded into recent-search history off the calling path.
    pub async fn query(&self, raw: &str) -> SearchResults {
        let trimmed = raw.trim();
        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return SearchResults::empty(trimmed);
        }

        let adapter = self.adapter();
        let results = adapter.search(trimmed);

        let mut grouped: BTreeMap<Category, Vec<SearchResult>> = BTreeMap::new();
        for result in &results {
            grouped.entry(result.category).or_default().push(result.clone());
        }

        if !results.is_empty() {
            let adapter = Arc::clone(&adapter);
            let query = trimmed.to_string();
            tokio::spawn(async move {
                adapter.add_recent_search(&query);
            });
        }

        SearchResults {
            query: trimmed.to_string(),
            total: results.len(),
            results,
            grouped,
        }
    }

    pub fn recent_searches(&self) -> Vec<String> {
        self.adapter().recent_searches()
    }

    pub fn clear_recent_searches(&self) {
        self.adapter().clear_recent_searches();
    }
}

/// Fixed-delay debouncer for interactive input: each call aborts the pending
/// action, so only the last call within the window runs.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn call<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action().await;
        }));
    }

    pub fn cancel(&self) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Adapter double that counts calls and returns a fixed result set.
    struct CountingAdapter {
        search_calls: AtomicUsize,
        results: Vec<SearchResult>,
        recent: Mutex<Vec<String>>,
    }

    impl CountingAdapter {
        fn new(results: Vec<SearchResult>) -> Self {
            Self {
                search_calls: AtomicUsize::new(0),
                results,
                recent: Mutex::new(Vec::new()),
            }
        }
    }

    impl SearchAdapter for CountingAdapter {
        fn search(&self, _query: &str) -> Vec<SearchResult> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            self.results.clone()
        }

        fn add_recent_search(&self, query: &str) {
            self.recent.lock().unwrap().push(query.to_string());
        }

        fn recent_searches(&self) -> Vec<String> {
            self.recent.lock().unwrap().clone()
        }

        fn clear_recent_searches(&self) {
            self.recent.lock().unwrap().clear();
        }
    }

    fn result(id: &str, category: Category) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: format!("title {id}"),
            description: None,
            category,
            thumbnail: None,
            url: format!("{}/{id}", category.route_prefix()),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_short_query_never_touches_adapter() {
        let adapter = Arc::new(CountingAdapter::new(vec![result("b1", Category::Books)]));
        let service = SearchService::new(adapter.clone());

        for raw in ["", " ", "g", "  g  "] {
            let out = service.query(raw).await;
            assert_eq!(out.total, 0);
            assert!(out.results.is_empty());
            assert!(out.grouped.is_empty());
        }

        assert_eq!(adapter.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_grouping_preserves_order_and_counts() {
        let adapter = Arc::new(CountingAdapter::new(vec![
            result("b1", Category::Books),
            result("bh1", Category::Bhajans),
            result("b2", Category::Books),
            result("p1", Category::Panchang),
        ]));
        let service = SearchService::new(adapter);

        let out = service.query("ganesh").await;
        assert_eq!(out.total, 4);
        assert_eq!(out.results.len(), 4);

        let group_sum: usize = out.grouped.values().map(Vec::len).sum();
        assert_eq!(group_sum, out.total);

        let books: Vec<&str> = out.grouped[&Category::Books]
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(books, vec!["b1", "b2"]);
    }

    #[tokio::test]
    async fn test_successful_query_recorded_into_recent_history() {
        let adapter = Arc::new(CountingAdapter::new(vec![result("b1", Category::Books)]));
        let service = SearchService::new(adapter.clone());

        service.query("  Ganesh  ").await;

        // recording happens on a spawned task
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(adapter.recent_searches(), vec!["Ganesh".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_result_not_recorded() {
        let adapter = Arc::new(CountingAdapter::new(Vec::new()));
        let service = SearchService::new(adapter.clone());

        service.query("ganesh").await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(adapter.recent_searches().is_empty());
    }

    #[tokio::test]
    async fn test_set_adapter_swaps_implementation() {
        let first = Arc::new(CountingAdapter::new(Vec::new()));
        let second = Arc::new(CountingAdapter::new(vec![result("b1", Category::Books)]));
        let service = SearchService::new(first.clone());

        service.set_adapter(second.clone());
        let out = service.query("ganesh").await;

        assert_eq!(out.total, 1);
        assert_eq!(first.search_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_debouncer_only_runs_last_call() {
        let counter = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(20));

        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            debouncer.call(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_debouncer_cancel_drops_pending_call() {
        let counter = Arc::new(AtomicUsize::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(20));

        {
            let counter = Arc::clone(&counter);
            debouncer.call(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
