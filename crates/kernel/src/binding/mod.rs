//! Client query binding.
//!
//! Wraps a [`VenueLister`] behind a keyed cache for presentation code:
//! - QueryKey: (page, page size, search, location) identity of a result
//! - Debouncer: search input only takes effect after a quiet period
//! - Geolocation: "near me" degrades to default ordering without a position
//! - VenueQueryBinding: serves cached pages and keeps the last page on
//!   screen as placeholder data while a new key is fetched

mod debounce;
mod geolocation;
mod key;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use geolocation::{FilterMode, GeoNotice, GeolocationState, proximity_anchor};
pub use key::QueryKey;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::discovery::{VenueLister, VenuePage};
use crate::metrics::Metrics;

/// Settings for a [`VenueQueryBinding`].
#[derive(Debug, Clone)]
pub struct BindingConfig {
    pub page_size: u32,
    pub debounce: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            debounce: DEFAULT_DEBOUNCE,
            cache_ttl: Duration::from_secs(60),
            cache_capacity: 1_000,
        }
    }
}

/// What presentation code should render.
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    /// The key the snapshot was produced for.
    pub key: QueryKey,

    /// Page to display. For a placeholder this is the previous page.
    pub data: Option<Arc<VenuePage>>,

    /// `data` belongs to an earlier key.
    pub is_placeholder: bool,

    /// Set when near-me was requested but could not be applied.
    pub notice: Option<GeoNotice>,

    /// Fetch failure message; the caller may retry with `refresh`.
    pub error: Option<String>,
}

struct BindingState {
    page: u32,
    page_size: u32,
    search: Option<String>,
    pending_search: Debouncer<String>,
    mode: FilterMode,
    geolocation: GeolocationState,
    shown: Option<(QueryKey, Arc<VenuePage>)>,
}

impl BindingState {
    /// Apply a debounced search input whose quiet period has elapsed.
    fn settle(&mut self, now: Instant) {
        let Some(input) = self.pending_search.poll(now) else {
            return;
        };
        let trimmed = input.trim();
        let search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        if search != self.search {
            debug!(search = ?search, "search term changed, resetting to page 1");
            self.search = search;
            self.page = 1;
        }
    }

    fn key(&self) -> (QueryKey, Option<GeoNotice>) {
        let (anchor, notice) = proximity_anchor(self.mode, self.geolocation);
        let key = QueryKey::new(self.page, self.page_size, self.search.as_deref(), anchor);
        (key, notice)
    }
}

/// Keyed, cached access to venue pages.
pub struct VenueQueryBinding<L: ?Sized> {
    lister: Arc<L>,
    cache: Cache<QueryKey, Arc<VenuePage>>,
    state: Mutex<BindingState>,
    metrics: Arc<Metrics>,
}

impl<L: VenueLister + ?Sized> VenueQueryBinding<L> {
    pub fn new(lister: Arc<L>, config: BindingConfig, metrics: Arc<Metrics>) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            lister,
            cache,
            state: Mutex::new(BindingState {
                page: 1,
                page_size: config.page_size.max(1),
                search: None,
                pending_search: Debouncer::new(config.debounce),
                mode: FilterMode::All,
                geolocation: GeolocationState::NotRequested,
                shown: None,
            }),
            metrics,
        }
    }

    /// Record raw search input. It affects the key once the debounce
    /// delay has passed without further input.
    pub fn set_search_input(&self, input: &str) {
        self.state
            .lock()
            .pending_search
            .push(input.to_string(), Instant::now());
    }

    /// When pending search input will take effect, if any.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.state.lock().pending_search.deadline()
    }

    pub fn set_page(&self, page: u32) {
        self.state.lock().page = page.max(1);
    }

    pub fn set_filter_mode(&self, mode: FilterMode) {
        self.state.lock().mode = mode;
    }

    pub fn set_geolocation(&self, geolocation: GeolocationState) {
        self.state.lock().geolocation = geolocation;
    }

    /// The key the next `refresh` will fetch.
    pub fn current_key(&self) -> QueryKey {
        let mut state = self.state.lock();
        state.settle(Instant::now());
        state.key().0
    }

    /// What to render right now, without fetching.
    pub fn snapshot(&self) -> QuerySnapshot {
        let mut state = self.state.lock();
        state.settle(Instant::now());
        let (key, notice) = state.key();
        let (data, is_placeholder) = match &state.shown {
            Some((shown_key, page)) => (Some(page.clone()), *shown_key != key),
            None => (None, false),
        };
        QuerySnapshot {
            key,
            data,
            is_placeholder,
            notice,
            error: None,
        }
    }

    /// Serve the current key from cache or fetch it.
    ///
    /// A fetched page is cached under the key it was requested with and
    /// only becomes the shown page if that key is still current when the
    /// response arrives.
    pub async fn refresh(&self) -> QuerySnapshot {
        let (key, notice, placeholder) = {
            let mut state = self.state.lock();
            state.settle(Instant::now());
            let (key, notice) = state.key();
            let placeholder = state.shown.as_ref().map(|(_, page)| page.clone());
            (key, notice, placeholder)
        };

        if let Some(notice) = notice {
            debug!(notice = notice.message(), "near-me requested without a position");
        }

        if let Some(page) = self.cache.get(&key).await {
            self.metrics.record_cache_hit();
            self.show(&key, page.clone());
            return QuerySnapshot {
                key,
                data: Some(page),
                is_placeholder: false,
                notice,
                error: None,
            };
        }
        self.metrics.record_cache_miss();

        match self.lister.list_venues(&key.to_request()).await {
            Ok(page) => {
                let page = Arc::new(page);
                self.cache.insert(key.clone(), page.clone()).await;

                if self.show(&key, page.clone()) {
                    QuerySnapshot {
                        key,
                        data: Some(page),
                        is_placeholder: false,
                        notice,
                        error: None,
                    }
                } else {
                    debug!(page = key.page(), "response for superseded key cached but not shown");
                    QuerySnapshot {
                        key,
                        is_placeholder: placeholder.is_some(),
                        data: placeholder,
                        notice,
                        error: None,
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, page = key.page(), "venue listing fetch failed");
                QuerySnapshot {
                    key,
                    is_placeholder: placeholder.is_some(),
                    data: placeholder,
                    notice,
                    error: Some(format!("Failed to load venues: {e}. Please try again.")),
                }
            }
        }
    }

    /// Make `page` the shown page if `key` is still current.
    fn show(&self, key: &QueryKey, page: Arc<VenuePage>) -> bool {
        let mut state = self.state.lock();
        state.settle(Instant::now());
        if state.key().0 != *key {
            return false;
        }
        state.shown = Some((key.clone(), page));
        true
    }
}
