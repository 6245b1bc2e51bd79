//! Cache key for venue listings.

use std::hash::{Hash, Hasher};

use crate::discovery::{GeoPoint, ListVenuesRequest};

/// Ordered `(page, page_size, search, location)` tuple identifying one
/// listing result.
///
/// Coordinates are compared and hashed by bit pattern so the key can live
/// in a hash-based cache.
#[derive(Debug, Clone)]
pub struct QueryKey {
    page: u32,
    page_size: u32,
    search: Option<String>,
    location: Option<GeoPoint>,
}

impl QueryKey {
    /// Build a key. Page and size are clamped to at least 1 and the search
    /// term is trimmed, with blank terms treated as absent.
    pub fn new(page: u32, page_size: u32, search: Option<&str>, location: Option<GeoPoint>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            search,
            location,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    /// The pipeline request this key stands for.
    pub fn to_request(&self) -> ListVenuesRequest {
        ListVenuesRequest {
            page: Some(i64::from(self.page)),
            page_size: Some(i64::from(self.page_size)),
            search: self.search.clone(),
            location: self.location,
        }
    }

    fn location_bits(&self) -> Option<(u64, u64)> {
        self.location.map(|p| (p.lng.to_bits(), p.lat.to_bits()))
    }
}

impl PartialEq for QueryKey {
    fn eq(&self, other: &Self) -> bool {
        self.page == other.page
            && self.page_size == other.page_size
            && self.search == other.search
            && self.location_bits() == other.location_bits()
    }
}

impl Eq for QueryKey {}

impl Hash for QueryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.page.hash(state);
        self.page_size.hash(state);
        self.search.hash(state);
        self.location_bits().hash(state);
    }
}
