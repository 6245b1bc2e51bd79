//! Page window normalization.

use super::types::DiscoveryConfig;

/// A validated page window. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u32,
    size: u32,
}

impl PageWindow {
    /// Normalize untrusted page inputs.
    ///
    /// Missing or non-positive pages become 1. Missing or non-positive sizes
    /// become `config.default_page_size`; sizes above `config.max_page_size`
    /// are capped.
    pub fn normalize(page: Option<i64>, size: Option<i64>, config: &DiscoveryConfig) -> Self {
        let page = match page {
            Some(p) if p > 0 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => 1,
        };

        let default_size = config.default_page_size.max(1);
        let max_size = config.max_page_size.max(default_size);
        let size = match size {
            Some(s) if s > 0 => {
                let requested = u32::try_from(s).unwrap_or(u32::MAX);
                if requested > max_size {
                    tracing::warn!(
                        requested,
                        capped = max_size,
                        "page size exceeds maximum, capping"
                    );
                    max_size
                } else {
                    requested
                }
            }
            _ => default_size,
        };

        Self { page, size }
    }

    /// Build a window from already-valid values, clamping zeros to 1.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Rows to skip: `(page - 1) * size`.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    /// Rows to return.
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    /// `ceil(total / size)`; zero matching rows means zero pages.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.size))
    }
}

/// Leniently parse a page or size query parameter.
///
/// Integers parse as-is, fractional values truncate toward zero, and
/// anything unparseable yields `None` so the caller falls back to defaults.
pub fn parse_page_param(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if !f.is_finite() {
        return None;
    }
    // Saturating float-to-int cast.
    Some(f.trunc() as i64)
}
