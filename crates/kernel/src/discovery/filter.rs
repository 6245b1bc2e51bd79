//! Filter builder for venue listings.
//!
//! Turns raw listing parameters into a typed predicate the turf gateway
//! executes. The predicate is a closed enum so every gateway handles every
//! shape explicitly.

use super::types::{GeoPoint, Venue, VenueStatus};

/// A non-empty, trimmed search term.
///
/// Matching is a literal case-insensitive substring test, not tokenized
/// full-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Returns `None` for absent, empty or whitespace-only input.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring test.
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0.to_lowercase())
    }
}

/// Which venues a predicate may return before any text match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueScope {
    pub status: VenueStatus,

    /// Blocked venues are only visible to moderation listings.
    pub include_blocked: bool,
}

impl VenueScope {
    /// Approved, unblocked venues.
    pub fn public() -> Self {
        Self {
            status: VenueStatus::Approved,
            include_blocked: false,
        }
    }

    /// Every venue with `status`, blocked or not.
    pub fn moderation(status: VenueStatus) -> Self {
        Self {
            status,
            include_blocked: true,
        }
    }

    pub fn admits(&self, venue: &Venue) -> bool {
        venue.status == self.status && (self.include_blocked || !venue.is_blocked)
    }
}

/// Predicate handed to the turf gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum VenuePredicate {
    /// Scope constraint only.
    StatusOnly { scope: VenueScope },

    /// Scope plus name-or-city substring match.
    Text {
        scope: VenueScope,
        term: SearchTerm,
    },

    /// Scope, optional text match, ordered by distance from `anchor`.
    Near {
        scope: VenueScope,
        term: Option<SearchTerm>,
        anchor: GeoPoint,
    },
}

impl VenuePredicate {
    pub fn scope(&self) -> VenueScope {
        match self {
            VenuePredicate::StatusOnly { scope }
            | VenuePredicate::Text { scope, .. }
            | VenuePredicate::Near { scope, .. } => *scope,
        }
    }

    pub fn status(&self) -> VenueStatus {
        self.scope().status
    }

    pub fn term(&self) -> Option<&SearchTerm> {
        match self {
            VenuePredicate::StatusOnly { .. } => None,
            VenuePredicate::Text { term, .. } => Some(term),
            VenuePredicate::Near { term, .. } => term.as_ref(),
        }
    }

    /// Proximity anchor, present only for `Near`.
    pub fn anchor(&self) -> Option<GeoPoint> {
        match self {
            VenuePredicate::Near { anchor, .. } => Some(*anchor),
            _ => None,
        }
    }

    /// Evaluate the predicate against a venue in memory.
    ///
    /// The anchor only affects ordering, never membership.
    pub fn matches(&self, venue: &Venue) -> bool {
        if !self.scope().admits(venue) {
            return false;
        }
        match self.term() {
            None => true,
            Some(term) => term.matches(&venue.name) || term.matches(&venue.location.city),
        }
    }
}

/// Builds [`VenuePredicate`]s from raw listing parameters.
pub struct FilterBuilder;

impl FilterBuilder {
    /// Predicate for the public listing: approved, unblocked venues only.
    pub fn public(search: Option<&str>, anchor: Option<GeoPoint>) -> VenuePredicate {
        Self::scoped(VenueScope::public(), search, anchor)
    }

    /// Predicate for an explicit moderation status. Blocked venues are kept.
    pub fn with_status(
        status: VenueStatus,
        search: Option<&str>,
        anchor: Option<GeoPoint>,
    ) -> VenuePredicate {
        Self::scoped(VenueScope::moderation(status), search, anchor)
    }

    fn scoped(
        scope: VenueScope,
        search: Option<&str>,
        anchor: Option<GeoPoint>,
    ) -> VenuePredicate {
        let term = SearchTerm::parse(search);
        match (term, anchor) {
            (term, Some(anchor)) => VenuePredicate::Near {
                scope,
                term,
                anchor,
            },
            (Some(term), None) => VenuePredicate::Text { scope, term },
            (None, None) => VenuePredicate::StatusOnly { scope },
        }
    }
}
