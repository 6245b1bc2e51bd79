//! "Near me" filter mode and its geolocation prerequisite.

use serde::Serialize;

use crate::discovery::GeoPoint;

/// Outcome of asking the device for its position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GeolocationState {
    #[default]
    NotRequested,
    Resolved(GeoPoint),
    /// Position could not be determined (no fix, unsupported, timed out).
    Unavailable,
    /// The user refused the permission prompt.
    Denied,
}

/// Listing filter mode selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    NearMe,
}

/// Why a near-me listing fell back to default ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoNotice {
    /// Near-me was selected before a position was requested.
    Locating,
    Unavailable,
    Denied,
}

impl GeoNotice {
    pub fn message(&self) -> &'static str {
        match self {
            GeoNotice::Locating => "Waiting for your location",
            GeoNotice::Unavailable => "Unable to get your location; showing all venues",
            GeoNotice::Denied => "Location permission denied; showing all venues",
        }
    }
}

/// Resolve the proximity anchor for a filter mode.
///
/// Near-me applies only with a resolved position. Otherwise no anchor is
/// used and a notice says why; the listing itself is never blocked.
pub fn proximity_anchor(
    mode: FilterMode,
    state: GeolocationState,
) -> (Option<GeoPoint>, Option<GeoNotice>) {
    match (mode, state) {
        (FilterMode::All, _) => (None, None),
        (FilterMode::NearMe, GeolocationState::Resolved(point)) => (Some(point), None),
        (FilterMode::NearMe, GeolocationState::NotRequested) => (None, Some(GeoNotice::Locating)),
        (FilterMode::NearMe, GeolocationState::Unavailable) => {
            (None, Some(GeoNotice::Unavailable))
        }
        (FilterMode::NearMe, GeolocationState::Denied) => (None, Some(GeoNotice::Denied)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn all_mode_ignores_position() {
        let here = GeoPoint::new(10.75, 59.91).unwrap();
        assert_eq!(
            proximity_anchor(FilterMode::All, GeolocationState::Resolved(here)),
            (None, None)
        );
    }

    #[test]
    fn near_me_uses_resolved_position() {
        let here = GeoPoint::new(10.75, 59.91).unwrap();
        assert_eq!(
            proximity_anchor(FilterMode::NearMe, GeolocationState::Resolved(here)),
            (Some(here), None)
        );
    }

    #[test]
    fn near_me_degrades_without_position() {
        assert_eq!(
            proximity_anchor(FilterMode::NearMe, GeolocationState::Denied),
            (None, Some(GeoNotice::Denied))
        );
        assert_eq!(
            proximity_anchor(FilterMode::NearMe, GeolocationState::Unavailable),
            (None, Some(GeoNotice::Unavailable))
        );
        assert_eq!(
            proximity_anchor(FilterMode::NearMe, GeolocationState::NotRequested),
            (None, Some(GeoNotice::Locating))
        );
    }
}
