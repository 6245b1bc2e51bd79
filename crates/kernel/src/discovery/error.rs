//! Discovery pipeline errors.

use std::time::Duration;

use thiserror::Error;

/// Failure reported by a turf or review gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    #[error("gateway timed out after {0:?}")]
    Timeout(Duration),

    #[error("gateway backend error: {0}")]
    Backend(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// Failure of a discovery listing.
///
/// Invalid pagination input is never an error; it is normalized.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The turf query failed; no page could be built.
    #[error("venue query failed")]
    Query(#[source] GatewayError),

    /// A review lookup failed under the fail-page policy.
    #[error("review enrichment failed for venue {turf_id}")]
    Enrichment {
        turf_id: String,
        #[source]
        source: GatewayError,
    },
}

impl DiscoveryError {
    /// The gateway error underneath this failure.
    pub fn gateway_error(&self) -> &GatewayError {
        match self {
            DiscoveryError::Query(source) | DiscoveryError::Enrichment { source, .. } => source,
        }
    }

    /// Whether the failure came from a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.gateway_error(), GatewayError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_detected_through_both_variants() {
        let query = DiscoveryError::Query(GatewayError::Timeout(Duration::from_secs(1)));
        assert!(query.is_timeout());

        let enrichment = DiscoveryError::Enrichment {
            turf_id: "t1".to_string(),
            source: GatewayError::Backend("boom".to_string()),
        };
        assert!(!enrichment.is_timeout());
        assert_eq!(
            enrichment.to_string(),
            "review enrichment failed for venue t1"
        );
    }
}
