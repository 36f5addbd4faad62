use thiserror::Error;

/// Domain failures of the footprint pipeline
///
/// These are raised inside `anyhow::Error` chains; callers that need to
/// react to a specific case can recover it with `downcast_ref`.
#[derive(Debug, Error, PartialEq)]
pub enum FootprintError {
    /// The GeoJSON document holds no feature at all
    #[error("GeoJSON contains no features")]
    NoFeatures,

    /// The first feature carries a null geometry
    #[error("feature has no geometry")]
    MissingGeometry,

    /// The geometry has no coordinates, so no bounding box can be derived
    #[error("geometry is empty")]
    EmptyGeometry,

    #[error("invalid bounding box ({min_x}, {min_y}, {max_x}, {max_y})")]
    InvalidBoundingBox {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    /// The feature provider answered with a non-success HTTP status
    #[error("feature provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// Mean area is undefined for a collection without features
    #[error("cannot compute a mean over an empty collection")]
    EmptyCollection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_downcast_through_anyhow() {
        let err = anyhow::Error::new(FootprintError::NoFeatures).context("Failed to read boundary");
        assert_eq!(
            err.downcast_ref::<FootprintError>(),
            Some(&FootprintError::NoFeatures)
        );
    }

    #[test]
    fn test_provider_error_message() {
        let err = FootprintError::Provider {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "feature provider returned 429: rate limited");
    }
}
