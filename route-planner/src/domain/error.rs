//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from search and IO errors.

use super::StopId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Invalid leg construction (e.g., a ride with a single stop)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Consecutive legs don't meet at the same place
    #[error("legs are not contiguous: {0} does not connect to {1}")]
    LegsNotContiguous(StopId, StopId),

    /// A requested endpoint is not at the place the legs start or end
    #[error("endpoint {0} is not at the same place as {1}")]
    EndpointMismatch(StopId, StopId),

    /// Journey has no legs
    #[error("journey must have at least one leg")]
    EmptyJourney,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidLeg("transit leg needs two stops");
        assert_eq!(err.to_string(), "invalid leg: transit leg needs two stops");

        let a = StopId::parse("METRO_SEV_L1_E10").unwrap();
        let b = StopId::parse("RENFE_43003").unwrap();
        let err = DomainError::LegsNotContiguous(a, b);
        assert_eq!(
            err.to_string(),
            "legs are not contiguous: METRO_SEV_L1_E10 does not connect to RENFE_43003"
        );

        let err = DomainError::EmptyJourney;
        assert_eq!(err.to_string(), "journey must have at least one leg");
    }
}
