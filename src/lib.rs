//! Animal Rescue - shelter proximity notifications and report intake
//!
//! Shelters are notified about stray/lost/found reports near them, about
//! adoption requests for their animals, and about updates on reports they
//! were told about. Report photos get a heuristic animal-type guess.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance::{distance, haversine_distance},
    AnimalClassifier, Classification, NotificationDispatcher, ShelterLocator,
};
pub use models::{AdoptionRequest, Coordinate, Notification, Report, ReportUpdate, Shelter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        assert_eq!(distance(Some(1.0), None, Some(1.0), Some(1.0)), None);
        assert!(haversine_distance(1.0, 1.0, 1.0, 1.0) < 1e-9);
    }
}
