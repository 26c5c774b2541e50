// Route exports
pub mod adoptions;
pub mod animals;
pub mod health;
pub mod images;
pub mod reports;
pub mod shelters;
pub mod users;

use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::ValidationErrors;

use crate::core::{AnimalClassifier, NotificationDispatcher, ShelterLocator};
use crate::models::ErrorResponse;
use crate::services::{Geocoder, RescueStore, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RescueStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub classifier: AnimalClassifier,
    pub locator: ShelterLocator,
    pub dispatcher: NotificationDispatcher,
}

impl AppState {
    /// Wire the locator and dispatcher to the same store
    pub fn new(
        store: Arc<dyn RescueStore>,
        geocoder: Arc<dyn Geocoder>,
        classifier: AnimalClassifier,
        radius_km: f64,
        excerpt_chars: usize,
    ) -> Self {
        let locator = ShelterLocator::new(store.clone(), radius_km);
        let dispatcher =
            NotificationDispatcher::new(store.clone(), locator.clone(), excerpt_chars);

        Self {
            store,
            geocoder,
            classifier,
            locator,
            dispatcher,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(reports::configure)
            .configure(shelters::configure)
            .configure(users::configure)
            .configure(animals::configure)
            .configure(adoptions::configure)
            .configure(images::configure),
    );
}

pub(crate) fn validation_failed(errors: ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

pub(crate) fn bad_request(error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: 400,
    })
}

/// Map a store failure onto the HTTP error shape
pub(crate) fn store_failure(context: &str, err: StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(message) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".to_string(),
            message,
            status_code: 404,
        }),
        StoreError::Conflict(message) => HttpResponse::Conflict().json(ErrorResponse {
            error: "Conflict".to_string(),
            message,
            status_code: 409,
        }),
        other => {
            tracing::error!("{}: {}", context, other);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: context.to_string(),
                message: other.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_store_failure_status_codes() {
        let not_found = store_failure("Failed", StoreError::NotFound("shelter x".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = store_failure("Failed", StoreError::Conflict("dup".into()));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let invalid = store_failure("Failed", StoreError::InvalidData("bad kind".into()));
        assert_eq!(invalid.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
