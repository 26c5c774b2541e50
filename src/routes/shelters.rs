use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    MarkReadResponse, NearbyShelter, NearbySheltersQuery, NearbySheltersResponse, NewShelter,
    NotificationsResponse, RegisterShelterRequest, UnreadCountResponse,
};
use crate::routes::{store_failure, validation_failed, AppState};
use crate::services::{locate_or_unset, StoreError};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/shelters", web::post().to(register_shelter))
        .route("/shelters/nearby", web::get().to(nearby_shelters))
        .route("/shelters/{shelter_id}/notifications", web::get().to(list_notifications))
        .route(
            "/shelters/{shelter_id}/notifications/unread-count",
            web::get().to(unread_count),
        )
        .route(
            "/shelters/{shelter_id}/notifications/read-all",
            web::post().to(mark_all_read),
        )
        .route(
            "/shelters/{shelter_id}/notifications/{notification_id}/read",
            web::post().to(mark_read),
        );
}

/// Register a shelter, geocoding its address
///
/// POST /api/v1/shelters
async fn register_shelter(
    state: web::Data<AppState>,
    req: web::Json<RegisterShelterRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();
    let mut shelter = NewShelter {
        name: req.name,
        address: req.address,
        city: req.city,
        state: req.state,
        zip_code: req.zip_code,
        phone: req.phone,
        email: req.email,
        website: req.website,
        coordinate: Default::default(),
    };
    shelter.coordinate = locate_or_unset(state.geocoder.as_ref(), &shelter.address_line()).await;

    match state.store.create_shelter(shelter).await {
        Ok(shelter) => {
            tracing::info!(
                "Registered shelter {} (located: {})",
                shelter.id,
                shelter.coordinate.is_set()
            );
            HttpResponse::Created().json(shelter)
        }
        Err(e) => store_failure("Failed to register shelter", e),
    }
}

/// Shelters around a point, nearest first
///
/// GET /api/v1/shelters/nearby?lat={lat}&lon={lon}&radiusKm={km}
async fn nearby_shelters(
    state: web::Data<AppState>,
    query: web::Query<NearbySheltersQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    let radius_km = query.radius_km.unwrap_or(state.locator.default_radius_km());

    match state
        .locator
        .nearby_with_distance(query.lat, query.lon, Some(radius_km))
        .await
    {
        Ok(ranked) => HttpResponse::Ok().json(NearbySheltersResponse {
            shelters: ranked
                .into_iter()
                .map(|(shelter, distance_km)| NearbyShelter { shelter, distance_km })
                .collect(),
            radius_km,
        }),
        Err(e) => store_failure("Failed to find nearby shelters", e),
    }
}

/// GET /api/v1/shelters/{shelter_id}/notifications
async fn list_notifications(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let shelter_id = path.into_inner();

    if let Err(e) = state.store.get_shelter(shelter_id).await {
        return store_failure("Failed to load shelter", e);
    }

    let notifications = match state.store.notifications_for_shelter(shelter_id).await {
        Ok(notifications) => notifications,
        Err(e) => return store_failure("Failed to load notifications", e),
    };
    let unread_count = notifications.iter().filter(|n| !n.is_read).count() as u64;

    HttpResponse::Ok().json(NotificationsResponse {
        notifications,
        unread_count,
    })
}

/// GET /api/v1/shelters/{shelter_id}/notifications/unread-count
async fn unread_count(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let shelter_id = path.into_inner();

    if let Err(e) = state.store.get_shelter(shelter_id).await {
        return store_failure("Failed to load shelter", e);
    }

    match state.store.unread_count(shelter_id).await {
        Ok(unread_count) => HttpResponse::Ok().json(UnreadCountResponse { unread_count }),
        Err(e) => store_failure("Failed to count notifications", e),
    }
}

/// Acknowledge one notification; only the owning shelter may do so
///
/// POST /api/v1/shelters/{shelter_id}/notifications/{notification_id}/read
async fn mark_read(state: web::Data<AppState>, path: web::Path<(Uuid, Uuid)>) -> impl Responder {
    let (shelter_id, notification_id) = path.into_inner();

    match state.store.mark_read(shelter_id, notification_id).await {
        Ok(true) => HttpResponse::Ok().json(MarkReadResponse { updated: 1 }),
        Ok(false) => store_failure(
            "Failed to mark notification read",
            StoreError::NotFound(format!(
                "notification {} for shelter {}",
                notification_id, shelter_id
            )),
        ),
        Err(e) => store_failure("Failed to mark notification read", e),
    }
}

/// POST /api/v1/shelters/{shelter_id}/notifications/read-all
async fn mark_all_read(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let shelter_id = path.into_inner();

    if let Err(e) = state.store.get_shelter(shelter_id).await {
        return store_failure("Failed to load shelter", e);
    }

    match state.store.mark_all_read(shelter_id).await {
        Ok(updated) => {
            tracing::debug!("Marked {} notifications read for shelter {}", updated, shelter_id);
            HttpResponse::Ok().json(MarkReadResponse { updated })
        }
        Err(e) => store_failure("Failed to mark notifications read", e),
    }
}
