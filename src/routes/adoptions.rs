use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    AdoptionRequestResponse, CreateAdoptionRequest, ManageAdoptionRequest, NewAdoptionRequest,
};
use crate::routes::{store_failure, validation_failed, AppState};
use crate::services::StoreError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/animals/{animal_id}/adoption-requests",
        web::post().to(create_adoption_request),
    )
    .route(
        "/adoption-requests/{request_id}",
        web::patch().to(manage_adoption_request),
    );
}

/// Ask to adopt an animal and notify the shelter caring for it
///
/// POST /api/v1/animals/{animal_id}/adoption-requests
///
/// Request body:
/// ```json
/// {
///   "requesterId": "uuid",
///   "message": "string"
/// }
/// ```
async fn create_adoption_request(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CreateAdoptionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();
    let request = match state
        .store
        .create_adoption_request(NewAdoptionRequest {
            animal_id: path.into_inner(),
            requester_id: req.requester_id,
            message: req.message,
        })
        .await
    {
        Ok(request) => request,
        Err(e) => return store_failure("Failed to create adoption request", e),
    };

    match state.dispatcher.notify_shelter_about_adoption_request(&request).await {
        Ok(notification) => HttpResponse::Created().json(AdoptionRequestResponse {
            adoption_request: request,
            shelter_notified: notification.is_some(),
        }),
        Err(e) => store_failure("Failed to notify shelter", e),
    }
}

/// Approve or reject an adoption request
///
/// PATCH /api/v1/adoption-requests/{request_id}
///
/// Request body:
/// ```json
/// {
///   "shelterId": "uuid",
///   "action": "approve|reject"
/// }
/// ```
///
/// Only the shelter caring for the animal may decide; anyone else gets 404.
async fn manage_adoption_request(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ManageAdoptionRequest>,
) -> impl Responder {
    let request_id = path.into_inner();
    let req = req.into_inner();

    let request = match state.store.get_adoption_request(request_id).await {
        Ok(request) => request,
        Err(e) => return store_failure("Failed to load adoption request", e),
    };

    if request.animal.shelter_id != Some(req.shelter_id) {
        tracing::info!(
            "Shelter {} tried to decide adoption request {} it does not own",
            req.shelter_id,
            request_id
        );
        return store_failure(
            "Failed to load adoption request",
            StoreError::NotFound(format!("adoption request {}", request_id)),
        );
    }

    match state
        .store
        .decide_adoption_request(request_id, req.action.status())
        .await
    {
        Ok(decided) => HttpResponse::Ok().json(decided),
        Err(e) => store_failure("Failed to update adoption request", e),
    }
}
