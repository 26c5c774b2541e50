use actix_web::{web, HttpResponse, Responder};
use base64::Engine;
use uuid::Uuid;
use validator::Validate;

use crate::core::Classification;
use crate::models::{
    AnimalType, CreateReportRequest, CreateReportResponse, CreateReportUpdateRequest, NewReport,
    NewReportUpdate, ReportDetailResponse, ReportUpdateResponse,
};
use crate::routes::{bad_request, store_failure, validation_failed, AppState};
use crate::services::locate_or_unset;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/reports", web::post().to(create_report))
        .route("/reports/{report_id}", web::get().to(get_report))
        .route("/reports/{report_id}/updates", web::post().to(create_report_update));
}

/// Decode a base64 photo, accepting an optional `data:` URL prefix
fn decode_photo(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match encoded.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    base64::engine::general_purpose::STANDARD.decode(payload.trim())
}

/// Submit a stray/lost/found report
///
/// POST /api/v1/reports
///
/// Request body:
/// ```json
/// {
///   "kind": "stray|lost|found",
///   "animalType": "dog|cat|bird|rabbit|other",
///   "description": "string",
///   "location": "string",
///   "city": "string",
///   "state": "string",
///   "zipCode": "string",
///   "photoBase64": "string"
/// }
/// ```
async fn create_report(
    state: web::Data<AppState>,
    req: web::Json<CreateReportRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_report request: {:?}", errors);
        return validation_failed(errors);
    }

    let req = req.into_inner();

    let classification = match req.photo_base64.as_deref() {
        Some(encoded) => {
            let bytes = match decode_photo(encoded) {
                Ok(bytes) => bytes,
                Err(e) => {
                    return bad_request(
                        "Invalid photo",
                        format!("photoBase64 is not valid base64: {}", e),
                    )
                }
            };
            let classifier = state.classifier;
            let result = web::block(move || classifier.classify_bytes(&bytes))
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Photo classification did not complete: {}", e);
                    Classification::unknown()
                });
            Some(result)
        }
        None => None,
    };

    let label = classification.and_then(|c| c.label);
    let animal_type = req.animal_type.or(label).unwrap_or(AnimalType::Other);

    let mut report = NewReport {
        kind: req.kind,
        animal_type,
        description: req.description,
        location: req.location,
        city: req.city,
        state: req.state,
        zip_code: req.zip_code,
        coordinate: Default::default(),
        reported_by: req.reported_by,
        ai_identified_type: label,
        ai_confidence: label.and(classification.map(|c| c.confidence)),
    };
    report.coordinate = locate_or_unset(state.geocoder.as_ref(), &report.address_line()).await;

    let report = match state.store.create_report(report).await {
        Ok(report) => report,
        Err(e) => return store_failure("Failed to save report", e),
    };

    let notified = match state.dispatcher.notify_nearby_about_report(&report).await {
        Ok(created) => created.len(),
        Err(e) => return store_failure("Failed to notify shelters", e),
    };

    tracing::info!(
        "Created {} report {} ({} shelters notified)",
        report.kind,
        report.id,
        notified
    );

    HttpResponse::Created().json(CreateReportResponse {
        report,
        notified_shelters: notified,
        classification,
    })
}

/// A report with its updates, newest first
///
/// GET /api/v1/reports/{report_id}
async fn get_report(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let report_id = path.into_inner();

    let report = match state.store.get_report(report_id).await {
        Ok(report) => report,
        Err(e) => return store_failure("Failed to load report", e),
    };

    match state.store.report_updates(report_id).await {
        Ok(updates) => HttpResponse::Ok().json(ReportDetailResponse { report, updates }),
        Err(e) => store_failure("Failed to load report updates", e),
    }
}

/// Post an update on a report and forward it to the shelters told about it
///
/// POST /api/v1/reports/{report_id}/updates
async fn create_report_update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CreateReportUpdateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let report_id = path.into_inner();
    if let Err(e) = state.store.get_report(report_id).await {
        return store_failure("Failed to load report", e);
    }

    let req = req.into_inner();
    let update = match state
        .store
        .create_report_update(NewReportUpdate {
            report_id: Some(report_id),
            animal_id: None,
            title: req.title,
            content: req.content,
        })
        .await
    {
        Ok(update) => update,
        Err(e) => return store_failure("Failed to save report update", e),
    };

    match state.dispatcher.notify_shelter_about_report_update(&update).await {
        Ok(created) => HttpResponse::Created().json(ReportUpdateResponse {
            update,
            notified_shelters: created.len(),
        }),
        Err(e) => store_failure("Failed to notify shelters", e),
    }
}
