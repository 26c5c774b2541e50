use actix_web::{web, HttpResponse, Responder};

use crate::core::{Classification, ImageFeatures};
use crate::models::ClassifyImageResponse;
use crate::routes::{bad_request, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/images/classify", web::post().to(classify_image));
}

/// Guess the animal in a raw image body
///
/// POST /api/v1/images/classify
async fn classify_image(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    if body.is_empty() {
        return bad_request("Empty body", "Request body must contain image bytes");
    }

    let classifier = state.classifier;
    let analyzed = web::block(move || classifier.analyze_bytes(&body)).await;

    let (classification, features) = analyzed.unwrap_or_else(|e| {
        tracing::warn!("Image probe did not complete: {}", e);
        (Classification::unknown(), ImageFeatures::default())
    });

    HttpResponse::Ok().json(ClassifyImageResponse {
        classification,
        features,
    })
}
