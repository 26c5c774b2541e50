use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    AnimalFilter, AnimalListQuery, AnimalsResponse, CreateAnimalRequest,
    CreateReportUpdateRequest, NewAnimal, NewReportUpdate, ReportUpdateResponse,
};
use crate::routes::{store_failure, validation_failed, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/animals", web::post().to(create_animal))
        .route("/animals", web::get().to(list_animals))
        .route("/animals/{animal_id}", web::get().to(get_animal))
        .route("/animals/{animal_id}/updates", web::post().to(create_animal_update));
}

/// List an animal for adoption
///
/// POST /api/v1/animals
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "animalType": "dog|cat|bird|rabbit|other",
///   "shelterId": "uuid"
/// }
/// ```
async fn create_animal(
    state: web::Data<AppState>,
    req: web::Json<CreateAnimalRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();
    match state
        .store
        .create_animal(NewAnimal {
            name: req.name,
            animal_type: req.animal_type,
            shelter_id: req.shelter_id,
        })
        .await
    {
        Ok(animal) => HttpResponse::Created().json(animal),
        Err(e) => store_failure("Failed to create animal", e),
    }
}

/// Animals still available for adoption, by name
///
/// GET /api/v1/animals?type=dog&search=rex
async fn list_animals(
    state: web::Data<AppState>,
    query: web::Query<AnimalListQuery>,
) -> impl Responder {
    let query = query.into_inner();
    let filter = AnimalFilter {
        animal_type: query.animal_type,
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };

    match state.store.list_animals(&filter).await {
        Ok(animals) => HttpResponse::Ok().json(AnimalsResponse { animals }),
        Err(e) => store_failure("Failed to list animals", e),
    }
}

/// GET /api/v1/animals/{animal_id}
async fn get_animal(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.store.get_animal(path.into_inner()).await {
        Ok(animal) => HttpResponse::Ok().json(animal),
        Err(e) => store_failure("Failed to load animal", e),
    }
}

/// Record an update about an animal
///
/// POST /api/v1/animals/{animal_id}/updates
///
/// Animal updates are not tied to a report, so no shelter is notified.
async fn create_animal_update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CreateReportUpdateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let animal_id = path.into_inner();
    if let Err(e) = state.store.get_animal(animal_id).await {
        return store_failure("Failed to load animal", e);
    }

    let req = req.into_inner();
    match state
        .store
        .create_report_update(NewReportUpdate {
            report_id: None,
            animal_id: Some(animal_id),
            title: req.title,
            content: req.content,
        })
        .await
    {
        Ok(update) => HttpResponse::Created().json(ReportUpdateResponse {
            update,
            notified_shelters: 0,
        }),
        Err(e) => store_failure("Failed to save animal update", e),
    }
}
