use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{NewUser, RegisterUserRequest};
use crate::routes::{store_failure, validation_failed, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::post().to(register_user));
}

/// Register a user who can submit reports and adoption requests
///
/// POST /api/v1/users
///
/// Request body:
/// ```json
/// {
///   "username": "string",
///   "firstName": "string",
///   "lastName": "string"
/// }
/// ```
async fn register_user(
    state: web::Data<AppState>,
    req: web::Json<RegisterUserRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let req = req.into_inner();
    match state
        .store
        .create_user(NewUser {
            username: req.username.trim().to_string(),
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await
    {
        Ok(user) => {
            tracing::info!("Registered user {} ({})", user.username, user.id);
            HttpResponse::Created().json(user)
        }
        Err(e) => store_failure("Failed to register user", e),
    }
}
