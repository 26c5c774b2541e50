use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AdoptionRequest, AdoptionStatus, Animal, AnimalFilter, NewAdoptionRequest, NewAnimal,
    NewNotification, NewReport, NewReportUpdate, NewShelter, NewUser, Notification,
    NotificationKind, Report, ReportUpdate, Requester, Shelter,
};

/// Errors raised by a persistence backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl From<crate::models::UnknownVariant> for StoreError {
    fn from(value: crate::models::UnknownVariant) -> Self {
        StoreError::InvalidData(value.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for shelters, animals, reports and notifications
///
/// The core only ever creates notifications and reads everything else;
/// the remaining write methods exist for the request layer.
#[async_trait]
pub trait RescueStore: Send + Sync {
    /// Shelters with both latitude and longitude set
    async fn located_shelters(&self) -> StoreResult<Vec<Shelter>>;

    async fn get_shelter(&self, shelter_id: Uuid) -> StoreResult<Shelter>;

    async fn create_shelter(&self, shelter: NewShelter) -> StoreResult<Shelter>;

    /// Fails with `Conflict` when the username is taken
    async fn create_user(&self, user: NewUser) -> StoreResult<Requester>;

    /// Fails with `NotFound` when the named shelter does not exist
    async fn create_animal(&self, animal: NewAnimal) -> StoreResult<Animal>;

    async fn get_animal(&self, animal_id: Uuid) -> StoreResult<Animal>;

    /// Animals matching the filter, ordered by name
    async fn list_animals(&self, filter: &AnimalFilter) -> StoreResult<Vec<Animal>>;

    async fn get_report(&self, report_id: Uuid) -> StoreResult<Report>;

    async fn create_report(&self, report: NewReport) -> StoreResult<Report>;

    /// Fails with `NotFound` for unknown animals or users and `Conflict` when
    /// the user already asked for this animal
    async fn create_adoption_request(
        &self,
        request: NewAdoptionRequest,
    ) -> StoreResult<AdoptionRequest>;

    async fn get_adoption_request(&self, request_id: Uuid) -> StoreResult<AdoptionRequest>;

    /// Set the request status; approving also marks the animal `pending`
    async fn decide_adoption_request(
        &self,
        request_id: Uuid,
        status: AdoptionStatus,
    ) -> StoreResult<AdoptionRequest>;

    async fn create_report_update(&self, update: NewReportUpdate) -> StoreResult<ReportUpdate>;

    /// Updates posted on a report, newest first
    async fn report_updates(&self, report_id: Uuid) -> StoreResult<Vec<ReportUpdate>>;

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification>;

    /// Notifications of `kind` referencing a report, oldest first
    async fn notifications_for_report(
        &self,
        report_id: Uuid,
        kind: NotificationKind,
    ) -> StoreResult<Vec<Notification>>;

    /// Inbox of a shelter, newest first
    async fn notifications_for_shelter(&self, shelter_id: Uuid) -> StoreResult<Vec<Notification>>;

    async fn unread_count(&self, shelter_id: Uuid) -> StoreResult<u64>;

    /// Acknowledge one notification; `false` if it does not belong to the shelter
    async fn mark_read(&self, shelter_id: Uuid, notification_id: Uuid) -> StoreResult<bool>;

    async fn mark_all_read(&self, shelter_id: Uuid) -> StoreResult<u64>;

    async fn health_check(&self) -> StoreResult<bool>;
}
