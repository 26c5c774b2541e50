use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::domain::{AdoptionStatus, AnimalType, ReportKind};

/// Request to submit a stray/lost/found report
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReportRequest {
    pub kind: ReportKind,
    /// Left empty when the submitter wants the photo heuristics to fill it in
    #[serde(rename = "animalType", default)]
    pub animal_type: Option<AnimalType>,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(max = 10))]
    #[serde(rename = "zipCode", default)]
    pub zip_code: String,
    #[serde(rename = "reportedBy", default)]
    pub reported_by: Option<Uuid>,
    #[serde(rename = "photoBase64", default)]
    pub photo_base64: Option<String>,
}

/// Request to register a shelter
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterShelterRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(max = 10))]
    #[serde(rename = "zipCode", default)]
    pub zip_code: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    #[validate(url)]
    #[serde(default)]
    pub website: Option<String>,
}

/// Query for shelters around a point
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbySheltersQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: Option<f64>,
    #[validate(range(min = 0.0, max = 20000.0))]
    #[serde(rename = "radiusKm")]
    pub radius_km: Option<f64>,
}

/// Request to adopt an animal
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAdoptionRequest {
    #[serde(rename = "requesterId")]
    pub requester_id: Uuid,
    #[validate(length(min = 1))]
    pub message: String,
}

/// Request to post an update on a report
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReportUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Request to register a user account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(max = 150))]
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[validate(length(max = 150))]
    #[serde(rename = "lastName", default)]
    pub last_name: String,
}

/// Request to list an animal for adoption
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnimalRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "animalType")]
    pub animal_type: AnimalType,
    #[serde(rename = "shelterId", default)]
    pub shelter_id: Option<Uuid>,
}

/// Filters for the adoptable animal listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimalListQuery {
    #[serde(rename = "type", default)]
    pub animal_type: Option<AnimalType>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdoptionDecision {
    Approve,
    Reject,
}

impl AdoptionDecision {
    pub fn status(self) -> AdoptionStatus {
        match self {
            AdoptionDecision::Approve => AdoptionStatus::Approved,
            AdoptionDecision::Reject => AdoptionStatus::Rejected,
        }
    }
}

/// Shelter decision on an adoption request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManageAdoptionRequest {
    /// Must be the shelter caring for the animal
    #[serde(rename = "shelterId")]
    pub shelter_id: Uuid,
    pub action: AdoptionDecision,
}
