use serde::{Deserialize, Serialize};

use crate::core::classifier::{Classification, ImageFeatures};
use crate::models::domain::{
    AdoptionRequest, Animal, Notification, Report, ReportUpdate, Shelter,
};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReportResponse {
    pub report: Report,
    #[serde(rename = "notifiedShelters")]
    pub notified_shelters: usize,
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyShelter {
    #[serde(flatten)]
    pub shelter: Shelter,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbySheltersResponse {
    pub shelters: Vec<NearbyShelter>,
    #[serde(rename = "radiusKm")]
    pub radius_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
    #[serde(rename = "unreadCount")]
    pub unread_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    #[serde(rename = "unreadCount")]
    pub unread_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionRequestResponse {
    #[serde(rename = "adoptionRequest")]
    pub adoption_request: AdoptionRequest,
    #[serde(rename = "shelterNotified")]
    pub shelter_notified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportUpdateResponse {
    pub update: ReportUpdate,
    #[serde(rename = "notifiedShelters")]
    pub notified_shelters: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyImageResponse {
    pub classification: Classification,
    pub features: ImageFeatures,
}

/// Report with its updates, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDetailResponse {
    pub report: Report,
    pub updates: Vec<ReportUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalsResponse {
    pub animals: Vec<Animal>,
}
