use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A latitude/longitude pair where either half may be unknown
///
/// Geocoding is best-effort, so shelters and reports routinely carry
/// partial or empty coordinates. Distance math only runs when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Coordinate with neither half set
    pub fn unset() -> Self {
        Self::default()
    }

    /// Both halves, if both are present
    pub fn point(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.point().is_some()
    }
}

/// Error returned when a stored enum label is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    (
        $name:ident,
        $kind:literal,
        { $($variant:ident => ($label:literal, $display:literal)),+ $(,)? }
    ) => {
        impl $name {
            /// Stable lowercase label used in storage and JSON
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Human-readable label used in notification text
            pub fn display_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $display,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimalType {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Other,
}

labelled_enum!(AnimalType, "animal type", {
    Dog => ("dog", "Dog"),
    Cat => ("cat", "Cat"),
    Bird => ("bird", "Bird"),
    Rabbit => ("rabbit", "Rabbit"),
    Other => ("other", "Other"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Stray,
    Lost,
    Found,
}

labelled_enum!(ReportKind, "report kind", {
    Stray => ("stray", "Stray Animal"),
    Lost => ("lost", "Lost Pet"),
    Found => ("found", "Found Animal"),
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Open,
    Investigating,
    Resolved,
    Closed,
}

labelled_enum!(ReportStatus, "report status", {
    Open => ("open", "Open"),
    Investigating => ("investigating", "Investigating"),
    Resolved => ("resolved", "Resolved"),
    Closed => ("closed", "Closed"),
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdoptionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

labelled_enum!(AdoptionStatus, "adoption status", {
    Pending => ("pending", "Pending"),
    Approved => ("approved", "Approved"),
    Rejected => ("rejected", "Rejected"),
    Completed => ("completed", "Completed"),
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimalStatus {
    #[default]
    Available,
    Pending,
    Adopted,
    Lost,
    Found,
}

labelled_enum!(AnimalStatus, "animal status", {
    Available => ("available", "Available for Adoption"),
    Pending => ("pending", "Pending Adoption"),
    Adopted => ("adopted", "Adopted"),
    Lost => ("lost", "Lost"),
    Found => ("found", "Found"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewReport,
    AdoptionRequest,
    ReportUpdate,
}

labelled_enum!(NotificationKind, "notification kind", {
    NewReport => ("new_report", "New Animal Report"),
    AdoptionRequest => ("adoption_request", "Adoption Request"),
    ReportUpdate => ("report_update", "Report Update"),
});

/// Shelter (NGO) account that lists animals and receives notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Fields needed to register a shelter
#[derive(Debug, Clone)]
pub struct NewShelter {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
    pub coordinate: Coordinate,
}

impl NewShelter {
    /// Free-text address handed to the geocoder
    pub fn address_line(&self) -> String {
        format!("{}, {}, {} {}", self.address, self.city, self.state, self.zip_code)
    }
}

/// Animal listed for adoption, usually by a shelter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "animalType")]
    pub animal_type: AnimalType,
    #[serde(rename = "shelterId")]
    pub shelter_id: Option<Uuid>,
    #[serde(default)]
    pub status: AnimalStatus,
}

#[derive(Debug, Clone)]
pub struct NewAnimal {
    pub name: String,
    pub animal_type: AnimalType,
    pub shelter_id: Option<Uuid>,
}

/// Listing filter; only animals still available for adoption are listed
#[derive(Debug, Clone, Default)]
pub struct AnimalFilter {
    pub animal_type: Option<AnimalType>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

impl AnimalFilter {
    pub fn matches(&self, animal: &Animal) -> bool {
        if animal.status != AnimalStatus::Available {
            return false;
        }
        if self.animal_type.is_some_and(|t| t != animal.animal_type) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                animal.name.to_lowercase().contains(&term.to_lowercase())
            }
            _ => true,
        }
    }
}

/// Public sighting of a stray, lost or found animal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub kind: ReportKind,
    #[serde(rename = "animalType")]
    pub animal_type: AnimalType,
    pub description: String,
    pub location: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub status: ReportStatus,
    #[serde(rename = "aiIdentifiedType")]
    pub ai_identified_type: Option<AnimalType>,
    #[serde(rename = "aiConfidence")]
    pub ai_confidence: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Fields needed to persist a report
#[derive(Debug, Clone)]
pub struct NewReport {
    pub kind: ReportKind,
    pub animal_type: AnimalType,
    pub description: String,
    pub location: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub coordinate: Coordinate,
    pub reported_by: Option<Uuid>,
    pub ai_identified_type: Option<AnimalType>,
    pub ai_confidence: Option<f64>,
}

impl NewReport {
    pub fn address_line(&self) -> String {
        format!("{}, {}, {} {}", self.location, self.city, self.state, self.zip_code)
    }
}

/// User submitting an adoption request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requester {
    pub id: Uuid,
    pub username: String,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
}

impl Requester {
    /// Join first and last name; `None` when both are blank
    pub fn full_name_from(first_name: &str, last_name: &str) -> Option<String> {
        let full_name = format!("{} {}", first_name.trim(), last_name.trim());
        let full_name = full_name.trim();
        (!full_name.is_empty()).then(|| full_name.to_string())
    }

    /// Full name when present, otherwise the login name
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionRequest {
    pub id: Uuid,
    pub animal: Animal,
    pub requester: Requester,
    pub message: String,
    pub status: AdoptionStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Fields needed to register a user account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct NewAdoptionRequest {
    pub animal_id: Uuid,
    pub requester_id: Uuid,
    pub message: String,
}

/// Progress note posted against a report or an animal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportUpdate {
    pub id: Uuid,
    #[serde(rename = "reportId")]
    pub report_id: Option<Uuid>,
    #[serde(rename = "animalId")]
    pub animal_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReportUpdate {
    pub report_id: Option<Uuid>,
    pub animal_id: Option<Uuid>,
    pub title: String,
    pub content: String,
}

/// Persisted message directed at one shelter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    #[serde(rename = "shelterId")]
    pub shelter_id: Uuid,
    #[serde(rename = "reportId")]
    pub report_id: Option<Uuid>,
    #[serde(rename = "adoptionRequestId")]
    pub adoption_request_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Notification about to be persisted
///
/// Only the constructors below can build one, which keeps the
/// report/adoption-request reference consistent with the kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    kind: NotificationKind,
    shelter_id: Uuid,
    report_id: Option<Uuid>,
    adoption_request_id: Option<Uuid>,
    title: String,
    message: String,
}

impl NewNotification {
    pub fn new_report(shelter_id: Uuid, report_id: Uuid, title: String, message: String) -> Self {
        Self {
            kind: NotificationKind::NewReport,
            shelter_id,
            report_id: Some(report_id),
            adoption_request_id: None,
            title,
            message,
        }
    }

    pub fn adoption_request(
        shelter_id: Uuid,
        adoption_request_id: Uuid,
        title: String,
        message: String,
    ) -> Self {
        Self {
            kind: NotificationKind::AdoptionRequest,
            shelter_id,
            report_id: None,
            adoption_request_id: Some(adoption_request_id),
            title,
            message,
        }
    }

    pub fn report_update(
        shelter_id: Uuid,
        report_id: Uuid,
        title: String,
        message: String,
    ) -> Self {
        Self {
            kind: NotificationKind::ReportUpdate,
            shelter_id,
            report_id: Some(report_id),
            adoption_request_id: None,
            title,
            message,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn shelter_id(&self) -> Uuid {
        self.shelter_id
    }

    pub fn report_id(&self) -> Option<Uuid> {
        self.report_id
    }

    pub fn adoption_request_id(&self) -> Option<Uuid> {
        self.adoption_request_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Materialise the stored row; new notifications always start unread
    pub fn into_notification(self, id: Uuid, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            kind: self.kind,
            shelter_id: self.shelter_id,
            report_id: self.report_id,
            adoption_request_id: self.adoption_request_id,
            title: self.title,
            message: self.message,
            is_read: false,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_point_requires_both_halves() {
        assert_eq!(Coordinate::new(1.0, 2.0).point(), Some((1.0, 2.0)));
        assert!(!Coordinate { latitude: Some(1.0), longitude: None }.is_set());
        assert!(!Coordinate::unset().is_set());
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        assert_eq!("new_report".parse::<NotificationKind>(), Ok(NotificationKind::NewReport));
        assert_eq!(ReportKind::Lost.display_name(), "Lost Pet");
        assert!("hamster".parse::<AnimalType>().is_err());
    }

    #[test]
    fn test_requester_display_name_falls_back_to_username() {
        let mut requester = Requester {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            full_name: Some("  ".to_string()),
        };
        assert_eq!(requester.display_name(), "jdoe");

        requester.full_name = Some("Jane Doe".to_string());
        assert_eq!(requester.display_name(), "Jane Doe");
    }

    #[test]
    fn test_full_name_from_parts() {
        assert_eq!(Requester::full_name_from("Jane", "Doe").as_deref(), Some("Jane Doe"));
        assert_eq!(Requester::full_name_from("", " Doe ").as_deref(), Some("Doe"));
        assert_eq!(Requester::full_name_from(" ", ""), None);
    }

    #[test]
    fn test_animal_filter_lists_available_only() {
        let mut animal = Animal {
            id: Uuid::new_v4(),
            name: "Biscuit".to_string(),
            animal_type: AnimalType::Dog,
            shelter_id: None,
            status: AnimalStatus::Available,
        };

        assert!(AnimalFilter::default().matches(&animal));
        let by_search = AnimalFilter {
            search: Some("bisc".to_string()),
            ..Default::default()
        };
        assert!(by_search.matches(&animal));
        let by_type = AnimalFilter {
            animal_type: Some(AnimalType::Cat),
            ..Default::default()
        };
        assert!(!by_type.matches(&animal));

        animal.status = AnimalStatus::Pending;
        assert!(!AnimalFilter::default().matches(&animal));
    }

    #[test]
    fn test_new_notification_references_match_kind() {
        let shelter = Uuid::new_v4();
        let request = Uuid::new_v4();
        let n = NewNotification::adoption_request(shelter, request, "t".into(), "m".into());
        assert_eq!(n.kind(), NotificationKind::AdoptionRequest);
        assert_eq!(n.report_id(), None);
        assert_eq!(n.adoption_request_id(), Some(request));

        let stored = n.into_notification(Uuid::new_v4(), Utc::now());
        assert!(!stored.is_read);
    }
}
