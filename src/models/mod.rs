// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AdoptionRequest, AdoptionStatus, Animal, AnimalFilter, AnimalStatus, AnimalType, Coordinate,
    NewAdoptionRequest, NewAnimal, NewNotification, NewReport, NewReportUpdate, NewShelter,
    NewUser, Notification, NotificationKind, Report, ReportKind, ReportStatus, ReportUpdate,
    Requester, Shelter, UnknownVariant,
};
pub use requests::{
    AdoptionDecision, AnimalListQuery, CreateAdoptionRequest, CreateAnimalRequest,
    CreateReportRequest, CreateReportUpdateRequest, ManageAdoptionRequest, NearbySheltersQuery,
    RegisterShelterRequest, RegisterUserRequest,
};
pub use responses::{
    AdoptionRequestResponse, AnimalsResponse, ClassifyImageResponse, CreateReportResponse,
    ErrorResponse, HealthResponse, MarkReadResponse, NearbyShelter, NearbySheltersResponse,
    NotificationsResponse, ReportDetailResponse, ReportUpdateResponse, UnreadCountResponse,
};
