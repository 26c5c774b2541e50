use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AdoptionRequest, AdoptionStatus, Animal, AnimalFilter, AnimalStatus, NewAdoptionRequest,
    NewAnimal, NewNotification, NewReport, NewReportUpdate, NewShelter, NewUser, Notification,
    NotificationKind, Report, ReportStatus, ReportUpdate, Requester, Shelter,
};
use crate::services::store::{RescueStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    shelters: Vec<Shelter>,
    animals: HashMap<Uuid, Animal>,
    requesters: HashMap<Uuid, Requester>,
    reports: HashMap<Uuid, Report>,
    adoption_requests: Vec<AdoptionRequest>,
    updates: Vec<ReportUpdate>,
    // Insertion order is creation order
    notifications: Vec<Notification>,
}

/// Process-local store used by tests and `storage.backend = "memory"`
///
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_shelter(&self, shelter: Shelter) {
        self.state.write().await.shelters.push(shelter);
    }

    /// Every notification ever created, oldest first
    pub async fn all_notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }
}

#[async_trait]
impl RescueStore for InMemoryStore {
    async fn located_shelters(&self) -> StoreResult<Vec<Shelter>> {
        let state = self.state.read().await;
        Ok(state
            .shelters
            .iter()
            .filter(|s| s.coordinate.is_set())
            .cloned()
            .collect())
    }

    async fn get_shelter(&self, shelter_id: Uuid) -> StoreResult<Shelter> {
        let state = self.state.read().await;
        state
            .shelters
            .iter()
            .find(|s| s.id == shelter_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("shelter {}", shelter_id)))
    }

    async fn create_shelter(&self, shelter: NewShelter) -> StoreResult<Shelter> {
        let created = Shelter {
            id: Uuid::new_v4(),
            name: shelter.name,
            address: shelter.address,
            city: shelter.city,
            state: shelter.state,
            zip_code: shelter.zip_code,
            phone: shelter.phone,
            email: shelter.email,
            website: shelter.website,
            coordinate: shelter.coordinate,
            created_at: Utc::now(),
        };
        self.state.write().await.shelters.push(created.clone());
        Ok(created)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<Requester> {
        let mut state = self.state.write().await;
        if state.requesters.values().any(|r| r.username == user.username) {
            return Err(StoreError::Conflict(format!("username {}", user.username)));
        }

        let created = Requester {
            id: Uuid::new_v4(),
            full_name: Requester::full_name_from(&user.first_name, &user.last_name),
            username: user.username,
        };
        state.requesters.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_animal(&self, animal: NewAnimal) -> StoreResult<Animal> {
        let mut state = self.state.write().await;
        if let Some(shelter_id) = animal.shelter_id {
            if !state.shelters.iter().any(|s| s.id == shelter_id) {
                return Err(StoreError::NotFound(format!("shelter {}", shelter_id)));
            }
        }

        let created = Animal {
            id: Uuid::new_v4(),
            name: animal.name,
            animal_type: animal.animal_type,
            shelter_id: animal.shelter_id,
            status: AnimalStatus::Available,
        };
        state.animals.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_animal(&self, animal_id: Uuid) -> StoreResult<Animal> {
        let state = self.state.read().await;
        state
            .animals
            .get(&animal_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("animal {}", animal_id)))
    }

    async fn list_animals(&self, filter: &AnimalFilter) -> StoreResult<Vec<Animal>> {
        let state = self.state.read().await;
        let mut animals: Vec<Animal> = state
            .animals
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        animals.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(animals)
    }

    async fn get_report(&self, report_id: Uuid) -> StoreResult<Report> {
        let state = self.state.read().await;
        state
            .reports
            .get(&report_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("report {}", report_id)))
    }

    async fn create_report(&self, report: NewReport) -> StoreResult<Report> {
        let created = Report {
            id: Uuid::new_v4(),
            kind: report.kind,
            animal_type: report.animal_type,
            description: report.description,
            location: report.location,
            city: report.city,
            state: report.state,
            zip_code: report.zip_code,
            coordinate: report.coordinate,
            status: ReportStatus::Open,
            ai_identified_type: report.ai_identified_type,
            ai_confidence: report.ai_confidence,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .reports
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_adoption_request(
        &self,
        request: NewAdoptionRequest,
    ) -> StoreResult<AdoptionRequest> {
        let mut state = self.state.write().await;

        let animal = state
            .animals
            .get(&request.animal_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("animal {}", request.animal_id)))?;
        let requester = state
            .requesters
            .get(&request.requester_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {}", request.requester_id)))?;

        if state
            .adoption_requests
            .iter()
            .any(|r| r.animal.id == animal.id && r.requester.id == requester.id)
        {
            return Err(StoreError::Conflict(format!(
                "user {} already requested animal {}",
                requester.id, animal.id
            )));
        }

        let created = AdoptionRequest {
            id: Uuid::new_v4(),
            animal,
            requester,
            message: request.message,
            status: AdoptionStatus::Pending,
            created_at: Utc::now(),
        };
        state.adoption_requests.push(created.clone());
        Ok(created)
    }

    async fn get_adoption_request(&self, request_id: Uuid) -> StoreResult<AdoptionRequest> {
        let state = self.state.read().await;
        let mut request = state
            .adoption_requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("adoption request {}", request_id)))?;
        // the embedded animal is a snapshot; report its current status
        if let Some(animal) = state.animals.get(&request.animal.id) {
            request.animal = animal.clone();
        }
        Ok(request)
    }

    async fn decide_adoption_request(
        &self,
        request_id: Uuid,
        status: AdoptionStatus,
    ) -> StoreResult<AdoptionRequest> {
        {
            let mut state = self.state.write().await;
            let request = state
                .adoption_requests
                .iter_mut()
                .find(|r| r.id == request_id)
                .ok_or_else(|| StoreError::NotFound(format!("adoption request {}", request_id)))?;
            request.status = status;
            let animal_id = request.animal.id;

            if status == AdoptionStatus::Approved {
                if let Some(animal) = state.animals.get_mut(&animal_id) {
                    animal.status = AnimalStatus::Pending;
                }
            }
        }

        self.get_adoption_request(request_id).await
    }

    async fn create_report_update(&self, update: NewReportUpdate) -> StoreResult<ReportUpdate> {
        let created = ReportUpdate {
            id: Uuid::new_v4(),
            report_id: update.report_id,
            animal_id: update.animal_id,
            title: update.title,
            content: update.content,
            created_at: Utc::now(),
        };
        self.state.write().await.updates.push(created.clone());
        Ok(created)
    }

    async fn report_updates(&self, report_id: Uuid) -> StoreResult<Vec<ReportUpdate>> {
        let state = self.state.read().await;
        Ok(state
            .updates
            .iter()
            .rev()
            .filter(|u| u.report_id == Some(report_id))
            .cloned()
            .collect())
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<Notification> {
        let created = notification.into_notification(Uuid::new_v4(), Utc::now());
        self.state.write().await.notifications.push(created.clone());
        Ok(created)
    }

    async fn notifications_for_report(
        &self,
        report_id: Uuid,
        kind: NotificationKind,
    ) -> StoreResult<Vec<Notification>> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.kind == kind && n.report_id == Some(report_id))
            .cloned()
            .collect())
    }

    async fn notifications_for_shelter(&self, shelter_id: Uuid) -> StoreResult<Vec<Notification>> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.shelter_id == shelter_id)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, shelter_id: Uuid) -> StoreResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.shelter_id == shelter_id && !n.is_read)
            .count() as u64)
    }

    async fn mark_read(&self, shelter_id: Uuid, notification_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.shelter_id == shelter_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, shelter_id: Uuid) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.shelter_id == shelter_id && !n.is_read)
        {
            notification.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimalType, Coordinate};

    fn new_shelter(name: &str, coordinate: Coordinate) -> NewShelter {
        NewShelter {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            phone: "555-0100".to_string(),
            email: "help@example.org".to_string(),
            website: None,
            coordinate,
        }
    }

    #[tokio::test]
    async fn test_located_shelters_excludes_partial_coordinates() {
        let store = InMemoryStore::new();
        store
            .create_shelter(new_shelter("located", Coordinate::new(39.8, -89.6)))
            .await
            .unwrap();
        store
            .create_shelter(new_shelter(
                "half",
                Coordinate {
                    latitude: Some(39.8),
                    longitude: None,
                },
            ))
            .await
            .unwrap();
        store
            .create_shelter(new_shelter("unknown", Coordinate::unset()))
            .await
            .unwrap();

        let located = store.located_shelters().await.unwrap();
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].name, "located");
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_owner() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let created = store
            .create_notification(NewNotification::new_report(
                owner,
                Uuid::new_v4(),
                "title".into(),
                "body".into(),
            ))
            .await
            .unwrap();

        assert!(!store.mark_read(other, created.id).await.unwrap());
        assert_eq!(store.unread_count(owner).await.unwrap(), 1);

        assert!(store.mark_read(owner, created.id).await.unwrap());
        assert_eq!(store.unread_count(owner).await.unwrap(), 0);
    }

    async fn seed_animal_and_user(store: &InMemoryStore) -> (Animal, Requester) {
        let animal = store
            .create_animal(NewAnimal {
                name: "Rex".to_string(),
                animal_type: AnimalType::Dog,
                shelter_id: None,
            })
            .await
            .unwrap();
        let requester = store
            .create_user(NewUser {
                username: "jdoe".to_string(),
                first_name: String::new(),
                last_name: String::new(),
            })
            .await
            .unwrap();
        (animal, requester)
    }

    #[tokio::test]
    async fn test_duplicate_adoption_request_conflicts() {
        let store = InMemoryStore::new();
        let (animal, requester) = seed_animal_and_user(&store).await;

        let request = NewAdoptionRequest {
            animal_id: animal.id,
            requester_id: requester.id,
            message: "Please".to_string(),
        };
        store.create_adoption_request(request.clone()).await.unwrap();
        let err = store.create_adoption_request(request).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = InMemoryStore::new();
        seed_animal_and_user(&store).await;

        let err = store
            .create_user(NewUser {
                username: "jdoe".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_animal_for_unknown_shelter() {
        let store = InMemoryStore::new();
        let err = store
            .create_animal(NewAnimal {
                name: "Ghost".to_string(),
                animal_type: AnimalType::Cat,
                shelter_id: Some(Uuid::new_v4()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_approval_marks_animal_pending() {
        let store = InMemoryStore::new();
        let (animal, requester) = seed_animal_and_user(&store).await;
        let request = store
            .create_adoption_request(NewAdoptionRequest {
                animal_id: animal.id,
                requester_id: requester.id,
                message: "Please".to_string(),
            })
            .await
            .unwrap();

        let decided = store
            .decide_adoption_request(request.id, AdoptionStatus::Approved)
            .await
            .unwrap();
        assert_eq!(decided.status, AdoptionStatus::Approved);
        assert_eq!(decided.animal.status, AnimalStatus::Pending);
        assert_eq!(store.get_animal(animal.id).await.unwrap().status, AnimalStatus::Pending);
        assert!(store.list_animals(&AnimalFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_keeps_animal_available() {
        let store = InMemoryStore::new();
        let (animal, requester) = seed_animal_and_user(&store).await;
        let request = store
            .create_adoption_request(NewAdoptionRequest {
                animal_id: animal.id,
                requester_id: requester.id,
                message: "Please".to_string(),
            })
            .await
            .unwrap();

        let decided = store
            .decide_adoption_request(request.id, AdoptionStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(decided.status, AdoptionStatus::Rejected);
        assert_eq!(decided.animal.status, AnimalStatus::Available);

        let missing = store
            .decide_adoption_request(Uuid::new_v4(), AdoptionStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(missing, StoreError::NotFound(_)));
    }

    #[test]
    fn test_mark_all_read_counts_only_unread() {
        let store = InMemoryStore::new();
        let shelter = Uuid::new_v4();

        tokio_test::block_on(async {
            for _ in 0..3 {
                store
                    .create_notification(NewNotification::report_update(
                        shelter,
                        Uuid::new_v4(),
                        "t".into(),
                        "m".into(),
                    ))
                    .await
                    .unwrap();
            }
            assert_eq!(store.mark_all_read(shelter).await.unwrap(), 3);
            assert_eq!(store.mark_all_read(shelter).await.unwrap(), 0);
        });
    }
}
