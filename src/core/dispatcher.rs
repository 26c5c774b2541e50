use std::collections::HashSet;
use std::sync::Arc;

use crate::core::distance::distance;
use crate::core::locator::ShelterLocator;
use crate::models::{
    AdoptionRequest, NewNotification, Notification, NotificationKind, Report, ReportUpdate,
    Shelter,
};
use crate::services::{RescueStore, StoreResult};

/// Characters of a report description quoted in a notification
pub const DEFAULT_EXCERPT_CHARS: usize = 200;

/// Creates notification rows for shelters affected by rescue events
///
/// Every entry point is a sequential loop over the affected shelters.
/// Nothing is deduplicated across calls: dispatching the same event twice
/// notifies twice. Store failures propagate to the caller untouched.
#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn RescueStore>,
    locator: ShelterLocator,
    excerpt_chars: usize,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn RescueStore>, locator: ShelterLocator, excerpt_chars: usize) -> Self {
        Self {
            store,
            locator,
            excerpt_chars,
        }
    }

    /// Dispatcher with a 50km locator and 200-character excerpts
    pub fn with_defaults(store: Arc<dyn RescueStore>) -> Self {
        let locator = ShelterLocator::with_default_radius(store.clone());
        Self::new(store, locator, DEFAULT_EXCERPT_CHARS)
    }

    /// Notify every shelter within the default radius about a new report
    ///
    /// Reports without a coordinate notify nobody.
    pub async fn notify_nearby_about_report(
        &self,
        report: &Report,
    ) -> StoreResult<Vec<Notification>> {
        let Some((lat, lon)) = report.coordinate.point() else {
            tracing::debug!(
                "Report {} has no coordinate, skipping shelter notifications",
                report.id
            );
            return Ok(Vec::new());
        };

        let shelters = self.locator.nearby(Some(lat), Some(lon), None).await?;

        let mut created = Vec::with_capacity(shelters.len());
        for shelter in &shelters {
            let title = format!("New {} Report Nearby", report.kind.display_name());
            let message = self.new_report_message(report, shelter);

            let notification = self
                .store
                .create_notification(NewNotification::new_report(
                    shelter.id,
                    report.id,
                    title,
                    message,
                ))
                .await?;
            created.push(notification);
        }

        tracing::info!(
            "Notified {} shelters about report {}",
            created.len(),
            report.id
        );

        Ok(created)
    }

    /// Notify the shelter caring for the requested animal
    ///
    /// Animals not attached to a shelter notify nobody.
    pub async fn notify_shelter_about_adoption_request(
        &self,
        request: &AdoptionRequest,
    ) -> StoreResult<Option<Notification>> {
        let Some(shelter_id) = request.animal.shelter_id else {
            tracing::debug!(
                "Animal {} has no shelter, skipping adoption request notification",
                request.animal.id
            );
            return Ok(None);
        };

        let title = format!("New Adoption Request for {}", request.animal.name);
        let message = format!(
            "{} has submitted an adoption request for {}.\n\n\
             Message from applicant:\n{}\n\n\
             Please review and respond to this request.",
            request.requester.display_name(),
            request.animal.name,
            request.message
        );

        let notification = self
            .store
            .create_notification(NewNotification::adoption_request(
                shelter_id,
                request.id,
                title,
                message,
            ))
            .await?;

        tracing::info!(
            "Notified shelter {} about adoption request {}",
            shelter_id,
            request.id
        );

        Ok(Some(notification))
    }

    /// Forward a report update to every shelter told about the report
    ///
    /// The shelters originally sent a `new_report` notification act as the
    /// subscriber list. Each shelter gets one update even if it was notified
    /// about the report more than once.
    pub async fn notify_shelter_about_report_update(
        &self,
        update: &ReportUpdate,
    ) -> StoreResult<Vec<Notification>> {
        let Some(report_id) = update.report_id else {
            return Ok(Vec::new());
        };

        let history = self
            .store
            .notifications_for_report(report_id, NotificationKind::NewReport)
            .await?;

        let mut seen = HashSet::new();
        let mut created = Vec::new();
        for shelter_id in history.iter().map(|n| n.shelter_id) {
            if !seen.insert(shelter_id) {
                continue;
            }

            let notification = self
                .store
                .create_notification(NewNotification::report_update(
                    shelter_id,
                    report_id,
                    format!("Update on Report: {}", update.title),
                    update.content.clone(),
                ))
                .await?;
            created.push(notification);
        }

        tracing::info!(
            "Forwarded update {} on report {} to {} shelters",
            update.id,
            report_id,
            created.len()
        );

        Ok(created)
    }

    fn new_report_message(&self, report: &Report, shelter: &Shelter) -> String {
        let km = distance(
            report.coordinate.latitude,
            report.coordinate.longitude,
            shelter.coordinate.latitude,
            shelter.coordinate.longitude,
        )
        .unwrap_or_default();

        let excerpt: String = report.description.chars().take(self.excerpt_chars).collect();

        format!(
            "A new {} report has been submitted for a {} approximately {:.1}km away.\n\n\
             Location: {}, {}, {}\n\
             Description: {}...\n\n\
             Please check the report details and take appropriate action.",
            report.kind.display_name().to_lowercase(),
            report.animal_type.display_name().to_lowercase(),
            km,
            report.location,
            report.city,
            report.state,
            excerpt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimalType, Coordinate, ReportKind, ReportStatus};
    use crate::services::InMemoryStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_report(description: &str, coordinate: Coordinate) -> Report {
        Report {
            id: Uuid::new_v4(),
            kind: ReportKind::Stray,
            animal_type: AnimalType::Dog,
            description: description.to_string(),
            location: "Oak Park".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            coordinate,
            status: ReportStatus::Open,
            ai_identified_type: None,
            ai_confidence: None,
            created_at: Utc::now(),
        }
    }

    fn create_shelter(coordinate: Coordinate) -> Shelter {
        Shelter {
            id: Uuid::new_v4(),
            name: "Paws".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            phone: "555-0100".to_string(),
            email: "paws@example.org".to_string(),
            website: None,
            coordinate,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_report_message_format() {
        let store: Arc<dyn RescueStore> = Arc::new(InMemoryStore::new());
        let dispatcher = NotificationDispatcher::with_defaults(store);

        let long_description = "x".repeat(250);
        let report = create_report(&long_description, Coordinate::new(0.0, 0.0));
        let shelter = create_shelter(Coordinate::new(0.0, 0.1));

        let message = dispatcher.new_report_message(&report, &shelter);

        assert!(message.starts_with(
            "A new stray animal report has been submitted for a dog approximately 11.1km away."
        ));
        assert!(message.contains("Location: Oak Park, Springfield, IL\n"));
        assert!(message.contains(&format!("Description: {}...", "x".repeat(200))));
        assert!(!message.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let store: Arc<dyn RescueStore> = Arc::new(InMemoryStore::new());
        let locator = ShelterLocator::with_default_radius(store.clone());
        let dispatcher = NotificationDispatcher::new(store, locator, 3);

        let report = create_report("ñandú perdido", Coordinate::new(0.0, 0.0));
        let shelter = create_shelter(Coordinate::new(0.0, 0.0));
        let message = dispatcher.new_report_message(&report, &shelter);

        assert!(message.contains("Description: ñan..."));
    }

    #[tokio::test]
    async fn test_update_without_report_is_noop() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = NotificationDispatcher::with_defaults(store.clone());

        let update = ReportUpdate {
            id: Uuid::new_v4(),
            report_id: None,
            animal_id: Some(Uuid::new_v4()),
            title: "Vet visit".to_string(),
            content: "All good".to_string(),
            created_at: Utc::now(),
        };

        let created = dispatcher.notify_shelter_about_report_update(&update).await.unwrap();
        assert!(created.is_empty());
        assert!(store.all_notifications().await.is_empty());
    }
}
