use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::distance::{calculate_bounding_box, distance, is_within_bounding_box};
use crate::models::Shelter;
use crate::services::{RescueStore, StoreResult};

/// Radius used when a caller does not pick one
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Rank shelters within `radius_km` of a point, nearest first
///
/// Shelters without a full coordinate are never candidates. Ties on distance
/// are broken by shelter id so the order is deterministic.
///
/// # Pipeline Stages
/// 1. Bounding box pre-filter (skipped near the poles and the antimeridian)
/// 2. Exact haversine distance check
/// 3. Sort by distance, then id
pub fn rank_nearby<I>(shelters: I, lat: f64, lon: f64, radius_km: f64) -> Vec<(Shelter, f64)>
where
    I: IntoIterator<Item = Shelter>,
{
    let bbox = calculate_bounding_box(lat, lon, radius_km);

    let mut ranked: Vec<(Shelter, f64)> = shelters
        .into_iter()
        .filter(|shelter| match (&bbox, shelter.coordinate.point()) {
            (Some(bbox), Some((s_lat, s_lon))) => is_within_bounding_box(s_lat, s_lon, bbox),
            (None, Some(_)) => true,
            (_, None) => false,
        })
        .filter_map(|shelter| {
            let km = distance(
                Some(lat),
                Some(lon),
                shelter.coordinate.latitude,
                shelter.coordinate.longitude,
            )?;
            (km <= radius_km).then_some((shelter, km))
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });

    ranked
}

/// Finds shelters near a point using the store's located shelters
///
/// A linear scan; shelter counts are small enough that no spatial index
/// is kept.
#[derive(Clone)]
pub struct ShelterLocator {
    store: Arc<dyn RescueStore>,
    default_radius_km: f64,
}

impl ShelterLocator {
    pub fn new(store: Arc<dyn RescueStore>, default_radius_km: f64) -> Self {
        Self {
            store,
            default_radius_km,
        }
    }

    pub fn with_default_radius(store: Arc<dyn RescueStore>) -> Self {
        Self::new(store, DEFAULT_RADIUS_KM)
    }

    pub fn default_radius_km(&self) -> f64 {
        self.default_radius_km
    }

    /// Shelters within the radius, nearest first
    ///
    /// A missing latitude or longitude yields an empty list rather than an
    /// error. `radius_km` falls back to the configured default.
    pub async fn nearby(
        &self,
        lat: Option<f64>,
        lon: Option<f64>,
        radius_km: Option<f64>,
    ) -> StoreResult<Vec<Shelter>> {
        Ok(self
            .nearby_with_distance(lat, lon, radius_km)
            .await?
            .into_iter()
            .map(|(shelter, _)| shelter)
            .collect())
    }

    /// Same as [`ShelterLocator::nearby`] but keeps each distance in km
    pub async fn nearby_with_distance(
        &self,
        lat: Option<f64>,
        lon: Option<f64>,
        radius_km: Option<f64>,
    ) -> StoreResult<Vec<(Shelter, f64)>> {
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Ok(Vec::new());
        };
        let radius_km = radius_km.unwrap_or(self.default_radius_km);

        let candidates = self.store.located_shelters().await?;
        let total = candidates.len();
        let ranked = rank_nearby(candidates, lat, lon, radius_km);

        tracing::debug!(
            "Found {} of {} shelters within {}km of ({}, {})",
            ranked.len(),
            total,
            radius_km,
            lat,
            lon
        );

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_shelter(name: &str, coordinate: Coordinate) -> Shelter {
        Shelter {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            phone: "555-0100".to_string(),
            email: "help@example.org".to_string(),
            website: None,
            coordinate,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rank_nearby_orders_by_distance() {
        let shelters = vec![
            create_shelter("far", Coordinate::new(0.0, 0.4)),
            create_shelter("near", Coordinate::new(0.0, 0.1)),
            create_shelter("mid", Coordinate::new(0.0, 0.2)),
        ];

        let ranked = rank_nearby(shelters, 0.0, 0.0, 50.0);
        let names: Vec<_> = ranked.iter().map(|(s, _)| s.name.as_str()).collect();

        // 0.4 degrees of longitude at the equator is ~44.5km
        assert_eq!(names, vec!["near", "mid", "far"]);
        assert!(ranked.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_rank_nearby_skips_unlocated() {
        let shelters = vec![
            create_shelter("unknown", Coordinate::unset()),
            create_shelter(
                "half",
                Coordinate {
                    latitude: Some(0.0),
                    longitude: None,
                },
            ),
            create_shelter("here", Coordinate::new(0.0, 0.0)),
        ];

        let ranked = rank_nearby(shelters, 0.0, 0.0, 50.0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0.name, "here");
        assert_eq!(ranked[0].1, 0.0);
    }

    #[test]
    fn test_rank_nearby_ties_broken_by_id() {
        let a = create_shelter("a", Coordinate::new(10.0, 10.0));
        let b = create_shelter("b", Coordinate::new(10.0, 10.0));
        let expected_first = a.id.min(b.id);

        let ranked = rank_nearby(vec![a, b], 10.0, 10.0, 1.0);
        assert_eq!(ranked[0].0.id, expected_first);
    }

    #[test]
    fn test_rank_nearby_across_antimeridian() {
        // ~22km apart across the 180th meridian
        let shelters = vec![create_shelter("fiji", Coordinate::new(-17.0, -179.9))];
        let ranked = rank_nearby(shelters, -17.0, 179.9, 50.0);
        assert_eq!(ranked.len(), 1);
    }
}
