use geo::{coord, Intersects, Rect};

/// Earth's mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Padding added to bounding boxes so float rounding never drops a point
/// sitting exactly on the search radius
const BBOX_PADDING_DEG: f64 = 1e-9;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Distance between two possibly-unknown points in kilometers
///
/// Returns `None` when any of the four components is missing.
#[inline]
pub fn distance(
    lat1: Option<f64>,
    lon1: Option<f64>,
    lat2: Option<f64>,
    lon2: Option<f64>,
) -> Option<f64> {
    Some(haversine_distance(lat1?, lon1?, lat2?, lon2?))
}

/// Calculate a bounding box enclosing every point within `radius_km`
///
/// Uses the exact spherical-cap extent, so the box never excludes a point
/// that the haversine check would keep. Returns `None` when the cap reaches
/// a pole or wraps the antimeridian; callers should then scan without a
/// pre-filter.
///
/// # Arguments
/// * `lat` - Center latitude in degrees
/// * `lon` - Center longitude in degrees
/// * `radius_km` - Radius in kilometers
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> Option<Rect<f64>> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return None;
    }

    let angular = radius_km / EARTH_RADIUS_KM;
    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();

    let min_lat = lat_rad - angular;
    let max_lat = lat_rad + angular;
    if min_lat <= -std::f64::consts::FRAC_PI_2 || max_lat >= std::f64::consts::FRAC_PI_2 {
        return None;
    }

    let ratio = angular.sin() / lat_rad.cos();
    if ratio >= 1.0 {
        return None;
    }
    let delta_lon = ratio.asin();

    let min_lon = lon_rad - delta_lon;
    let max_lon = lon_rad + delta_lon;
    if min_lon < -std::f64::consts::PI || max_lon > std::f64::consts::PI {
        return None;
    }

    Some(Rect::new(
        coord! {
            x: min_lon.to_degrees() - BBOX_PADDING_DEG,
            y: min_lat.to_degrees() - BBOX_PADDING_DEG,
        },
        coord! {
            x: max_lon.to_degrees() + BBOX_PADDING_DEG,
            y: max_lat.to_degrees() + BBOX_PADDING_DEG,
        },
    ))
}

/// Check if a point is within a bounding box (edges inclusive)
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &Rect<f64>) -> bool {
    bbox.intersects(&coord! { x: lon, y: lat })
}
