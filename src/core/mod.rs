// Core algorithm exports
pub mod classifier;
pub mod dispatcher;
pub mod distance;
pub mod locator;

pub use classifier::{AnimalClassifier, Classification, ClassifierThresholds, ImageFeatures};
pub use dispatcher::{NotificationDispatcher, DEFAULT_EXCERPT_CHARS};
pub use distance::{calculate_bounding_box, distance, haversine_distance, is_within_bounding_box};
pub use locator::{rank_nearby, ShelterLocator, DEFAULT_RADIUS_KM};
