// Service exports
pub mod cache;
pub mod geocoder;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use geocoder::{locate_or_unset, DisabledGeocoder, GeocodeError, Geocoder, NominatimGeocoder};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{RescueStore, StoreError, StoreResult};
