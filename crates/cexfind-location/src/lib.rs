//! Store locations, postcode geocoding and great-circle distances.
//!
//! [`StoreDirectory`] keeps a background-refreshed map of store names to
//! coordinates, [`PostcodeResolver`] turns a UK postcode into a coordinate
//! (cached for the life of the resolver), and [`haversine_distance`] joins
//! the two.

pub mod directory;
pub mod error;
pub mod haversine;
pub mod postcode;
pub mod types;

pub use directory::{DirectorySettings, StoreDirectory};
pub use error::LocationError;
pub use haversine::{haversine_distance, Coordinate, EARTH_RADIUS_KM, EARTH_RADIUS_MILES};
pub use postcode::{normalize_postcode, PostcodeResolver};
pub use types::{GeoLocation, StoreRecord};
