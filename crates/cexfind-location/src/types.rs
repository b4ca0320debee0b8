//! Location domain records and the upstream JSON shapes they come from.
//!
//! ## Store directory (`GET /v3/stores`)
//! `{"response": {"data": {"stores": [{storeId, storeName, regionName,
//! latitude, longitude, closingTime}]}}}`. Coordinates are occasionally
//! `null` for stores that have not opened yet; such stores are skipped.
//!
//! ## Postcode lookup (`GET /postcodes?q=`)
//! `{"status": 200, "result": [{postcode, quality, longitude, latitude,
//! admin_district}]}`. A query with no match returns `"result": null`
//! rather than an empty array.

use serde::Deserialize;

use crate::haversine::Coordinate;

/// A physical store as held by the store directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub store_id: i64,
    pub store_name: String,
    pub region_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StoreRecord {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A geocoded postcode.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub postcode: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoresResponse {
    pub response: StoresEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoresEnvelope {
    pub data: StoresData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoresData {
    #[serde(default)]
    pub stores: Vec<RawStore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawStore {
    pub store_id: i64,
    pub store_name: String,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, rename = "closingTime")]
    pub _closing_time: Option<String>,
}

impl RawStore {
    /// Converts to a [`StoreRecord`], or `None` if coordinates are missing.
    pub(crate) fn into_record(self) -> Option<StoreRecord> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            tracing::debug!(store = %self.store_name, "skipping store without coordinates");
            return None;
        };
        Some(StoreRecord {
            store_id: self.store_id,
            store_name: self.store_name,
            region_name: self.region_name.unwrap_or_default(),
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostcodeResponse {
    #[serde(default)]
    pub result: Option<Vec<RawPostcode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPostcode {
    pub postcode: String,
    #[serde(default, rename = "quality")]
    pub _quality: Option<i64>,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub admin_district: Option<String>,
}

impl From<RawPostcode> for GeoLocation {
    fn from(raw: RawPostcode) -> Self {
        Self {
            postcode: raw.postcode,
            district: raw.admin_district.unwrap_or_default(),
            latitude: raw.latitude,
            longitude: raw.longitude,
        }
    }
}
