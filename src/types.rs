use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Amenity;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!("latitude {latitude} out of range")));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!("longitude {longitude} out of range")));
        }
        Ok(Self { latitude, longitude })
    }
}

/// Star rating, always within 1..=5.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(stars: i64) -> Result<Self> {
        match stars {
            1..=5 => Ok(Self(stars as u8)),
            _ => Err(Error::InvalidInput(format!(
                "rating must be between 1 and 5, got {stars}"
            ))),
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = Error;

    fn try_from(stars: i64) -> Result<Self> {
        Rating::new(stars)
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> u8 {
        r.0
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct HotelCode(pub String);

impl From<&str> for HotelCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for HotelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct HotelRecord {
    pub code: HotelCode,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub city: Option<String>,
    pub state: Option<String>,
    /// `None` when the source coordinate was missing or malformed.
    pub coordinate: Option<Coordinate>,
    pub rating: Option<Rating>,
    pub amenities: BTreeSet<Amenity>,
}

impl HotelRecord {
    pub fn is_mappable(&self) -> bool {
        self.coordinate.is_some()
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Neighbor {
    pub code: HotelCode,
    pub distance: f32,
}

/// Neighbors sorted by ascending distance, ties in row order.
pub type QueryResult = Vec<Neighbor>;
