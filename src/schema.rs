//! The fixed feature layout shared by the index-building path and the query path.
//!
//! A feature vector is `[latitude, longitude, rating, amenity_1, .., amenity_n]`
//! with amenities in the order of [`Amenity::ALL`]. Both sides of the index go
//! through this module, so the layout is declared exactly once.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Recognized amenities, in feature order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Amenity {
    #[serde(rename = "Air Conditioning")]
    AirConditioning,
    #[serde(rename = "Airport shuttle")]
    AirportShuttle,
    Bar,
    Breakfast,
    #[serde(rename = "Business Centre")]
    BusinessCentre,
    Lift,
    #[serde(rename = "Non-smoking rooms")]
    NonSmokingRooms,
    #[serde(rename = "Pets Allowed")]
    PetsAllowed,
    Restaurant,
    #[serde(rename = "Room service")]
    RoomService,
    #[serde(rename = "Swimming pool")]
    SwimmingPool,
    WiFi,
}

impl Amenity {
    pub const COUNT: usize = 12;

    pub const ALL: [Amenity; Amenity::COUNT] = [
        Amenity::AirConditioning,
        Amenity::AirportShuttle,
        Amenity::Bar,
        Amenity::Breakfast,
        Amenity::BusinessCentre,
        Amenity::Lift,
        Amenity::NonSmokingRooms,
        Amenity::PetsAllowed,
        Amenity::Restaurant,
        Amenity::RoomService,
        Amenity::SwimmingPool,
        Amenity::WiFi,
    ];

    /// Column and display name, as it appears in the dataset header.
    pub fn name(self) -> &'static str {
        match self {
            Amenity::AirConditioning => "Air Conditioning",
            Amenity::AirportShuttle => "Airport shuttle",
            Amenity::Bar => "Bar",
            Amenity::Breakfast => "Breakfast",
            Amenity::BusinessCentre => "Business Centre",
            Amenity::Lift => "Lift",
            Amenity::NonSmokingRooms => "Non-smoking rooms",
            Amenity::PetsAllowed => "Pets Allowed",
            Amenity::Restaurant => "Restaurant",
            Amenity::RoomService => "Room service",
            Amenity::SwimmingPool => "Swimming pool",
            Amenity::WiFi => "WiFi",
        }
    }

    /// Exact-name lookup. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Amenity> {
        Amenity::ALL.into_iter().find(|a| a.name() == name.trim())
    }

    /// Position of this amenity within the full feature vector.
    pub fn feature_position(self) -> usize {
        AMENITY_OFFSET + self as usize
    }
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const LATITUDE: usize = 0;
pub const LONGITUDE: usize = 1;
pub const RATING: usize = 2;
const AMENITY_OFFSET: usize = 3;

pub const FEATURE_DIM: usize = AMENITY_OFFSET + Amenity::COUNT;

/// Ordered feature names, persisted alongside the index and checked on load.
pub fn feature_names() -> Vec<String> {
    let mut names = vec![
        "Latitude".to_string(),
        "Longitude".to_string(),
        "Rating".to_string(),
    ];
    names.extend(Amenity::ALL.iter().map(|a| a.name().to_string()));
    names
}

/// Coordinates are stored as `f32`, so two hotels closer than roughly a metre
/// encode to the same position and rank as a tie.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; FEATURE_DIM]);

impl FeatureVector {
    pub(crate) fn from_array(values: [f32; FEATURE_DIM]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        FEATURE_DIM
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The amenity sub-vector, in schema order.
    pub fn amenities(&self) -> &[f32] {
        &self.0[AMENITY_OFFSET..]
    }
}

impl Index<usize> for FeatureVector {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.0[i]
    }
}

impl TryFrom<&[f32]> for FeatureVector {
    type Error = crate::Error;

    fn try_from(values: &[f32]) -> crate::Result<Self> {
        let array: [f32; FEATURE_DIM] =
            values
                .try_into()
                .map_err(|_| crate::Error::DimensionMismatch {
                    expected: FEATURE_DIM,
                    found: values.len(),
                })?;
        Ok(Self(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_amenity_order() {
        let names = feature_names();
        assert_eq!(names.len(), FEATURE_DIM);
        assert_eq!(&names[..3], ["Latitude", "Longitude", "Rating"]);
        for a in Amenity::ALL {
            assert_eq!(names[a.feature_position()], a.name());
        }
        assert_eq!(names.last().map(String::as_str), Some("WiFi"));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(Amenity::from_name("Swimming pool"), Some(Amenity::SwimmingPool));
        assert_eq!(Amenity::from_name(" WiFi "), Some(Amenity::WiFi));
        assert_eq!(Amenity::from_name("Sauna"), None);
    }

    #[test]
    fn wrong_length_slice_is_rejected() {
        let err = FeatureVector::try_from(&[0.0f32; 4][..]).unwrap_err();
        assert!(err.to_string().contains("dimension"));
    }
}
