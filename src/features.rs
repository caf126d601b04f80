use std::collections::BTreeSet;

use tracing::debug;

use crate::error::Result;
use crate::schema::{Amenity, FeatureVector, FEATURE_DIM, LATITUDE, LONGITUDE, RATING};
use crate::types::{Coordinate, HotelRecord, Rating};

/// Builds a query vector. Unknown amenity names are ignored.
pub fn build<I, S>(coordinate: Coordinate, rating: i64, amenities: I) -> Result<FeatureVector>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let rating = Rating::new(rating)?;
    let coordinate = Coordinate::new(coordinate.latitude, coordinate.longitude)?;
    let mut selected = BTreeSet::new();
    for name in amenities {
        match Amenity::from_name(name.as_ref()) {
            Some(a) => {
                selected.insert(a);
            }
            None => debug!(amenity = name.as_ref(), "ignoring unknown amenity"),
        }
    }
    Ok(encode(coordinate, rating, &selected))
}

/// Encodes a dataset row. Rows without a coordinate or rating cannot be placed.
pub fn encode_record(record: &HotelRecord) -> Option<FeatureVector> {
    Some(encode(record.coordinate?, record.rating?, &record.amenities))
}

fn encode(coordinate: Coordinate, rating: Rating, amenities: &BTreeSet<Amenity>) -> FeatureVector {
    let mut values = [0.0f32; FEATURE_DIM];
    values[LATITUDE] = coordinate.latitude as f32;
    values[LONGITUDE] = coordinate.longitude as f32;
    values[RATING] = f32::from(rating.stars());
    for a in amenities {
        values[a.feature_position()] = 1.0;
    }
    FeatureVector::from_array(values)
}
