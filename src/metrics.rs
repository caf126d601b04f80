use serde::{Deserialize, Serialize};
use space::Metric as SpaceMetric;

use crate::schema::FeatureVector;

/// Distance metric the index is fitted with. Persisted in the artifact header.
///
/// Features are compared on their raw scale: degrees of latitude and longitude
/// sit next to a 1-5 rating and 0/1 amenity flags, with no normalization.
#[repr(u8)]
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Metric {
    Euclidean = 2,
}

pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

#[derive(Clone, Copy, Default)]
pub struct EuclideanMetric;

// Distances are non-negative, so their IEEE bit patterns order like the values.
impl SpaceMetric<FeatureVector> for EuclideanMetric {
    type Unit = u32;
    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> Self::Unit {
        euclidean(a.as_slice(), b.as_slice()).to_bits()
    }
}
