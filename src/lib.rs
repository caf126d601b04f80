//! Hotel recommendations by k-nearest-neighbor search.
//!
//! A query location is geocoded, combined with a star rating and amenity
//! choices into a [`FeatureVector`], matched against a [`ReferenceIndex`] of
//! hotels, and the neighbors are resolved back to [`HotelRecord`]s.

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod geocoder;
pub mod index;
pub mod metrics;
pub mod params;
pub mod recommend;
pub mod resolver;
pub mod schema;
pub mod state;
pub mod storage;
pub mod types;

pub use config::Settings;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use geocoder::{Geocoder, GeocoderConfig, NominatimGeocoder, StaticGeocoder};
pub use index::ReferenceIndex;
pub use metrics::Metric;
pub use params::{Backend, Params};
pub use recommend::{RecommendRequest, Recommendation, Recommender};
pub use resolver::{resolve, RankedHotel};
pub use schema::{Amenity, FeatureVector, FEATURE_DIM};
pub use state::ReferenceState;
pub use types::{Coordinate, HotelCode, HotelRecord, Neighbor, QueryResult, Rating};
