use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::features;
use crate::geocoder::Geocoder;
use crate::resolver::{resolve, RankedHotel};
use crate::schema::FeatureVector;
use crate::state::{self, ReferenceState};
use crate::types::{Coordinate, QueryResult, Rating};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecommendRequest {
    pub city: String,
    pub state: String,
    pub rating: i64,
    pub amenities: Vec<String>,
    pub k: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct Recommendation {
    pub location: Coordinate,
    pub vector: FeatureVector,
    /// Every neighbor the index returned, including dangling ones.
    pub neighbors: QueryResult,
    pub hotels: Vec<RankedHotel>,
}

impl Recommendation {
    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }

    pub fn top(&self, n: usize) -> &[RankedHotel] {
        &self.hotels[..n.min(self.hotels.len())]
    }

    /// Hotels that can be placed on a map.
    pub fn mappable(&self) -> impl Iterator<Item = &RankedHotel> {
        self.hotels.iter().filter(|h| h.hotel.is_mappable())
    }
}

/// Runs one query end to end: geocode, encode, retrieve, resolve.
pub struct Recommender<'a, G> {
    state: &'a ReferenceState,
    geocoder: G,
}

impl<'a, G: Geocoder> Recommender<'a, G> {
    pub fn new(state: &'a ReferenceState, geocoder: G) -> Self {
        Self { state, geocoder }
    }

    pub fn recommend(&self, req: &RecommendRequest) -> Result<Recommendation> {
        Rating::new(req.rating)?;
        if req.k == 0 {
            return Err(Error::InvalidInput("k must be greater than zero".into()));
        }
        let location = self.geocoder.resolve(&req.city, &req.state)?;
        let vector = features::build(location, req.rating, &req.amenities)?;
        let neighbors = self.state.index().query(&vector, req.k)?;
        let hotels = resolve(self.state.dataset(), &neighbors);
        info!(
            city = %req.city,
            state = %req.state,
            neighbors = neighbors.len(),
            hotels = hotels.len(),
            "recommendation ready"
        );
        Ok(Recommendation {
            location,
            vector,
            neighbors,
            hotels,
        })
    }
}

impl<G: Geocoder> Recommender<'static, G> {
    /// Uses the process-wide state installed by [`state::init`].
    pub fn from_shared(geocoder: G) -> Result<Self> {
        Ok(Self::new(state::shared()?, geocoder))
    }
}
