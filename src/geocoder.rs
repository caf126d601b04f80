//! Turns a `(city, state)` pair into a coordinate.
//!
//! This is the only networked step of a recommendation. Lookups are never
//! retried here: a transport failure surfaces as `ServiceUnavailable` and the
//! caller decides whether to try again.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Coordinate;

pub trait Geocoder {
    /// Resolves a place to a coordinate, or `GeocodeNotFound` when the service
    /// has no match.
    ///
    /// Ambiguous names take the service's top-ranked match, the same way the
    /// interactive form always has; callers wanting stricter matching should
    /// pass a more specific city or state.
    fn resolve(&self, city: &str, state: &str) -> Result<Coordinate>;
}

fn check_input(city: &str, state: &str) -> Result<()> {
    if city.trim().is_empty() || state.trim().is_empty() {
        return Err(Error::InvalidInput("city and state must not be empty".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "hotel-knn".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    search_url: Url,
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let base = config.endpoint.trim_end_matches('/');
        let search_url = Url::parse(&format!("{base}/search"))
            .map_err(|e| Error::Config(format!("invalid geocoder endpoint {base}: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { client, search_url })
    }
}

impl Geocoder for NominatimGeocoder {
    fn resolve(&self, city: &str, state: &str) -> Result<Coordinate> {
        check_input(city, state)?;
        let query = format!("{}, {}", city.trim(), state.trim());
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        debug!(%url, "geocoding");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::ServiceUnavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ServiceUnavailable(format!("geocoder returned {status}")));
        }
        let body = response
            .text()
            .map_err(|e| Error::ServiceUnavailable(e.to_string()))?;
        parse_search_response(&body)?.ok_or_else(|| Error::GeocodeNotFound {
            city: city.to_string(),
            state: state.to_string(),
        })
    }
}

/// Reads the first place from a search response. An empty list means no match.
fn parse_search_response(body: &str) -> Result<Option<Coordinate>> {
    let places: Vec<Place> = serde_json::from_str(body)
        .map_err(|e| Error::ServiceUnavailable(format!("malformed geocoder response: {e}")))?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| Error::ServiceUnavailable(format!("malformed coordinate {s:?}: {e}")))
    };
    let coordinate = Coordinate::new(parse(&place.lat)?, parse(&place.lon)?)
        .map_err(|e| Error::ServiceUnavailable(e.to_string()))?;
    Ok(Some(coordinate))
}

/// Fixed lookup table, matched case-insensitively. Used offline and in tests.
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    places: HashMap<(String, String), Coordinate>,
    offline: bool,
}

fn key(city: &str, state: &str) -> (String, String) {
    (city.trim().to_lowercase(), state.trim().to_lowercase())
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A geocoder whose service is always down.
    pub fn offline() -> Self {
        Self {
            places: HashMap::new(),
            offline: true,
        }
    }

    pub fn with_place(mut self, city: &str, state: &str, coordinate: Coordinate) -> Self {
        self.places.insert(key(city, state), coordinate);
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn resolve(&self, city: &str, state: &str) -> Result<Coordinate> {
        check_input(city, state)?;
        if self.offline {
            return Err(Error::ServiceUnavailable("geocoder offline".into()));
        }
        self.places
            .get(&key(city, state))
            .copied()
            .ok_or_else(|| Error::GeocodeNotFound {
                city: city.to_string(),
                state: state.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_place() {
        let body = r#"[{"lat":"42.3554334","lon":"-71.060511","display_name":"Boston"},
                       {"lat":"1.0","lon":"2.0"}]"#;
        let c = parse_search_response(body).unwrap().unwrap();
        assert_eq!(c, Coordinate { latitude: 42.3554334, longitude: -71.060511 });
    }

    #[test]
    fn empty_response_is_no_match() {
        assert_eq!(parse_search_response("[]").unwrap(), None);
    }

    #[test]
    fn garbage_response_is_a_service_failure() {
        let err = parse_search_response("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }

    #[test]
    fn unreachable_service_is_not_a_miss() {
        let config = GeocoderConfig {
            endpoint: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            ..GeocoderConfig::default()
        };
        let geocoder = NominatimGeocoder::new(&config).unwrap();
        let err = geocoder.resolve("Boston", "MA").unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }

    #[test]
    fn static_lookup() {
        let boston = Coordinate::new(42.36, -71.06).unwrap();
        let g = StaticGeocoder::new().with_place("Boston", "MA", boston);
        assert_eq!(g.resolve(" boston ", "ma").unwrap(), boston);
        assert!(matches!(
            g.resolve("Springfield", "ZZ"),
            Err(Error::GeocodeNotFound { .. })
        ));
        assert!(matches!(g.resolve("", "MA"), Err(Error::InvalidInput(_))));
        assert!(matches!(
            StaticGeocoder::offline().resolve("Boston", "MA"),
            Err(Error::ServiceUnavailable(_))
        ));
    }
}
