use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::dataset::Dataset;
use crate::error::Error;
use crate::types::{HotelRecord, Neighbor};

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct RankedHotel {
    pub rank: usize,
    pub distance: f32,
    pub hotel: HotelRecord,
}

/// Maps neighbors back to hotel records in rank order.
///
/// Codes with no record are logged and skipped; a code repeated in the input
/// resolves only at its first rank. Ranks are 1-based positions in the input.
pub fn resolve(dataset: &Dataset, result: &[Neighbor]) -> Vec<RankedHotel> {
    let mut seen = HashSet::with_capacity(result.len());
    let mut hotels = Vec::with_capacity(result.len());
    for (i, n) in result.iter().enumerate() {
        if !seen.insert(&n.code) {
            continue;
        }
        match dataset.get(&n.code) {
            Some(hotel) => hotels.push(RankedHotel {
                rank: i + 1,
                distance: n.distance,
                hotel: hotel.clone(),
            }),
            None => {
                let e = Error::DanglingReference(n.code.clone());
                warn!(rank = i + 1, "{e}");
            }
        }
    }
    hotels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(code: &str) -> HotelRecord {
        HotelRecord {
            code: code.into(),
            name: format!("Hotel {code}"),
            address: String::new(),
            phone: String::new(),
            website: String::new(),
            city: None,
            state: None,
            coordinate: None,
            rating: None,
            amenities: BTreeSet::new(),
        }
    }

    fn neighbor(code: &str, distance: f32) -> Neighbor {
        Neighbor {
            code: code.into(),
            distance,
        }
    }

    #[test]
    fn dangling_entries_are_skipped_in_order() {
        let ds = Dataset::from_records(vec![record("A"), record("C")]);
        let out = resolve(
            &ds,
            &[neighbor("A", 1.0), neighbor("B", 2.0), neighbor("C", 3.0)],
        );
        let codes: Vec<&str> = out.iter().map(|h| h.hotel.code.0.as_str()).collect();
        assert_eq!(codes, ["A", "C"]);
        assert_eq!(out[1].rank, 3);
        assert_eq!(out[1].distance, 3.0);
    }

    #[test]
    fn repeated_codes_resolve_once() {
        let ds = Dataset::from_records(vec![record("A"), record("B")]);
        let out = resolve(
            &ds,
            &[neighbor("B", 0.5), neighbor("A", 1.0), neighbor("B", 1.5)],
        );
        let codes: Vec<&str> = out.iter().map(|h| h.hotel.code.0.as_str()).collect();
        assert_eq!(codes, ["B", "A"]);
    }

    #[test]
    fn unmappable_hotels_stay_in_text_results() {
        let ds = Dataset::from_records(vec![record("A")]);
        let out = resolve(&ds, &[neighbor("A", 0.0)]);
        assert_eq!(out.len(), 1);
        assert!(!out[0].hotel.is_mappable());
    }
}
