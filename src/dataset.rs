//! The static reference dataset of hotels.
//!
//! Loaded once from a CSV export with one row per hotel. Location and
//! coordinate columns are composite strings and are split here; malformed
//! coordinates leave the hotel unmappable instead of failing the load.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::schema::Amenity;
use crate::types::{Coordinate, HotelCode, HotelRecord, Rating};

pub const COL_LOCATION: &str = "cityName";
pub const COL_MAP: &str = "Map";
pub const COL_CODE: &str = "HotelCode";
pub const COL_NAME: &str = "HotelName";
pub const COL_ADDRESS: &str = "Address";
pub const COL_PHONE: &str = "PhoneNumber";
pub const COL_WEBSITE: &str = "HotelWebsiteUrl";
pub const COL_RATING: &str = "HotelRating";

pub struct Dataset {
    records: Vec<HotelRecord>,
    by_code: HashMap<HotelCode, usize>,
}

impl Dataset {
    /// Keeps the first record of each hotel code; later repeats are logged and dropped.
    pub fn from_records(rows: Vec<HotelRecord>) -> Self {
        let mut records = Vec::with_capacity(rows.len());
        let mut by_code = HashMap::with_capacity(rows.len());
        for r in rows {
            if by_code.contains_key(&r.code) {
                let e = Error::DuplicateHotelCode(r.code.clone());
                warn!(name = %r.name, "{e}, keeping the first record");
                continue;
            }
            by_code.insert(r.code.clone(), records.len());
            records.push(r);
        }
        Self { records, by_code }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path)?;
        let dataset = Self::read(reader)?;
        info!(path = %path.display(), hotels = dataset.len(), "loaded reference dataset");
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        Self::read(csv::Reader::from_reader(rdr))
    }

    fn read<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let code_col = column(COL_CODE)
            .ok_or_else(|| Error::InvalidInput(format!("dataset has no {COL_CODE} column")))?;
        let location_col = column(COL_LOCATION);
        let map_col = column(COL_MAP);
        let name_col = column(COL_NAME);
        let address_col = column(COL_ADDRESS);
        let phone_col = column(COL_PHONE);
        let website_col = column(COL_WEBSITE);
        let rating_col = column(COL_RATING);
        let amenity_cols: Vec<(Amenity, usize)> = Amenity::ALL
            .into_iter()
            .filter_map(|a| column(a.name()).map(|c| (a, c)))
            .collect();
        if amenity_cols.len() < Amenity::COUNT {
            warn!(
                found = amenity_cols.len(),
                expected = Amenity::COUNT,
                "dataset is missing amenity columns; treating them as absent"
            );
        }

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |col: Option<usize>| {
                col.and_then(|c| row.get(c))
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string()
            };
            let code = field(Some(code_col));
            if code.is_empty() {
                warn!(line = ?row.position().map(|p| p.line()), "skipping row without hotel code");
                continue;
            }
            let (city, state) = parse_location(&field(location_col));
            let map = field(map_col);
            let coordinate = parse_coordinate(&map);
            if coordinate.is_none() && !map.is_empty() {
                warn!(code = %code, map = %map, "unparseable coordinate, hotel is unmappable");
            }
            let amenities: BTreeSet<Amenity> = amenity_cols
                .iter()
                .filter(|(_, c)| row.get(*c).is_some_and(parse_flag))
                .map(|(a, _)| *a)
                .collect();
            records.push(HotelRecord {
                code: HotelCode(code),
                name: field(name_col),
                address: field(address_col),
                phone: field(phone_col),
                website: field(website_col),
                city,
                state,
                coordinate,
                rating: parse_rating(&field(rating_col)),
                amenities,
            });
        }
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[HotelRecord] {
        &self.records
    }

    pub fn get(&self, code: &HotelCode) -> Option<&HotelRecord> {
        self.by_code.get(code).map(|&i| &self.records[i])
    }

    /// Distinct states, sorted.
    pub fn states(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.records.iter().filter_map(|r| r.state.as_deref()).collect();
        set.into_iter().collect()
    }

    /// Distinct cities within `state`, sorted.
    pub fn cities(&self, state: &str) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .records
            .iter()
            .filter(|r| r.state.as_deref() == Some(state))
            .filter_map(|r| r.city.as_deref())
            .collect();
        set.into_iter().collect()
    }
}

/// Splits `"<city>, <state>"`. Parts beyond the second are dropped.
pub fn parse_location(s: &str) -> (Option<String>, Option<String>) {
    let mut parts = s.split(',').map(str::trim);
    let non_empty = |p: Option<&str>| p.filter(|p| !p.is_empty()).map(str::to_string);
    let city = non_empty(parts.next());
    let state = non_empty(parts.next());
    (city, state)
}

/// Parses `"<lat>|<lon>"`. Anything malformed or out of range yields `None`.
pub fn parse_coordinate(s: &str) -> Option<Coordinate> {
    let (lat, lon) = s.split_once('|')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    Coordinate::new(lat, lon).ok()
}

/// Accepts `1`..`5` as well as `OneStar`..`FiveStar` and `"Four Star"`.
pub fn parse_rating(s: &str) -> Option<Rating> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Rating::new(n).ok();
    }
    let word: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let word = word.strip_suffix("stars").or_else(|| word.strip_suffix("star"))?;
    let stars = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        _ => return None,
    };
    Rating::new(stars).ok()
}

fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "1.0" | "true" | "yes" | "y"
    )
}
