//! Settings loader.
//!
//! Merges built-in defaults, an optional TOML file and `HOTEL_KNN_*`
//! environment variables (`__` separates nested keys, e.g.
//! `HOTEL_KNN_GEOCODER__TIMEOUT_SECS=5`).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geocoder::GeocoderConfig;
use crate::params::Params;

pub const DEFAULT_CONFIG_FILE: &str = "hotel-knn.toml";
pub const ENV_PREFIX: &str = "HOTEL_KNN_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    /// Neighbors retrieved per query.
    pub k: usize,
    /// Hotels shown in the text listing.
    pub display: usize,
    pub geocoder: GeocoderConfig,
    pub retrieval: Params,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("us_hotels_data.csv"),
            model_path: PathBuf::from("final_pipeline.knn"),
            k: 5,
            display: 3,
            geocoder: GeocoderConfig::default(),
            retrieval: Params::default(),
        }
    }
}

impl Settings {
    /// Reads `file` when given (it must exist), else `hotel-knn.toml` if present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "settings file {} not found",
                    path.display()
                )));
            }
        }
        let file = file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let settings: Settings = Self::figment(file)
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validate(self) -> Result<Self> {
        if self.k == 0 {
            return Err(Error::Config("k must be greater than zero".into()));
        }
        if self.geocoder.timeout_secs == 0 {
            return Err(Error::Config("geocoder.timeout_secs must be greater than zero".into()));
        }
        Ok(self)
    }
}
