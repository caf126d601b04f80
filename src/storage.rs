use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::index::ReferenceIndex;
use crate::metrics::Metric;
use crate::params::Params;
use crate::schema::{feature_names, FeatureVector, FEATURE_DIM};
use crate::types::HotelCode;

pub const MAGIC: [u8; 4] = *b"HKNN";
pub const VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u8,
    pub metric: Metric,
    pub dim: u32,
    pub features: Vec<String>,
    pub rows: u64,
}

#[derive(Serialize, Deserialize)]
pub struct StoredRow {
    pub code: HotelCode,
    pub vector: Vec<f32>,
}

/// Writes the index as a model artifact: header, then one row per entry in row order.
pub fn save<P: AsRef<Path>>(index: &ReferenceIndex, path: P) -> Result<()> {
    let path = path.as_ref();
    let header = Header {
        magic: MAGIC,
        version: VERSION,
        metric: Metric::Euclidean,
        dim: FEATURE_DIM as u32,
        features: feature_names(),
        rows: index.len() as u64,
    };
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, &header)?;
    for (code, vector) in index.codes().iter().zip(index.rows()) {
        let row = StoredRow {
            code: code.clone(),
            vector: vector.as_slice().to_vec(),
        };
        bincode::serialize_into(&mut writer, &row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = index.len(), "saved model artifact");
    Ok(())
}

/// Loads an artifact written by [`save`], rejecting any schema drift.
pub fn load<P: AsRef<Path>>(path: P, params: Params) -> Result<ReferenceIndex> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let header: Header = bincode::deserialize_from(&mut reader)?;
    if header.magic != MAGIC {
        return Err(Error::Artifact("invalid magic".into()));
    }
    if header.version != VERSION {
        return Err(Error::Artifact(format!(
            "unsupported version {}",
            header.version
        )));
    }
    let expected = feature_names();
    if header.features != expected {
        return Err(Error::SchemaMismatch {
            expected,
            found: header.features,
        });
    }
    if header.dim as usize != FEATURE_DIM {
        return Err(Error::DimensionMismatch {
            expected: FEATURE_DIM,
            found: header.dim as usize,
        });
    }
    // The row count is only a hint; a truncated file ends in a bincode error.
    let mut entries = Vec::with_capacity(header.rows.min(4096) as usize);
    for _ in 0..header.rows {
        let row: StoredRow = bincode::deserialize_from(&mut reader)?;
        let vector = FeatureVector::try_from(row.vector.as_slice())?;
        entries.push((row.code, vector));
    }
    info!(path = %path.display(), rows = entries.len(), "loaded model artifact");
    Ok(ReferenceIndex::from_rows(entries, params))
}
