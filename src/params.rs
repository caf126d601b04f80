use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Brute force over every row.
    #[default]
    Exact,
    /// HNSW graph candidates, re-scored exactly.
    Hnsw,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Params {
    pub backend: Backend,
    pub ef_construction: usize,
    pub ef_search: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            backend: Backend::Exact,
            ef_construction: 200,
            ef_search: 50,
        }
    }
}
