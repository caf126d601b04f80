//! Process-wide reference state: the dataset and its index, set once at startup.

use std::sync::OnceLock;

use tracing::info;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::index::ReferenceIndex;

pub struct ReferenceState {
    dataset: Dataset,
    index: ReferenceIndex,
}

impl ReferenceState {
    pub fn new(dataset: Dataset, index: ReferenceIndex) -> Self {
        Self { dataset, index }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }
}

static STATE: OnceLock<ReferenceState> = OnceLock::new();

/// Installs the shared state. Fails if it was already installed.
pub fn init(dataset: Dataset, index: ReferenceIndex) -> Result<&'static ReferenceState> {
    let mut fresh = false;
    let state = STATE.get_or_init(|| {
        fresh = true;
        ReferenceState::new(dataset, index)
    });
    if !fresh {
        return Err(Error::AlreadyInitialized);
    }
    info!(
        hotels = state.dataset.len(),
        rows = state.index.len(),
        "reference state initialized"
    );
    Ok(state)
}

pub fn shared() -> Result<&'static ReferenceState> {
    STATE.get().ok_or(Error::IndexNotLoaded)
}
