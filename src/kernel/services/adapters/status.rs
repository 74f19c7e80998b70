use std::path::Path;

use crate::kernel::services::ports::StatusRefresher;
use crate::kernel::services::{EngineBusSender, EngineMessage};

/// Forwards refresh requests to the bus owner.
pub struct BusStatusRefresher {
    tx: EngineBusSender,
}

impl BusStatusRefresher {
    pub fn new(tx: EngineBusSender) -> Self {
        Self { tx }
    }
}

impl StatusRefresher for BusStatusRefresher {
    fn refresh(&self, path: &Path) {
        if self
            .tx
            .send(EngineMessage::StatusRefresh {
                path: path.to_path_buf(),
            })
            .is_err()
        {
            tracing::debug!(path = %path.display(), "status refresh dropped; bus closed");
        }
    }
}
