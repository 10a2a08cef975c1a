//! Copy-on-write holder of the current arm configuration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use std::sync::Arc;

use super::{ArmConfig, ArmConfigUpdate, ConfigError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Holds the current configuration as a shared snapshot.
///
/// Readers take a snapshot with [`ConfigStore::snapshot`] and keep it for the duration of their
/// computation. Applying an update replaces the snapshot as a whole, so a reader never observes a
/// half-applied configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    current: Arc<ArmConfig>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConfigStore {
    /// Create a store from a configuration, which must be valid.
    ///
    /// A playback period below the minimum is raised to it, as for updates.
    pub fn new(mut cfg: ArmConfig) -> Result<Self, ConfigError> {
        cfg.coerce_playback_period();
        cfg.validate()?;

        Ok(Self {
            current: Arc::new(cfg),
        })
    }

    /// Get the current configuration.
    pub fn snapshot(&self) -> Arc<ArmConfig> {
        self.current.clone()
    }

    /// Apply a partial update and make the result the current configuration.
    ///
    /// On error the current configuration is unchanged.
    pub fn apply(&mut self, update: &ArmConfigUpdate) -> Result<Arc<ArmConfig>, ConfigError> {
        let cfg = Arc::new(self.current.apply(update)?);
        self.current = cfg.clone();

        info!("New arm configuration applied");

        Ok(cfg)
    }
}
