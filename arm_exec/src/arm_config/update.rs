//! Partial configuration updates

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::bus::ServoId;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{ArmConfig, ConfigError, ElbowBranch, NUM_JOINTS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A partial update of the arm configuration.
///
/// Fields which are `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfigUpdate {
    pub link1_length: Option<f64>,
    pub link2_length: Option<f64>,
    pub elbow: Option<ElbowBranch>,
    pub joint_ids: Option<[ServoId; NUM_JOINTS]>,
    pub zero_offset_deg: Option<[f64; NUM_JOINTS]>,
    pub min_pos_deg: Option<[f64; NUM_JOINTS]>,
    pub max_pos_deg: Option<[f64; NUM_JOINTS]>,
    pub playback_period_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmConfig {
    /// Apply a partial update, returning the new configuration.
    ///
    /// The update is all-or-nothing: if any field of the merged configuration is invalid the
    /// error names that field and `self` is left as the current configuration. The one exception
    /// is a playback period below the minimum, which is raised to the minimum.
    pub fn apply(&self, update: &ArmConfigUpdate) -> Result<ArmConfig, ConfigError> {
        let mut cfg = self.clone();

        if let Some(l) = update.link1_length {
            cfg.link1_length = l;
        }
        if let Some(l) = update.link2_length {
            cfg.link2_length = l;
        }
        if let Some(e) = update.elbow {
            cfg.elbow = e;
        }
        if let Some(ids) = update.joint_ids {
            cfg.joint_ids = ids;
        }
        if let Some(o) = update.zero_offset_deg {
            cfg.zero_offset_deg = o;
        }
        if let Some(m) = update.min_pos_deg {
            cfg.min_pos_deg = m;
        }
        if let Some(m) = update.max_pos_deg {
            cfg.max_pos_deg = m;
        }
        if let Some(p) = update.playback_period_ms {
            cfg.playback_period_ms = p;
            cfg.coerce_playback_period();
        }

        cfg.validate()?;

        debug!("Arm configuration updated: {:?}", cfg);

        Ok(cfg)
    }
}
