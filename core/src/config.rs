//! Explicit configuration for the scheduling core.
//!
//! RULE: no unit lists, lock lead times, or default units are hardcoded
//! in domain logic. Everything an operator might tune lives here and is
//! passed into the generators/engines at construction time.

use crate::error::{ScheduleError, ScheduleResult};
use crate::types::{PlaceholderId, UnitId};
use anyhow::Context;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scheduling calendar and rotation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Ordered rotation list; index 0 is first in the round-robin.
    pub rotation_units: Vec<UnitId>,
    /// Designated week-start weekday.
    #[serde(default = "default_week_start")]
    pub week_start: Weekday,
    /// Days before week start at which the week locks (at 00:00).
    #[serde(default = "default_lock_lead_days")]
    pub lock_lead_days: i64,
    /// DAY slot boundaries; NIGHT runs from `day_end` to `day_start` + 1d.
    #[serde(default = "default_day_start")]
    pub day_start: NaiveTime,
    #[serde(default = "default_day_end")]
    pub day_end: NaiveTime,
    /// Note marker that identifies authoritative imported history.
    /// Matching is by substring, so a prefix recognizes a tag family.
    #[serde(default = "default_history_tag")]
    pub history_tag: String,
}

fn default_week_start() -> Weekday {
    Weekday::Thu
}

fn default_lock_lead_days() -> i64 {
    28
}

fn default_day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(6, 0, 0).unwrap()
}

fn default_day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap()
}

fn default_history_tag() -> String {
    "HISTORY_".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rotation_units: vec!["AMB120".into(), "AMB121".into(), "AMB131".into()],
            week_start: default_week_start(),
            lock_lead_days: default_lock_lead_days(),
            day_start: default_day_start(),
            day_end: default_day_end(),
            history_tag: default_history_tag(),
        }
    }
}

impl ScheduleConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schedule config {}", path.display()))?;
        let config: ScheduleConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse schedule config {}", path.display()))?;
        config.validate().map_err(anyhow::Error::from)?;
        Ok(config)
    }

    pub fn validate(&self) -> ScheduleResult<()> {
        if self.rotation_units.is_empty() {
            return Err(ScheduleError::InvalidInput(
                "rotation_units must not be empty".into(),
            ));
        }
        if self.lock_lead_days < 0 {
            return Err(ScheduleError::InvalidInput(format!(
                "lock_lead_days must be non-negative (got {})",
                self.lock_lead_days
            )));
        }
        Ok(())
    }

    pub fn is_rotation_unit(&self, unit_id: &str) -> bool {
        self.rotation_units.iter().any(|u| u == unit_id)
    }
}

/// Policy knobs for the fragility radar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadarPolicy {
    /// Count ops-qualified people without EMT-or-higher certification as
    /// driver candidates.
    #[serde(default)]
    pub allow_nonmedical_driver: bool,
}

/// Backfill rules for PRIMARY driver seats left empty.
///
/// `None` for a day class means no rule applies and the seat is left
/// unfilled (reported as pending, never guessed).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillPolicy {
    #[serde(default)]
    pub weekday_driver: Option<PlaceholderId>,
    #[serde(default)]
    pub weekend_driver: Option<PlaceholderId>,
}
