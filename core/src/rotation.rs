//! First-out rotation.
//!
//! The rotation default is a per-week setting propagated onto each
//! shift's staffed unit. Which unit's seats read as PRIMARY is a
//! presentation-time computation (`ShiftConfig::effective_unit`), so
//! applying a rotation never rewrites in-progress staffing.

use crate::calendar::{week_id_for, WeekGenerator};
use crate::config::ScheduleConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::store::ScheduleStore;
use crate::types::{UnitId, WeekId};
use chrono::{Duration, NaiveDate};

pub struct RotationEngine<'a> {
    store: &'a ScheduleStore,
    config: ScheduleConfig,
}

impl<'a> RotationEngine<'a> {
    pub fn new(store: &'a ScheduleStore, config: ScheduleConfig) -> Self {
        Self { store, config }
    }

    /// Make `unit_id` the week's first-out: updates the week default and
    /// every shift's staffed unit in one transaction. Per-shift overrides
    /// and seat records are never touched.
    pub fn apply_first_out(&self, week_id: &str, unit_id: &str) -> ScheduleResult<usize> {
        if !self.config.is_rotation_unit(unit_id) {
            return Err(ScheduleError::UnknownUnit {
                unit_id: unit_id.to_string(),
            });
        }
        let updated = self.store.apply_first_out(week_id, unit_id)?;
        log::info!("week {week_id}: first-out set to {unit_id} ({updated} shifts)");
        Ok(updated)
    }

    /// Round-robin the rotation list over `weeks` consecutive weeks
    /// starting at `start_date`: week i gets `rotation[i % k]`. Missing
    /// weeks are materialized via the idempotent ensure path first.
    /// Returns the applied (week id, unit) sequence in order.
    pub fn apply_rotation(
        &self,
        start_date: NaiveDate,
        weeks: usize,
    ) -> ScheduleResult<Vec<(WeekId, UnitId)>> {
        self.config.validate()?;
        let generator = WeekGenerator::new(self.store, self.config.clone());
        let rotation = &self.config.rotation_units;
        let mut applied = Vec::with_capacity(weeks);

        for i in 0..weeks {
            let start = start_date + Duration::days(7 * i as i64);
            let unit_id = rotation[i % rotation.len()].clone();
            generator.ensure_week(start, &unit_id)?;
            self.apply_first_out(&week_id_for(start), &unit_id)?;
            applied.push((week_id_for(start), unit_id));
        }

        Ok(applied)
    }
}
