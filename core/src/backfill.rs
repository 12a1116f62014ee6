//! Configurable driver backfill.
//!
//! When a week's PRIMARY driver seats are still empty close to lock, the
//! organization may cover them with a standing placeholder (historically
//! the fire division on weekdays). The rule differs by day class and is
//! pure configuration; a day class with no rule leaves the seat unfilled
//! and reports it as pending rather than guessing.

use crate::config::BackfillPolicy;
use crate::error::{ScheduleError, ScheduleResult};
use crate::seat::{Assignment, HealthStatus, Layer, SeatRole};
use crate::store::ScheduleStore;
use crate::types::ShiftId;
use chrono::{Datelike, Weekday};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub filled: usize,
    /// Shifts whose driver seat stays empty because no rule applied.
    pub pending: Vec<ShiftId>,
}

/// Fill empty PRIMARY driver seats across a week per the policy. Seats
/// that already carry an assignment are never touched.
pub fn apply_driver_backfill(
    store: &ScheduleStore,
    week_id: &str,
    policy: &BackfillPolicy,
) -> ScheduleResult<BackfillReport> {
    let week = store.week(week_id)?.ok_or(ScheduleError::WeekNotFound {
        week_id: week_id.to_string(),
    })?;

    let mut report = BackfillReport::default();
    for shift in store.shifts_for_week(week_id)? {
        let unit_id = match store.shift_config(&shift.shift_id)? {
            Some(config) => config.effective_unit().clone(),
            None => week.first_out_default_unit_id.clone(),
        };

        let seat = match store.seat(&shift.shift_id, &unit_id, SeatRole::Driver, Layer::Primary)? {
            Some(seat) => seat,
            None => continue, // seat never materialized; nothing to fill
        };
        if !seat.assignment.is_unassigned() {
            continue;
        }

        let weekend = matches!(shift.start.weekday(), Weekday::Sat | Weekday::Sun);
        let rule = if weekend {
            policy.weekend_driver.as_ref()
        } else {
            policy.weekday_driver.as_ref()
        };

        match rule {
            Some(placeholder_id) => {
                store.update_seat_assignment(
                    &seat.seat_record_id,
                    &Assignment::placeholder(placeholder_id),
                    HealthStatus::Filled,
                    seat.note.as_deref(),
                )?;
                report.filled += 1;
            }
            None => {
                log::warn!(
                    "shift {}: driver seat for {} left unfilled (no backfill rule for {})",
                    shift.shift_id,
                    unit_id,
                    if weekend { "weekends" } else { "weekdays" }
                );
                report.pending.push(shift.shift_id.clone());
            }
        }
    }

    Ok(report)
}
