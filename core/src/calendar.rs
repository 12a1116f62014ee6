//! Weekly shift calendar generation.
//!
//! A week is a fixed 7-day period starting on the configured weekday,
//! carrying 14 twelve-hour shifts (DAY 06-18, NIGHT 18-06 into the next
//! calendar day). Every id here is a pure function of the inputs, so
//! re-running generation collides by primary key instead of duplicating
//! rows.

use crate::config::ScheduleConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::seat::{Layer, SeatRecord, SeatRole};
use crate::store::ScheduleStore;
use crate::types::{DayIndex, ShiftId, UnitId, WeekId};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SHIFTS_PER_WEEK: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Slot {
    Day,
    Night,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Day, Slot::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Day => "DAY",
            Slot::Night => "NIGHT",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" => Ok(Slot::Day),
            "NIGHT" => Ok(Slot::Night),
            other => Err(ScheduleError::InvalidInput(format!(
                "unknown shift slot '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekStatus {
    Draft,
    Locked,
    Archived,
}

impl WeekStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStatus::Draft => "DRAFT",
            WeekStatus::Locked => "LOCKED",
            WeekStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for WeekStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekStatus {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(WeekStatus::Draft),
            "LOCKED" => Ok(WeekStatus::Locked),
            "ARCHIVED" => Ok(WeekStatus::Archived),
            other => Err(ScheduleError::InvalidInput(format!(
                "unknown week status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    pub week_id: WeekId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lock_at: NaiveDateTime,
    pub first_out_default_unit_id: UnitId,
    pub status: WeekStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub shift_id: ShiftId,
    pub week_id: WeekId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: String,
    pub day_index: DayIndex,
    pub slot: Slot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftConfig {
    pub shift_id: ShiftId,
    pub staffed_unit_id: UnitId,
    pub first_out_override_unit_id: Option<UnitId>,
    pub salary_only: bool,
    pub active: bool,
}

impl ShiftConfig {
    /// A per-shift override always wins over the rotation default.
    pub fn effective_unit(&self) -> &UnitId {
        self.first_out_override_unit_id
            .as_ref()
            .unwrap_or(&self.staffed_unit_id)
    }
}

/// Deterministic week id from its date span.
pub fn week_id_for(start_date: NaiveDate) -> WeekId {
    let end = start_date + Duration::days(6);
    format!("WEEK_{}_to_{}", start_date, end)
}

/// Deterministic shift id within a week.
pub fn shift_id_for(week_id: &str, day_index: DayIndex, slot: Slot) -> ShiftId {
    format!("{week_id}__D{day_index}__{slot}")
}

/// Snap any date back to the start of its containing week.
pub fn week_start_for(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

/// Parse a `YYYY-MM-DD` date, rejecting malformed input before any write.
pub fn parse_date(s: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| ScheduleError::InvalidInput(format!("bad date '{s}': {e}")))
}

/// Everything a week materializes to: the week row, its 14 shifts, one
/// config per shift, and the full PRIMARY + SHADOW seat fan-out.
#[derive(Debug, Clone)]
pub struct WeekPlan {
    pub week: Week,
    pub shifts: Vec<Shift>,
    pub configs: Vec<ShiftConfig>,
    pub seats: Vec<SeatRecord>,
}

/// Generates weeks against the store.
pub struct WeekGenerator<'a> {
    store: &'a ScheduleStore,
    config: ScheduleConfig,
}

impl<'a> WeekGenerator<'a> {
    pub fn new(store: &'a ScheduleStore, config: ScheduleConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Pure materialization of a week. No store access.
    pub fn plan_week(&self, start_date: NaiveDate, first_out: &str) -> ScheduleResult<WeekPlan> {
        if !self.config.is_rotation_unit(first_out) {
            return Err(ScheduleError::UnknownUnit {
                unit_id: first_out.to_string(),
            });
        }

        let week_id = week_id_for(start_date);
        let end_date = start_date + Duration::days(6);
        let lock_at = (start_date - Duration::days(self.config.lock_lead_days))
            .and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());

        let week = Week {
            week_id: week_id.clone(),
            start_date,
            end_date,
            lock_at,
            first_out_default_unit_id: first_out.to_string(),
            status: WeekStatus::Draft,
        };

        let mut shifts = Vec::with_capacity(SHIFTS_PER_WEEK);
        let mut configs = Vec::with_capacity(SHIFTS_PER_WEEK);
        let mut seats = Vec::new();

        for day_index in 0..7u8 {
            let date = start_date + Duration::days(i64::from(day_index));
            for slot in Slot::ALL {
                let (start, end) = match slot {
                    Slot::Day => (
                        date.and_time(self.config.day_start),
                        date.and_time(self.config.day_end),
                    ),
                    Slot::Night => (
                        date.and_time(self.config.day_end),
                        (date + Duration::days(1)).and_time(self.config.day_start),
                    ),
                };
                let shift_id = shift_id_for(&week_id, day_index, slot);
                let label = format!(
                    "{} {slot} ({}-{})",
                    date.format("%a %m/%d"),
                    start.format("%H"),
                    end.format("%H"),
                );

                shifts.push(Shift {
                    shift_id: shift_id.clone(),
                    week_id: week_id.clone(),
                    start,
                    end,
                    label,
                    day_index,
                    slot,
                });
                configs.push(ShiftConfig {
                    shift_id: shift_id.clone(),
                    staffed_unit_id: first_out.to_string(),
                    first_out_override_unit_id: None,
                    salary_only: false,
                    active: true,
                });

                for unit_id in &self.config.rotation_units {
                    let layer = if unit_id == first_out {
                        Layer::Primary
                    } else {
                        Layer::Shadow
                    };
                    for role in SeatRole::ALL {
                        seats.push(SeatRecord::unfilled(&shift_id, unit_id, role, layer));
                    }
                }
            }
        }

        Ok(WeekPlan {
            week,
            shifts,
            configs,
            seats,
        })
    }

    /// Strict generation: errors with `WeekExists` when the deterministic
    /// id is already present. All rows are written in one transaction.
    pub fn generate_week(&self, start_date: NaiveDate, first_out: &str) -> ScheduleResult<Week> {
        let plan = self.plan_week(start_date, first_out)?;
        if self.store.week(&plan.week.week_id)?.is_some() {
            return Err(ScheduleError::WeekExists {
                week_id: plan.week.week_id.clone(),
            });
        }
        self.store.insert_week_plan(&plan)?;
        log::info!(
            "week {} generated: {} shifts, {} seats",
            plan.week.week_id,
            plan.shifts.len(),
            plan.seats.len()
        );
        Ok(plan.week)
    }

    /// Idempotent generation: creates only the rows that are missing and
    /// never alters existing assignment fields, health, or notes.
    pub fn ensure_week(&self, start_date: NaiveDate, first_out: &str) -> ScheduleResult<Week> {
        let plan = self.plan_week(start_date, first_out)?;
        let created = self.store.ensure_week_plan(&plan)?;
        if created.any() {
            log::info!(
                "week {} ensured: +{} weeks, +{} shifts, +{} configs, +{} seats",
                plan.week.week_id,
                created.weeks,
                created.shifts,
                created.configs,
                created.seats
            );
        }
        self.store
            .week(&plan.week.week_id)?
            .ok_or(ScheduleError::WeekNotFound {
                week_id: plan.week.week_id.clone(),
            })
    }
}
