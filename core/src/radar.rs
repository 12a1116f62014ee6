//! Fragility radar — staffing-risk assessment against a live roster.
//!
//! A read-only projection: given the roster as it stands right now, who
//! could cover each seat role on a shift, and how fragile is that pool.
//! Nothing here mutates shift or seat state.

use crate::calendar::Shift;
use crate::config::RadarPolicy;
use crate::error::{ScheduleError, ScheduleResult};
use crate::roster::RosterSnapshot;
use crate::store::ScheduleStore;
use crate::types::{PersonId, UnitId};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RadarStatus {
    Green,
    Yellow,
    Red,
}

impl RadarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadarStatus::Green => "GREEN",
            RadarStatus::Yellow => "YELLOW",
            RadarStatus::Red => "RED",
        }
    }
}

impl fmt::Display for RadarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every condition that contributed to the verdict. A shift can be RED
/// for several independent reasons at once; all of them are reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RadarReason {
    NoAttendantCandidates,
    NoDriverCandidates { unit_id: UnitId },
    NoAlsAttendant,
    FragileAttendantPool,
    FragileDriverPool,
}

impl RadarReason {
    fn severity(&self) -> RadarStatus {
        match self {
            RadarReason::NoAttendantCandidates | RadarReason::NoDriverCandidates { .. } => {
                RadarStatus::Red
            }
            _ => RadarStatus::Yellow,
        }
    }
}

impl fmt::Display for RadarReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadarReason::NoAttendantCandidates => write!(f, "No attendant candidates"),
            RadarReason::NoDriverCandidates { unit_id } => {
                write!(f, "No driver candidates with {unit_id} ops")
            }
            RadarReason::NoAlsAttendant => write!(f, "No ALS available for attendant"),
            RadarReason::FragileAttendantPool => {
                write!(f, "Fragile: only 1 attendant candidate")
            }
            RadarReason::FragileDriverPool => write!(f, "Fragile: only 1 driver candidate"),
        }
    }
}

/// The eligibility verdict for one shift.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftEvaluation {
    pub unit_id: UnitId,
    pub attendant_pool: Vec<PersonId>,
    pub driver_pool: Vec<PersonId>,
    pub als_capable_count: usize,
    pub status: RadarStatus,
    pub reasons: Vec<RadarReason>,
}

/// Evaluate staffing risk for a shift whose effective unit is `unit_id`.
/// Pure function of its inputs.
pub fn evaluate(unit_id: &str, roster: &RosterSnapshot, policy: &RadarPolicy) -> ShiftEvaluation {
    // Attendant = active + willing + EMT or higher.
    let attendant_pool: Vec<PersonId> = roster
        .people
        .iter()
        .filter(|p| p.active && p.willing_attend && p.medical_cert.is_emt_or_higher())
        .map(|p| p.person_id.clone())
        .collect();

    let als_capable_count = roster
        .people
        .iter()
        .filter(|p| p.active && p.willing_attend && p.medical_cert.is_als_capable())
        .count();

    // Driver = active + unit ops; EMT+ unless policy relaxes it.
    let driver_pool: Vec<PersonId> = roster
        .people
        .iter()
        .filter(|p| p.active && roster.can_operate(&p.person_id, unit_id))
        .filter(|p| policy.allow_nonmedical_driver || p.medical_cert.is_emt_or_higher())
        .map(|p| p.person_id.clone())
        .collect();

    let mut reasons = Vec::new();
    if attendant_pool.is_empty() {
        reasons.push(RadarReason::NoAttendantCandidates);
    }
    if driver_pool.is_empty() {
        reasons.push(RadarReason::NoDriverCandidates {
            unit_id: unit_id.to_string(),
        });
    }
    if !attendant_pool.is_empty() && als_capable_count == 0 {
        reasons.push(RadarReason::NoAlsAttendant);
    }
    if attendant_pool.len() == 1 {
        reasons.push(RadarReason::FragileAttendantPool);
    }
    if driver_pool.len() == 1 {
        reasons.push(RadarReason::FragileDriverPool);
    }

    let status = reasons
        .iter()
        .map(RadarReason::severity)
        .max()
        .unwrap_or(RadarStatus::Green);

    ShiftEvaluation {
        unit_id: unit_id.to_string(),
        attendant_pool,
        driver_pool,
        als_capable_count,
        status,
        reasons,
    }
}

/// Evaluate every shift of a week against its effective unit. Shifts
/// without a config row fall back to the week's rotation default.
pub fn evaluate_week(
    store: &ScheduleStore,
    week_id: &str,
    roster: &RosterSnapshot,
    policy: &RadarPolicy,
) -> ScheduleResult<Vec<(Shift, ShiftEvaluation)>> {
    let week = store.week(week_id)?.ok_or(ScheduleError::WeekNotFound {
        week_id: week_id.to_string(),
    })?;

    let mut results = Vec::new();
    for shift in store.shifts_for_week(week_id)? {
        let unit_id = match store.shift_config(&shift.shift_id)? {
            Some(config) => config.effective_unit().clone(),
            None => week.first_out_default_unit_id.clone(),
        };
        let evaluation = evaluate(&unit_id, roster, policy);
        results.push((shift, evaluation));
    }
    Ok(results)
}
