//! Shared primitive types used across the scheduling core.

/// Deterministic week identifier, `WEEK_{start}_to_{end}`.
pub type WeekId = String;

/// Deterministic shift identifier, `{week_id}__D{day_index}__{slot}`.
pub type ShiftId = String;

/// Deterministic seat-record identifier,
/// `{shift_id}__{layer}__{unit_id}__{role}`.
pub type SeatRecordId = String;

/// Operational unit identifier (e.g. "AMB121").
pub type UnitId = String;

/// Roster person identifier.
pub type PersonId = String;

/// Canonical placeholder identifier (`PH_*` form).
pub type PlaceholderId = String;

/// Day offset within a week, 0..=6 from the week's start date.
pub type DayIndex = u8;
