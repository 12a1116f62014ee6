//! Seat-level staffing model.
//!
//! A SeatRecord is the staffing unit of record, keyed by
//! (shift, unit, role, layer). PRIMARY seats belong to the shift's
//! effective unit; every other rotation unit carries SHADOW seats for the
//! same roles.

use crate::error::ScheduleError;
use crate::types::{PersonId, PlaceholderId, SeatRecordId, ShiftId, UnitId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatRole {
    Attendant,
    Driver,
}

impl SeatRole {
    pub const ALL: [SeatRole; 2] = [SeatRole::Attendant, SeatRole::Driver];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatRole::Attendant => "ATTENDANT",
            SeatRole::Driver => "DRIVER",
        }
    }
}

impl fmt::Display for SeatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatRole {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATTENDANT" => Ok(SeatRole::Attendant),
            "DRIVER" => Ok(SeatRole::Driver),
            other => Err(ScheduleError::InvalidInput(format!(
                "unknown seat role '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    Primary,
    Shadow,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Primary => "PRIMARY",
            Layer::Shadow => "SHADOW",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRIMARY" => Ok(Layer::Primary),
            "SHADOW" => Ok(Layer::Shadow),
            other => Err(ScheduleError::InvalidInput(format!(
                "unknown seat layer '{other}'"
            ))),
        }
    }
}

/// Seat health. UNFILLED/FILLED track staffing state; the color values
/// are used when a seat is annotated with a risk verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Unfilled,
    Filled,
    Green,
    Yellow,
    Red,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Unfilled => "UNFILLED",
            HealthStatus::Filled => "FILLED",
            HealthStatus::Green => "GREEN",
            HealthStatus::Yellow => "YELLOW",
            HealthStatus::Red => "RED",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "UNFILLED" => Ok(HealthStatus::Unfilled),
            "FILLED" => Ok(HealthStatus::Filled),
            "GREEN" => Ok(HealthStatus::Green),
            "YELLOW" => Ok(HealthStatus::Yellow),
            "RED" => Ok(HealthStatus::Red),
            other => Err(ScheduleError::InvalidInput(format!(
                "unknown health status '{other}'"
            ))),
        }
    }
}

/// Who holds a seat. The tagged variant makes an inconsistent
/// (entity type, id) pair unrepresentable; the store maps this to the
/// legacy three-column form at the SQL boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assignment {
    Unassigned,
    Person { person_id: PersonId },
    Placeholder { placeholder_id: PlaceholderId },
}

impl Assignment {
    pub fn person(person_id: impl Into<PersonId>) -> Self {
        Assignment::Person {
            person_id: person_id.into(),
        }
    }

    /// Placeholder assignment; the id is canonicalized on construction so
    /// textual variants of the same name collapse before any comparison.
    pub fn placeholder(raw_id: &str) -> Self {
        Assignment::Placeholder {
            placeholder_id: canonical_placeholder_id(raw_id),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Assignment::Unassigned)
    }

    pub fn entity_type(&self) -> &'static str {
        match self {
            Assignment::Unassigned => "NONE",
            Assignment::Person { .. } => "PERSON",
            Assignment::Placeholder { .. } => "PLACEHOLDER",
        }
    }

    pub fn person_id(&self) -> Option<&str> {
        match self {
            Assignment::Person { person_id } => Some(person_id),
            _ => None,
        }
    }

    pub fn placeholder_id(&self) -> Option<&str> {
        match self {
            Assignment::Placeholder { placeholder_id } => Some(placeholder_id),
            _ => None,
        }
    }

    /// Rebuild from the legacy column triplet. Imports wrote a few
    /// sentinel spellings for "empty"; all of them map to Unassigned, as
    /// does a typed row whose id column is missing.
    pub fn from_columns(
        entity_type: &str,
        person_id: Option<String>,
        placeholder_id: Option<String>,
    ) -> Assignment {
        match entity_type.trim().to_ascii_uppercase().as_str() {
            "PERSON" => person_id
                .filter(|p| !p.trim().is_empty())
                .map(|person_id| Assignment::Person { person_id })
                .unwrap_or(Assignment::Unassigned),
            "PLACEHOLDER" => placeholder_id
                .filter(|p| !p.trim().is_empty())
                .map(|placeholder_id| Assignment::Placeholder { placeholder_id })
                .unwrap_or(Assignment::Unassigned),
            _ => Assignment::Unassigned,
        }
    }
}

/// The staffing unit of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub seat_record_id: SeatRecordId,
    pub shift_id: ShiftId,
    pub unit_id: UnitId,
    pub role: SeatRole,
    pub layer: Layer,
    pub assignment: Assignment,
    pub health: HealthStatus,
    pub note: Option<String>,
}

impl SeatRecord {
    /// Deterministic seat id. Re-materializing the same seat collides by
    /// primary key instead of duplicating.
    pub fn id_for(shift_id: &str, unit_id: &str, role: SeatRole, layer: Layer) -> SeatRecordId {
        format!("{shift_id}__{layer}__{unit_id}__{role}")
    }

    /// A fresh, unstaffed seat as materialized by week generation.
    pub fn unfilled(shift_id: &str, unit_id: &str, role: SeatRole, layer: Layer) -> Self {
        SeatRecord {
            seat_record_id: Self::id_for(shift_id, unit_id, role, layer),
            shift_id: shift_id.to_string(),
            unit_id: unit_id.to_string(),
            role,
            layer,
            assignment: Assignment::Unassigned,
            health: HealthStatus::Unfilled,
            note: None,
        }
    }
}

/// Normalize a placeholder identifier to its canonical form: `PH_` prefix,
/// uppercase, whitespace and punctuation collapsed to single underscores.
/// "Fire Division", "PH_fire-division" and "FIRE_DIVISION" all map to
/// "PH_FIRE_DIVISION".
pub fn canonical_placeholder_id(raw: &str) -> PlaceholderId {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let tail = trimmed
        .strip_prefix("PH_")
        .or_else(|| trimmed.strip_prefix("ph_"))
        .unwrap_or(trimmed);

    let mut out = String::with_capacity(tail.len());
    for ch in tail.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_uppercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    format!("PH_{out}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_variants_collapse_to_one_id() {
        for raw in ["Fire Division", "FIRE_DIVISION", "PH_Fire   Division", "fire-division"] {
            assert_eq!(canonical_placeholder_id(raw), "PH_FIRE_DIVISION", "raw={raw}");
        }
    }

    #[test]
    fn seat_id_is_deterministic() {
        let id = SeatRecord::id_for("WEEK_X__D0__DAY", "AMB121", SeatRole::Driver, Layer::Primary);
        assert_eq!(id, "WEEK_X__D0__DAY__PRIMARY__AMB121__DRIVER");
    }

    #[test]
    fn inconsistent_columns_fall_back_to_unassigned() {
        let a = Assignment::from_columns("PERSON", None, Some("PH_X".into()));
        assert!(a.is_unassigned());
        let b = Assignment::from_columns("UNASSIGNED", Some("p1".into()), None);
        assert!(b.is_unassigned());
    }
}
