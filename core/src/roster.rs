//! Read-only roster entities.
//!
//! The roster (people, certifications, unit ops-capability) is owned by
//! an external ingestion path; the core only ever reads a snapshot of it.

use crate::error::ScheduleError;
use crate::types::{PersonId, PlaceholderId, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Medical certification ladder. Ordering matters: `>= Emt` is the
/// attendant eligibility floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertLevel {
    None,
    Emt,
    Aemt,
    Als,
    #[serde(alias = "MEDIC")]
    Paramedic,
}

impl CertLevel {
    pub fn is_emt_or_higher(&self) -> bool {
        *self >= CertLevel::Emt
    }

    /// ALS and PARAMEDIC both count as ALS-capable.
    pub fn is_als_capable(&self) -> bool {
        matches!(self, CertLevel::Als | CertLevel::Paramedic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CertLevel::None => "NONE",
            CertLevel::Emt => "EMT",
            CertLevel::Aemt => "AEMT",
            CertLevel::Als => "ALS",
            CertLevel::Paramedic => "PARAMEDIC",
        }
    }
}

impl fmt::Display for CertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertLevel {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(CertLevel::None),
            "EMT" => Ok(CertLevel::Emt),
            "AEMT" => Ok(CertLevel::Aemt),
            "ALS" => Ok(CertLevel::Als),
            "PARAMEDIC" | "MEDIC" => Ok(CertLevel::Paramedic),
            other => Err(ScheduleError::InvalidInput(format!(
                "unknown certification level '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub person_id: PersonId,
    pub display_name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_cert")]
    pub medical_cert: CertLevel,
    #[serde(default = "default_true")]
    pub willing_attend: bool,
}

fn default_true() -> bool {
    true
}

fn default_cert() -> CertLevel {
    CertLevel::None
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_id: UnitId,
    pub unit_label: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub placeholder_id: PlaceholderId,
    pub placeholder_label: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A point-in-time view of the roster: people plus the ops-capability
/// index. Built by the store (or by hand in tests); never mutated by the
/// core.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    pub people: Vec<Person>,
    ops_by_unit: HashMap<UnitId, HashSet<PersonId>>,
}

impl RosterSnapshot {
    pub fn new(people: Vec<Person>, ops: Vec<(PersonId, UnitId)>) -> Self {
        let mut ops_by_unit: HashMap<UnitId, HashSet<PersonId>> = HashMap::new();
        for (person_id, unit_id) in ops {
            ops_by_unit.entry(unit_id).or_default().insert(person_id);
        }
        Self { people, ops_by_unit }
    }

    pub fn can_operate(&self, person_id: &str, unit_id: &str) -> bool {
        self.ops_by_unit
            .get(unit_id)
            .map(|set| set.contains(person_id))
            .unwrap_or(false)
    }
}
