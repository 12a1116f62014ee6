//! shiftboard-core — shift/seat staffing model for a small
//! emergency-services organization.
//!
//! The core owns the weekly shift calendar, the seat-record model
//! (PRIMARY vs SHADOW layers), the first-out rotation, the seat-record
//! reconciliation policy, and the fragility radar. Reporting, roster
//! ingestion, and presentation live outside and talk to the store's read
//! accessors.
//!
//! RULE: Only the store talks to the database. Domain modules call store
//! methods — they never execute SQL directly.

pub mod backfill;
pub mod calendar;
pub mod config;
pub mod error;
pub mod radar;
pub mod reconciler;
pub mod roster;
pub mod rotation;
pub mod seat;
pub mod store;
pub mod types;

pub use calendar::{Shift, ShiftConfig, Week, WeekGenerator};
pub use config::{BackfillPolicy, RadarPolicy, ScheduleConfig};
pub use error::{ScheduleError, ScheduleResult};
pub use reconciler::SeatReconciler;
pub use rotation::RotationEngine;
pub use seat::{Assignment, SeatRecord};
pub use store::ScheduleStore;
