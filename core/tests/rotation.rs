//! Integration tests for the first-out rotation engine.
//!
//! Covered behaviours:
//! 1. apply_first_out updates the week default and every shift's staffed
//!    unit, and nothing else
//! 2. Per-shift overrides always win over the rotation default
//! 3. Seat records survive rotation changes untouched
//! 4. NotFound / unknown-unit errors abort with no partial writes
//! 5. Four consecutive weeks round-robin with wraparound

use chrono::NaiveDate;
use shiftboard_core::{
    calendar::week_id_for,
    seat::{Assignment, HealthStatus, Layer, SeatRole},
    RotationEngine, ScheduleConfig, ScheduleError, ScheduleStore, WeekGenerator,
};

fn build_store() -> ScheduleStore {
    let store = ScheduleStore::in_memory().expect("in_memory failed");
    store.migrate().expect("migrate failed");
    store
}

fn dec4() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 4).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests 1-3: apply_first_out semantics
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn apply_first_out_updates_default_and_all_shifts() {
    let store = build_store();
    let config = ScheduleConfig::default();
    let generator = WeekGenerator::new(&store, config.clone());
    let engine = RotationEngine::new(&store, config);

    let week = generator.generate_week(dec4(), "AMB121").unwrap();
    let updated = engine.apply_first_out(&week.week_id, "AMB131").unwrap();
    assert_eq!(updated, 14);

    let week = store.week(&week.week_id).unwrap().unwrap();
    assert_eq!(week.first_out_default_unit_id, "AMB131");
    for shift in store.shifts_for_week(&week.week_id).unwrap() {
        let config = store.shift_config(&shift.shift_id).unwrap().unwrap();
        assert_eq!(config.staffed_unit_id, "AMB131");
        assert_eq!(config.first_out_override_unit_id, None);
    }
}

#[test]
fn override_wins_and_survives_rotation() {
    let store = build_store();
    let config = ScheduleConfig::default();
    let generator = WeekGenerator::new(&store, config.clone());
    let engine = RotationEngine::new(&store, config);

    let week = generator.generate_week(dec4(), "AMB121").unwrap();
    let shift_id = format!("{}__D2__NIGHT", week.week_id);
    store.set_first_out_override(&shift_id, Some("AMB120")).unwrap();

    engine.apply_first_out(&week.week_id, "AMB131").unwrap();

    let config = store.shift_config(&shift_id).unwrap().unwrap();
    assert_eq!(config.staffed_unit_id, "AMB131");
    assert_eq!(config.first_out_override_unit_id.as_deref(), Some("AMB120"));
    assert_eq!(config.effective_unit(), "AMB120");

    // Every non-overridden shift resolves to the new default.
    let other = store
        .shift_config(&format!("{}__D0__DAY", week.week_id))
        .unwrap()
        .unwrap();
    assert_eq!(other.effective_unit(), "AMB131");
}

#[test]
fn rotation_never_touches_seat_assignments() {
    let store = build_store();
    let config = ScheduleConfig::default();
    let generator = WeekGenerator::new(&store, config.clone());
    let engine = RotationEngine::new(&store, config);

    let week = generator.generate_week(dec4(), "AMB121").unwrap();
    let shift_id = format!("{}__D0__DAY", week.week_id);
    let seat = store
        .seat(&shift_id, "AMB121", SeatRole::Driver, Layer::Primary)
        .unwrap()
        .unwrap();
    store
        .update_seat_assignment(
            &seat.seat_record_id,
            &Assignment::person("mkelly"),
            HealthStatus::Filled,
            None,
        )
        .unwrap();
    let seats_before = store.seat_count_total().unwrap();

    engine.apply_first_out(&week.week_id, "AMB120").unwrap();

    // Layers are a presentation-time computation; the rotation change
    // must not move, delete, or regenerate any seat row.
    assert_eq!(store.seat_count_total().unwrap(), seats_before);
    let seat = store
        .seat(&shift_id, "AMB121", SeatRole::Driver, Layer::Primary)
        .unwrap()
        .unwrap();
    assert_eq!(seat.assignment, Assignment::person("mkelly"));
    assert_eq!(seat.health, HealthStatus::Filled);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: error cases
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn apply_first_out_missing_week_is_not_found() {
    let store = build_store();
    let engine = RotationEngine::new(&store, ScheduleConfig::default());

    let err = engine
        .apply_first_out("WEEK_2099-01-07_to_2099-01-13", "AMB120")
        .unwrap_err();
    assert!(matches!(err, ScheduleError::WeekNotFound { .. }), "got {err:?}");
}

#[test]
fn apply_first_out_rejects_unknown_unit() {
    let store = build_store();
    let config = ScheduleConfig::default();
    let generator = WeekGenerator::new(&store, config.clone());
    let engine = RotationEngine::new(&store, config);

    let week = generator.generate_week(dec4(), "AMB121").unwrap();
    let err = engine.apply_first_out(&week.week_id, "ENGINE7").unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownUnit { .. }), "got {err:?}");

    // Aborted before any write.
    let week = store.week(&week.week_id).unwrap().unwrap();
    assert_eq!(week.first_out_default_unit_id, "AMB121");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: round-robin sequencing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn four_week_rotation_wraps_around() {
    let store = build_store();
    let engine = RotationEngine::new(&store, ScheduleConfig::default());

    let applied = engine.apply_rotation(dec4(), 4).unwrap();
    let units: Vec<&str> = applied.iter().map(|(_, u)| u.as_str()).collect();
    assert_eq!(units, ["AMB120", "AMB121", "AMB131", "AMB120"]);

    // Weeks exist and carry the applied default.
    let starts = [
        NaiveDate::from_ymd_opt(2025, 12, 4).unwrap(),
        NaiveDate::from_ymd_opt(2025, 12, 11).unwrap(),
        NaiveDate::from_ymd_opt(2025, 12, 18).unwrap(),
        NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
    ];
    for (i, start) in starts.iter().enumerate() {
        let week = store.week(&week_id_for(*start)).unwrap().unwrap();
        assert_eq!(week.first_out_default_unit_id, units[i], "week {i}");
    }
    assert_eq!(store.weeks().unwrap().len(), 4);
}

#[test]
fn rotation_is_idempotent_over_existing_weeks() {
    let store = build_store();
    let engine = RotationEngine::new(&store, ScheduleConfig::default());

    engine.apply_rotation(dec4(), 4).unwrap();
    let seats_before = store.seat_count_total().unwrap();

    // Re-applying the same rotation re-points defaults but creates nothing.
    engine.apply_rotation(dec4(), 4).unwrap();
    assert_eq!(store.seat_count_total().unwrap(), seats_before);
    assert_eq!(store.weeks().unwrap().len(), 4);
    assert_eq!(store.duplicate_group_count().unwrap(), 0);
}
