//! shiftboard: headless operator CLI for the staffing core.
//!
//! Usage:
//!   shiftboard create-week --db board.db --start 2025-12-04 --first-out AMB121
//!   shiftboard rotate      --db board.db --start 2025-12-04 --weeks 4
//!   shiftboard reconcile   --db board.db
//!   shiftboard backfill    --db board.db --week WEEK_2025-12-04_to_2025-12-10
//!   shiftboard radar       --db board.db --week WEEK_2025-12-04_to_2025-12-10
//!   shiftboard view-week   --db board.db --week WEEK_2025-12-04_to_2025-12-10
//!   shiftboard seed-roster --db board.db --roster roster.json
//!
//! Pass --config schedule.json to override the default rotation/calendar
//! configuration.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shiftboard_core::{
    backfill::apply_driver_backfill,
    calendar::parse_date,
    radar,
    roster::{Person, Placeholder, Unit},
    BackfillPolicy, RadarPolicy, RotationEngine, ScheduleConfig, ScheduleStore, SeatReconciler,
    WeekGenerator,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = match args.get(1) {
        Some(c) => c.as_str(),
        None => {
            print_usage();
            return Ok(());
        }
    };

    let db = flag(&args, "--db").unwrap_or_else(|| "shiftboard.db".to_string());
    let store = ScheduleStore::open(&db)?;
    store.migrate()?;
    log::debug!("database ready at {db}");

    let config = match flag(&args, "--config") {
        Some(path) => ScheduleConfig::load(Path::new(&path))?,
        None => ScheduleConfig::default(),
    };

    match command {
        "create-week" => cmd_create_week(&args, &store, config),
        "rotate" => cmd_rotate(&args, &store, config),
        "reconcile" => cmd_reconcile(&store, config),
        "backfill" => cmd_backfill(&args, &store),
        "radar" => cmd_radar(&args, &store),
        "view-week" => cmd_view_week(&args, &store),
        "seed-roster" => cmd_seed_roster(&args, &store),
        other => {
            print_usage();
            bail!("unknown command '{other}'");
        }
    }
}

fn cmd_create_week(args: &[String], store: &ScheduleStore, config: ScheduleConfig) -> Result<()> {
    let start = parse_date(&require_flag(args, "--start")?)?;
    let first_out = flag(args, "--first-out")
        .unwrap_or_else(|| config.rotation_units[0].clone());

    let generator = WeekGenerator::new(store, config);
    let week = generator.generate_week(start, &first_out)?;

    println!();
    println!("Week created.");
    println!("week_id:   {}", week.week_id);
    println!("start:     {}", week.start_date);
    println!("end:       {}", week.end_date);
    println!("lock_at:   {}", week.lock_at);
    println!("first-out: {}", week.first_out_default_unit_id);
    println!();
    Ok(())
}

fn cmd_rotate(args: &[String], store: &ScheduleStore, config: ScheduleConfig) -> Result<()> {
    let start = parse_date(&require_flag(args, "--start")?)?;
    let weeks: usize = parse_flag(args, "--weeks", 4);

    let engine = RotationEngine::new(store, config);
    let applied = engine.apply_rotation(start, weeks)?;

    println!();
    println!("Rotation applied.");
    for (week_id, unit_id) in applied {
        println!("{week_id}  |  first-out {unit_id}");
    }
    println!();
    Ok(())
}

fn cmd_reconcile(store: &ScheduleStore, config: ScheduleConfig) -> Result<()> {
    let reconciler = SeatReconciler::new(store, config.history_tag.clone());
    let report = reconciler.reconcile()?;

    println!();
    println!("Reconcile complete.");
    println!("  Placeholders normalized: {}", report.placeholders_normalized);
    println!("  Blank defaults pruned:   {}", report.blanks_pruned);
    println!("  Duplicate groups fixed:  {}", report.groups_resolved);
    println!("  Rows deleted:            {}", report.rows_deleted);
    let remaining = store.duplicate_group_count()?;
    if remaining > 0 {
        println!("WARNING: still {remaining} duplicate groups remain.");
    } else {
        println!("OK: no remaining duplicates per (shift, unit, role, layer).");
    }
    println!();
    Ok(())
}

fn cmd_backfill(args: &[String], store: &ScheduleStore) -> Result<()> {
    let week_id = require_flag(args, "--week")?;
    let policy = match flag(args, "--policy") {
        Some(path) => load_json(Path::new(&path))?,
        None => BackfillPolicy {
            weekday_driver: Some("PH_FIRE_DIVISION".to_string()),
            weekend_driver: None,
        },
    };

    let report = apply_driver_backfill(store, &week_id, &policy)?;

    println!();
    println!("Backfill complete.");
    println!("  Driver seats filled: {}", report.filled);
    if !report.pending.is_empty() {
        println!("  Pending (no applicable rule):");
        for shift_id in &report.pending {
            println!("    {shift_id}");
        }
    }
    println!();
    Ok(())
}

fn cmd_radar(args: &[String], store: &ScheduleStore) -> Result<()> {
    let week_id = require_flag(args, "--week")?;
    let policy = RadarPolicy {
        allow_nonmedical_driver: args.iter().any(|a| a == "--allow-nonmedical-driver"),
    };

    let roster = store.roster_snapshot()?;
    let results = radar::evaluate_week(store, &week_id, &roster, &policy)?;

    println!();
    println!("FRAGILITY RADAR — if locked right now");
    println!("Week: {week_id}");
    println!("Legend:");
    println!("  GREEN  = attendant pool has ALS + driver pool exists");
    println!("  YELLOW = pools exist but fragile / no ALS");
    println!("  RED    = missing attendant pool or driver pool");
    println!();

    for (shift, eval) in results {
        println!("{} | {} -> {}", shift.label, shift.start, shift.end);
        println!("  Unit: {}", eval.unit_id);
        println!(
            "  Attendant candidates: {} (ALS-capable: {})",
            eval.attendant_pool.len(),
            eval.als_capable_count
        );
        println!("  Driver candidates:    {}", eval.driver_pool.len());
        let reasons: Vec<String> = eval.reasons.iter().map(|r| r.to_string()).collect();
        if reasons.is_empty() {
            println!("  STATUS: {}", eval.status);
        } else {
            println!("  STATUS: {} | {}", eval.status, reasons.join(", "));
        }
        println!();
    }
    Ok(())
}

fn cmd_view_week(args: &[String], store: &ScheduleStore) -> Result<()> {
    let week_id = require_flag(args, "--week")?;
    let week = store
        .week(&week_id)?
        .with_context(|| format!("week not found: {week_id}"))?;

    println!();
    println!("{}  |  {} -> {}  [{}]", week.week_id, week.start_date, week.end_date, week.status);
    println!("lock_at: {}  default first-out: {}", week.lock_at, week.first_out_default_unit_id);
    println!();

    for shift in store.shifts_for_week(&week_id)? {
        let effective = match store.shift_config(&shift.shift_id)? {
            Some(config) => config.effective_unit().clone(),
            None => week.first_out_default_unit_id.clone(),
        };
        println!("{}  (effective unit {effective})", shift.label);
        for seat in store.seats_for_shift(&shift.shift_id)? {
            let who = match (seat.assignment.person_id(), seat.assignment.placeholder_id()) {
                (Some(p), _) => p.to_string(),
                (_, Some(ph)) => ph.to_string(),
                _ => "-".to_string(),
            };
            println!(
                "  {:<7} {:<8} {:<9} {:<9} {}",
                seat.layer, seat.unit_id, seat.role, seat.health, who
            );
        }
        println!();
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    units: Vec<Unit>,
    #[serde(default)]
    people: Vec<RosterPerson>,
    #[serde(default)]
    placeholders: Vec<Placeholder>,
}

#[derive(Debug, Deserialize)]
struct RosterPerson {
    #[serde(flatten)]
    person: Person,
    #[serde(default)]
    ops_units: Vec<String>,
}

fn cmd_seed_roster(args: &[String], store: &ScheduleStore) -> Result<()> {
    let path = require_flag(args, "--roster")?;
    let roster: RosterFile = load_json(Path::new(&path))?;

    for unit in &roster.units {
        store.upsert_unit(unit)?;
    }
    for placeholder in &roster.placeholders {
        store.upsert_placeholder(placeholder)?;
    }
    for entry in &roster.people {
        store.upsert_person(&entry.person)?;
        for unit_id in &entry.ops_units {
            store.upsert_person_op(&entry.person.person_id, unit_id)?;
        }
    }

    println!();
    println!("Roster load complete.");
    println!("  Units:        {}", roster.units.len());
    println!("  People:       {}", roster.people.len());
    println!("  Placeholders: {}", roster.placeholders.len());
    println!();
    Ok(())
}

// ── Argument helpers ───────────────────────────────────────────────

fn flag(args: &[String], name: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].clone())
}

fn require_flag(args: &[String], name: &str) -> Result<String> {
    flag(args, name).with_context(|| format!("missing required flag {name}"))
}

fn parse_flag<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    flag(args, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_usage() {
    println!("shiftboard — shift/seat staffing tools");
    println!();
    println!("Commands:");
    println!("  create-week --start YYYY-MM-DD [--first-out UNIT]");
    println!("  rotate      --start YYYY-MM-DD [--weeks N]");
    println!("  reconcile");
    println!("  backfill    --week WEEK_ID [--policy policy.json]");
    println!("  radar       --week WEEK_ID [--allow-nonmedical-driver]");
    println!("  view-week   --week WEEK_ID");
    println!("  seed-roster --roster roster.json");
    println!();
    println!("Common flags: --db PATH (default shiftboard.db), --config schedule.json");
}
