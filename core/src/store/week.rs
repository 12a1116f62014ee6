use super::{date_col, datetime_col, enum_col, ScheduleStore, DATE_FMT, DATETIME_FMT};
use crate::calendar::{Week, WeekPlan};
use crate::error::{ScheduleError, ScheduleResult};
use rusqlite::{params, OptionalExtension};

/// Row counts created by an idempotent ensure pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnsureStats {
    pub weeks: usize,
    pub shifts: usize,
    pub configs: usize,
    pub seats: usize,
}

impl EnsureStats {
    pub fn any(&self) -> bool {
        self.weeks + self.shifts + self.configs + self.seats > 0
    }
}

impl ScheduleStore {
    pub fn week(&self, week_id: &str) -> ScheduleResult<Option<Week>> {
        self.conn
            .query_row(
                "SELECT week_id, start_date, end_date, lock_at,
                        first_out_default_unit_id, status
                 FROM schedule_weeks WHERE week_id = ?1",
                params![week_id],
                week_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn week_by_start_date(&self, start_date: chrono::NaiveDate) -> ScheduleResult<Option<Week>> {
        self.conn
            .query_row(
                "SELECT week_id, start_date, end_date, lock_at,
                        first_out_default_unit_id, status
                 FROM schedule_weeks WHERE start_date = ?1",
                params![start_date.format(DATE_FMT).to_string()],
                week_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn weeks(&self) -> ScheduleResult<Vec<Week>> {
        let mut stmt = self.conn.prepare(
            "SELECT week_id, start_date, end_date, lock_at,
                    first_out_default_unit_id, status
             FROM schedule_weeks ORDER BY start_date ASC",
        )?;
        let rows = stmt
            .query_map([], week_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Insert a full week plan strictly. Any id collision fails the whole
    /// operation; the transaction rolls back and nothing is observable.
    pub fn insert_week_plan(&self, plan: &WeekPlan) -> ScheduleResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.insert_week_row(&plan.week, false)?;
        for shift in &plan.shifts {
            self.insert_shift_row(shift, false)?;
        }
        for config in &plan.configs {
            self.insert_shift_config_row(config, false)?;
        }
        for seat in &plan.seats {
            self.insert_seat_row(seat, false)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert only the missing rows of a week plan. Existing rows keep
    /// their assignment fields, health, and notes untouched.
    pub fn ensure_week_plan(&self, plan: &WeekPlan) -> ScheduleResult<EnsureStats> {
        let tx = self.conn.unchecked_transaction()?;
        let mut stats = EnsureStats::default();
        stats.weeks += self.insert_week_row(&plan.week, true)?;
        for shift in &plan.shifts {
            stats.shifts += self.insert_shift_row(shift, true)?;
        }
        for config in &plan.configs {
            stats.configs += self.insert_shift_config_row(config, true)?;
        }
        for seat in &plan.seats {
            stats.seats += self.insert_seat_row(seat, true)?;
        }
        tx.commit()?;
        Ok(stats)
    }

    /// Point the week's rotation default (and every shift's staffed unit)
    /// at `unit_id`, leaving per-shift overrides and seat records alone.
    /// Returns the number of shift configs updated.
    pub fn apply_first_out(&self, week_id: &str, unit_id: &str) -> ScheduleResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let weeks = self.conn.execute(
            "UPDATE schedule_weeks SET first_out_default_unit_id = ?1 WHERE week_id = ?2",
            params![unit_id, week_id],
        )?;
        if weeks == 0 {
            return Err(ScheduleError::WeekNotFound {
                week_id: week_id.to_string(),
            });
        }
        let configs = self.conn.execute(
            "UPDATE shift_config SET staffed_unit_id = ?1
             WHERE shift_id IN (SELECT shift_id FROM shifts WHERE week_id = ?2)",
            params![unit_id, week_id],
        )?;
        tx.commit()?;
        Ok(configs)
    }

    fn insert_week_row(&self, week: &Week, ignore_existing: bool) -> ScheduleResult<usize> {
        let sql = if ignore_existing {
            "INSERT OR IGNORE INTO schedule_weeks
             (week_id, start_date, end_date, lock_at, first_out_default_unit_id, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        } else {
            "INSERT INTO schedule_weeks
             (week_id, start_date, end_date, lock_at, first_out_default_unit_id, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        };
        let changed = self.conn.execute(
            sql,
            params![
                week.week_id,
                week.start_date.format(DATE_FMT).to_string(),
                week.end_date.format(DATE_FMT).to_string(),
                week.lock_at.format(DATETIME_FMT).to_string(),
                week.first_out_default_unit_id,
                week.status.as_str(),
            ],
        )?;
        Ok(changed)
    }
}

fn week_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Week> {
    Ok(Week {
        week_id: row.get(0)?,
        start_date: date_col(1, row.get(1)?)?,
        end_date: date_col(2, row.get(2)?)?,
        lock_at: datetime_col(3, row.get(3)?)?,
        first_out_default_unit_id: row.get(4)?,
        status: enum_col(5, row.get(5)?)?,
    })
}
