use super::{datetime_col, enum_col, ScheduleStore, DATETIME_FMT};
use crate::calendar::{Shift, ShiftConfig};
use crate::error::{ScheduleError, ScheduleResult};
use rusqlite::{params, OptionalExtension};

impl ScheduleStore {
    pub fn shift(&self, shift_id: &str) -> ScheduleResult<Option<Shift>> {
        self.conn
            .query_row(
                "SELECT shift_id, week_id, shift_start, shift_end, label, day_index, slot
                 FROM shifts WHERE shift_id = ?1",
                params![shift_id],
                shift_row,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn shifts_for_week(&self, week_id: &str) -> ScheduleResult<Vec<Shift>> {
        let mut stmt = self.conn.prepare(
            "SELECT shift_id, week_id, shift_start, shift_end, label, day_index, slot
             FROM shifts WHERE week_id = ?1
             ORDER BY shift_start ASC",
        )?;
        let rows = stmt
            .query_map(params![week_id], shift_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn shift_config(&self, shift_id: &str) -> ScheduleResult<Option<ShiftConfig>> {
        self.conn
            .query_row(
                "SELECT shift_id, staffed_unit_id, first_out_override_unit_id,
                        is_salary_only, active
                 FROM shift_config WHERE shift_id = ?1",
                params![shift_id],
                shift_config_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Set or clear the per-shift first-out override. The rotation engine
    /// never touches this; only deliberate per-shift edits do.
    pub fn set_first_out_override(
        &self,
        shift_id: &str,
        unit_id: Option<&str>,
    ) -> ScheduleResult<()> {
        let changed = self.conn.execute(
            "UPDATE shift_config SET first_out_override_unit_id = ?1 WHERE shift_id = ?2",
            params![unit_id, shift_id],
        )?;
        if changed == 0 {
            return Err(ScheduleError::ShiftNotFound {
                shift_id: shift_id.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn insert_shift_row(&self, shift: &Shift, ignore_existing: bool) -> ScheduleResult<usize> {
        let sql = if ignore_existing {
            "INSERT OR IGNORE INTO shifts
             (shift_id, week_id, shift_start, shift_end, label, day_index, slot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        } else {
            "INSERT INTO shifts
             (shift_id, week_id, shift_start, shift_end, label, day_index, slot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        };
        let changed = self.conn.execute(
            sql,
            params![
                shift.shift_id,
                shift.week_id,
                shift.start.format(DATETIME_FMT).to_string(),
                shift.end.format(DATETIME_FMT).to_string(),
                shift.label,
                shift.day_index,
                shift.slot.as_str(),
            ],
        )?;
        Ok(changed)
    }

    pub(crate) fn insert_shift_config_row(
        &self,
        config: &ShiftConfig,
        ignore_existing: bool,
    ) -> ScheduleResult<usize> {
        let sql = if ignore_existing {
            "INSERT OR IGNORE INTO shift_config
             (shift_id, staffed_unit_id, first_out_override_unit_id, is_salary_only, active)
             VALUES (?1, ?2, ?3, ?4, ?5)"
        } else {
            "INSERT INTO shift_config
             (shift_id, staffed_unit_id, first_out_override_unit_id, is_salary_only, active)
             VALUES (?1, ?2, ?3, ?4, ?5)"
        };
        let changed = self.conn.execute(
            sql,
            params![
                config.shift_id,
                config.staffed_unit_id,
                config.first_out_override_unit_id,
                config.salary_only as i32,
                config.active as i32,
            ],
        )?;
        Ok(changed)
    }
}

fn shift_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Shift> {
    Ok(Shift {
        shift_id: row.get(0)?,
        week_id: row.get(1)?,
        start: datetime_col(2, row.get(2)?)?,
        end: datetime_col(3, row.get(3)?)?,
        label: row.get(4)?,
        day_index: row.get::<_, i64>(5)? as u8,
        slot: enum_col(6, row.get(6)?)?,
    })
}

fn shift_config_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ShiftConfig> {
    Ok(ShiftConfig {
        shift_id: row.get(0)?,
        staffed_unit_id: row.get(1)?,
        first_out_override_unit_id: row.get(2)?,
        salary_only: row.get::<_, i32>(3)? != 0,
        active: row.get::<_, i32>(4)? != 0,
    })
}
