use super::{enum_col, ScheduleStore};
use crate::error::ScheduleResult;
use crate::seat::{Assignment, HealthStatus, SeatRecord, SeatRole};
use crate::types::SeatRecordId;
use rusqlite::{params, OptionalExtension};
use std::str::FromStr;

/// A seat key that holds more than one row. Kept as raw text: duplicate
/// rows come from bulk imports and may not parse cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub shift_id: String,
    pub unit_id: String,
    pub seat_role: String,
    pub layer: String,
    pub count: i64,
}

/// Raw candidate row for duplicate scoring. Mirrors the columns the
/// scoring policy reads, untyped so a malformed import row still scores.
#[derive(Debug, Clone)]
pub(crate) struct SeatDupRow {
    pub seat_record_id: SeatRecordId,
    pub assigned_entity_type: String,
    pub assigned_person_id: Option<String>,
    pub assigned_placeholder_id: Option<String>,
    pub health_status: String,
    pub note: Option<String>,
}

impl ScheduleStore {
    pub fn seats_for_shift(&self, shift_id: &str) -> ScheduleResult<Vec<SeatRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT seat_record_id, shift_id, unit_id, seat_role, layer,
                    assigned_entity_type, assigned_person_id, assigned_placeholder_id,
                    health_status, note
             FROM seat_records WHERE shift_id = ?1
             ORDER BY layer ASC, unit_id ASC, seat_role ASC",
        )?;
        let rows = stmt
            .query_map(params![shift_id], seat_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn seat(
        &self,
        shift_id: &str,
        unit_id: &str,
        role: SeatRole,
        layer: crate::seat::Layer,
    ) -> ScheduleResult<Option<SeatRecord>> {
        self.conn
            .query_row(
                "SELECT seat_record_id, shift_id, unit_id, seat_role, layer,
                        assigned_entity_type, assigned_person_id, assigned_placeholder_id,
                        health_status, note
                 FROM seat_records
                 WHERE shift_id = ?1 AND unit_id = ?2 AND seat_role = ?3 AND layer = ?4
                 ORDER BY seat_record_id ASC LIMIT 1",
                params![shift_id, unit_id, role.as_str(), layer.as_str()],
                seat_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Write an assignment onto a seat. Used by staffing edits and the
    /// backfill policy; week generation never goes through here.
    pub fn update_seat_assignment(
        &self,
        seat_record_id: &str,
        assignment: &Assignment,
        health: HealthStatus,
        note: Option<&str>,
    ) -> ScheduleResult<usize> {
        let changed = self.conn.execute(
            "UPDATE seat_records
             SET assigned_entity_type = ?1, assigned_person_id = ?2,
                 assigned_placeholder_id = ?3, health_status = ?4, note = ?5
             WHERE seat_record_id = ?6",
            params![
                assignment.entity_type(),
                assignment.person_id(),
                assignment.placeholder_id(),
                health.as_str(),
                note,
                seat_record_id,
            ],
        )?;
        Ok(changed)
    }

    /// Full-row upsert for bulk importers. Keyed on the deterministic
    /// seat id, so a re-run overwrites its own previous import rather
    /// than duplicating. Importers must run reconciliation afterwards.
    pub fn upsert_seat_record(&self, seat: &SeatRecord) -> ScheduleResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO seat_records
             (seat_record_id, shift_id, unit_id, seat_role, layer,
              assigned_entity_type, assigned_person_id, assigned_placeholder_id,
              health_status, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                seat.seat_record_id,
                seat.shift_id,
                seat.unit_id,
                seat.role.as_str(),
                seat.layer.as_str(),
                seat.assignment.entity_type(),
                seat.assignment.person_id(),
                seat.assignment.placeholder_id(),
                seat.health.as_str(),
                seat.note,
            ],
        )?;
        Ok(())
    }

    pub(crate) fn insert_seat_row(
        &self,
        seat: &SeatRecord,
        ignore_existing: bool,
    ) -> ScheduleResult<usize> {
        let sql = if ignore_existing {
            "INSERT OR IGNORE INTO seat_records
             (seat_record_id, shift_id, unit_id, seat_role, layer,
              assigned_entity_type, assigned_person_id, assigned_placeholder_id,
              health_status, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        } else {
            "INSERT INTO seat_records
             (seat_record_id, shift_id, unit_id, seat_role, layer,
              assigned_entity_type, assigned_person_id, assigned_placeholder_id,
              health_status, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        };
        let changed = self.conn.execute(
            sql,
            params![
                seat.seat_record_id,
                seat.shift_id,
                seat.unit_id,
                seat.role.as_str(),
                seat.layer.as_str(),
                seat.assignment.entity_type(),
                seat.assignment.person_id(),
                seat.assignment.placeholder_id(),
                seat.health.as_str(),
                seat.note,
            ],
        )?;
        Ok(changed)
    }

    // ── Reconciliation queries ─────────────────────────────────────

    pub fn duplicate_seat_groups(&self) -> ScheduleResult<Vec<DuplicateGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT shift_id, unit_id, seat_role, layer, COUNT(*) AS cnt
             FROM seat_records
             GROUP BY shift_id, unit_id, seat_role, layer
             HAVING COUNT(*) > 1
             ORDER BY shift_id, unit_id, seat_role, layer",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DuplicateGroup {
                    shift_id: row.get(0)?,
                    unit_id: row.get(1)?,
                    seat_role: row.get(2)?,
                    layer: row.get(3)?,
                    count: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub(crate) fn seat_rows_for_key(&self, group: &DuplicateGroup) -> ScheduleResult<Vec<SeatDupRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT seat_record_id, assigned_entity_type, assigned_person_id,
                    assigned_placeholder_id, health_status, note
             FROM seat_records
             WHERE shift_id = ?1 AND unit_id = ?2 AND seat_role = ?3 AND layer = ?4
             ORDER BY seat_record_id ASC",
        )?;
        let rows = stmt
            .query_map(
                params![group.shift_id, group.unit_id, group.seat_role, group.layer],
                |row| {
                    Ok(SeatDupRow {
                        seat_record_id: row.get(0)?,
                        assigned_entity_type: row.get(1)?,
                        assigned_person_id: row.get(2)?,
                        assigned_placeholder_id: row.get(3)?,
                        health_status: row.get(4)?,
                        note: row.get(5)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Keep the winner (optionally rewriting its note) and delete the
    /// losers, atomically. Returns the number of rows deleted.
    pub fn resolve_seat_group(
        &self,
        winner_id: &str,
        winner_note: Option<&str>,
        loser_ids: &[SeatRecordId],
    ) -> ScheduleResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        if let Some(note) = winner_note {
            self.conn.execute(
                "UPDATE seat_records SET note = ?1 WHERE seat_record_id = ?2",
                params![note, winner_id],
            )?;
        }
        let mut deleted = 0;
        for loser in loser_ids {
            deleted += self.conn.execute(
                "DELETE FROM seat_records WHERE seat_record_id = ?1",
                params![loser],
            )?;
        }
        tx.commit()?;
        Ok(deleted)
    }

    /// Delete blank-default rows for every key where another row carries
    /// the authoritative history tag. Blank placeholders never outrank
    /// real or historical data.
    pub fn prune_blank_defaults(&self, history_tag: &str) -> ScheduleResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM seat_records
             WHERE seat_record_id IN (
                 SELECT b.seat_record_id
                 FROM seat_records b
                 JOIN seat_records h
                   ON h.shift_id  = b.shift_id
                  AND h.unit_id   = b.unit_id
                  AND h.seat_role = b.seat_role
                  AND h.layer     = b.layer
                  AND h.seat_record_id != b.seat_record_id
                 WHERE h.note LIKE '%' || ?1 || '%'
                   AND b.assigned_entity_type IN ('NONE', 'UNASSIGNED')
                   AND b.assigned_person_id IS NULL
                   AND b.assigned_placeholder_id IS NULL
                   AND (b.note IS NULL OR TRIM(b.note) = '')
                   AND (b.health_status IS NULL OR TRIM(b.health_status) = ''
                        OR b.health_status = 'UNFILLED')
             )",
            params![history_tag],
        )?;
        Ok(deleted)
    }

    // ── Placeholder canonicalization ───────────────────────────────

    pub(crate) fn placeholder_assignments(&self) -> ScheduleResult<Vec<(SeatRecordId, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT seat_record_id, assigned_placeholder_id
             FROM seat_records
             WHERE assigned_placeholder_id IS NOT NULL",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub(crate) fn set_assigned_placeholder(
        &self,
        seat_record_id: &str,
        placeholder_id: &str,
    ) -> ScheduleResult<usize> {
        let changed = self.conn.execute(
            "UPDATE seat_records SET assigned_placeholder_id = ?1 WHERE seat_record_id = ?2",
            params![placeholder_id, seat_record_id],
        )?;
        Ok(changed)
    }

    // ── Test / summary helpers ─────────────────────────────────────

    pub fn seat_count_total(&self) -> ScheduleResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM seat_records", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn seat_count_for_shift(&self, shift_id: &str) -> ScheduleResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM seat_records WHERE shift_id = ?1",
                params![shift_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub fn duplicate_group_count(&self) -> ScheduleResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM (
                     SELECT 1 FROM seat_records
                     GROUP BY shift_id, unit_id, seat_role, layer
                     HAVING COUNT(*) > 1
                 )",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}

fn seat_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SeatRecord> {
    let entity_type: String = row.get(5)?;
    let person: Option<String> = row.get(6)?;
    let placeholder: Option<String> = row.get(7)?;
    // Imported rows may carry odd health spellings; fall back to UNFILLED
    // the way the legacy tooling did rather than failing the whole scan.
    let health: String = row.get(8)?;
    Ok(SeatRecord {
        seat_record_id: row.get(0)?,
        shift_id: row.get(1)?,
        unit_id: row.get(2)?,
        role: enum_col(3, row.get(3)?)?,
        layer: enum_col(4, row.get(4)?)?,
        assignment: Assignment::from_columns(&entity_type, person, placeholder),
        health: HealthStatus::from_str(&health).unwrap_or(HealthStatus::Unfilled),
        note: row.get(9)?,
    })
}
