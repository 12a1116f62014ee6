use super::{enum_col, ScheduleStore};
use crate::error::ScheduleResult;
use crate::roster::{Person, Placeholder, RosterSnapshot, Unit};
use rusqlite::params;

impl ScheduleStore {
    // Upserts are for external roster ingestion (and the operator CLI);
    // the scheduling core itself only ever reads these tables.

    pub fn upsert_unit(&self, unit: &Unit) -> ScheduleResult<()> {
        self.conn.execute(
            "INSERT INTO units (unit_id, unit_label, active) VALUES (?1, ?2, ?3)
             ON CONFLICT(unit_id) DO UPDATE SET
                 unit_label = excluded.unit_label, active = excluded.active",
            params![unit.unit_id, unit.unit_label, unit.active as i32],
        )?;
        Ok(())
    }

    pub fn upsert_person(&self, person: &Person) -> ScheduleResult<()> {
        self.conn.execute(
            "INSERT INTO people (person_id, display_name, active, medical_cert, willing_attend)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(person_id) DO UPDATE SET
                 display_name = excluded.display_name,
                 active = excluded.active,
                 medical_cert = excluded.medical_cert,
                 willing_attend = excluded.willing_attend",
            params![
                person.person_id,
                person.display_name,
                person.active as i32,
                person.medical_cert.as_str(),
                person.willing_attend as i32,
            ],
        )?;
        Ok(())
    }

    pub fn upsert_person_op(&self, person_id: &str, unit_id: &str) -> ScheduleResult<()> {
        self.conn.execute(
            "INSERT INTO person_ops (person_id, unit_id, can_operate) VALUES (?1, ?2, 1)
             ON CONFLICT(person_id, unit_id) DO UPDATE SET can_operate = 1",
            params![person_id, unit_id],
        )?;
        Ok(())
    }

    pub fn upsert_placeholder(&self, placeholder: &Placeholder) -> ScheduleResult<()> {
        self.conn.execute(
            "INSERT INTO placeholders (placeholder_id, placeholder_label, active)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(placeholder_id) DO UPDATE SET
                 placeholder_label = excluded.placeholder_label,
                 active = excluded.active",
            params![
                placeholder.placeholder_id,
                placeholder.placeholder_label,
                placeholder.active as i32,
            ],
        )?;
        Ok(())
    }

    pub fn units(&self) -> ScheduleResult<Vec<Unit>> {
        let mut stmt = self
            .conn
            .prepare("SELECT unit_id, unit_label, active FROM units ORDER BY unit_id ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Unit {
                    unit_id: row.get(0)?,
                    unit_label: row.get(1)?,
                    active: row.get::<_, i32>(2)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// A point-in-time roster view: all people plus the ops-capability
    /// index. The radar evaluates against this, never against live rows.
    pub fn roster_snapshot(&self) -> ScheduleResult<RosterSnapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT person_id, display_name, active, medical_cert, willing_attend
             FROM people ORDER BY person_id ASC",
        )?;
        let people = stmt
            .query_map([], |row| {
                Ok(Person {
                    person_id: row.get(0)?,
                    display_name: row.get(1)?,
                    active: row.get::<_, i32>(2)? != 0,
                    medical_cert: enum_col(3, row.get(3)?)?,
                    willing_attend: row.get::<_, i32>(4)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT person_id, unit_id FROM person_ops WHERE can_operate = 1",
        )?;
        let ops = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, String)>, _>>()?;

        Ok(RosterSnapshot::new(people, ops))
    }
}
