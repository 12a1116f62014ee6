//! Seat-record reconciliation.
//!
//! Seat-key uniqueness (shift, unit, role, layer) can be violated by
//! concurrent or repeated imports. One deterministic scoring policy picks
//! the surviving row per key; every future special case must be an
//! adjustment to that score, not a new parallel pass.
//!
//! Scoring, highest wins (ties broken by lowest seat id):
//!   +1000  note carries the authoritative history tag
//!   +100   health FILLED
//!   +10    assigned entity type is PERSON or PLACEHOLDER
//!   +3     person id set
//!   +2     placeholder id set

use crate::error::ScheduleResult;
use crate::seat::canonical_placeholder_id;
use crate::store::{DuplicateGroup, ScheduleStore, SeatDupRow};

/// Outcome of a full reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub placeholders_normalized: usize,
    pub blanks_pruned: usize,
    pub groups_resolved: usize,
    pub rows_deleted: usize,
}

pub struct SeatReconciler<'a> {
    store: &'a ScheduleStore,
    history_tag: String,
}

impl<'a> SeatReconciler<'a> {
    pub fn new(store: &'a ScheduleStore, history_tag: impl Into<String>) -> Self {
        Self {
            store,
            history_tag: history_tag.into(),
        }
    }

    /// Full pass, safe to re-run: normalization and pruning first (they
    /// must happen before uniqueness comparison), then duplicate
    /// resolution to a fixed point. A second invocation deletes nothing.
    pub fn reconcile(&self) -> ScheduleResult<ReconcileReport> {
        let mut report = ReconcileReport {
            placeholders_normalized: self.normalize_placeholders()?,
            blanks_pruned: self.prune_blank_defaults()?,
            ..Default::default()
        };

        loop {
            let groups = self.store.duplicate_seat_groups()?;
            if groups.is_empty() {
                break;
            }
            for group in &groups {
                let deleted = self.resolve_group(group)?;
                report.groups_resolved += 1;
                report.rows_deleted += deleted;
            }
        }

        log::info!(
            "reconcile: {} placeholders normalized, {} blanks pruned, {} groups resolved, {} rows deleted",
            report.placeholders_normalized,
            report.blanks_pruned,
            report.groups_resolved,
            report.rows_deleted
        );
        Ok(report)
    }

    /// Rewrite placeholder ids to canonical `PH_` form so textual
    /// variants of the same name collapse to one id.
    pub fn normalize_placeholders(&self) -> ScheduleResult<usize> {
        let mut updated = 0;
        for (seat_record_id, raw) in self.store.placeholder_assignments()? {
            let canonical = canonical_placeholder_id(&raw);
            if canonical != raw {
                self.store
                    .set_assigned_placeholder(&seat_record_id, &canonical)?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Drop blank-default rows wherever the same key also holds a row
    /// carrying the authoritative history tag.
    pub fn prune_blank_defaults(&self) -> ScheduleResult<usize> {
        self.store.prune_blank_defaults(&self.history_tag)
    }

    /// Resolve one duplicate group: score, keep the winner, carry the
    /// history tag over if only a loser had it, delete the rest. The
    /// losers are logged before deletion, never silently dropped.
    fn resolve_group(&self, group: &DuplicateGroup) -> ScheduleResult<usize> {
        let rows = self.store.seat_rows_for_key(group)?;
        if rows.len() < 2 {
            return Ok(0);
        }

        // Rows arrive ordered by id; strict > keeps the earliest on ties.
        let scores: Vec<i64> = rows.iter().map(|r| self.score(r)).collect();
        let mut winner = 0;
        for i in 1..rows.len() {
            if scores[i] > scores[winner] {
                winner = i;
            }
        }

        let winner_row = &rows[winner];
        let winner_note = winner_row.note.clone().unwrap_or_default();

        // Preserve provenance: if the winner lacks the tag but a loser
        // carries one, prepend the loser's tag token to the winner's note.
        let mut new_note: Option<String> = None;
        if !winner_note.contains(&self.history_tag) {
            let carried = rows
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != winner)
                .filter_map(|(_, r)| extract_tag(r.note.as_deref(), &self.history_tag))
                .next();
            if let Some(tag) = carried {
                new_note = Some(if winner_note.trim().is_empty() {
                    tag
                } else {
                    format!("{tag} | {winner_note}")
                });
            }
        }

        let loser_ids: Vec<_> = rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != winner)
            .map(|(_, r)| r.seat_record_id.clone())
            .collect();

        log::warn!(
            "seat key [{} {} {} {}]: {} duplicate rows, keeping {}, deleting {:?}",
            group.shift_id,
            group.unit_id,
            group.seat_role,
            group.layer,
            rows.len(),
            winner_row.seat_record_id,
            loser_ids
        );

        self.store
            .resolve_seat_group(&winner_row.seat_record_id, new_note.as_deref(), &loser_ids)
    }

    fn score(&self, row: &SeatDupRow) -> i64 {
        let mut s = 0;
        let note = row.note.as_deref().unwrap_or("");
        if !self.history_tag.is_empty() && note.contains(&self.history_tag) {
            s += 1000;
        }
        if row.health_status.eq_ignore_ascii_case("FILLED") {
            s += 100;
        }
        let entity = row.assigned_entity_type.trim().to_ascii_uppercase();
        if entity == "PERSON" || entity == "PLACEHOLDER" {
            s += 10;
        }
        if row
            .assigned_person_id
            .as_deref()
            .map(|p| !p.trim().is_empty())
            .unwrap_or(false)
        {
            s += 3;
        }
        if row
            .assigned_placeholder_id
            .as_deref()
            .map(|p| !p.trim().is_empty())
            .unwrap_or(false)
        {
            s += 2;
        }
        s
    }
}

/// Pull the tag token out of a note: from the tag-family marker up to the
/// next whitespace or '|' separator.
fn extract_tag(note: Option<&str>, tag: &str) -> Option<String> {
    let note = note?;
    let start = note.find(tag)?;
    let token: String = note[start..]
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '|')
        .collect();
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::extract_tag;

    #[test]
    fn tag_token_extraction() {
        assert_eq!(
            extract_tag(Some("HISTORY_DEC2025 | imported"), "HISTORY_"),
            Some("HISTORY_DEC2025".to_string())
        );
        assert_eq!(extract_tag(Some("no marker here"), "HISTORY_"), None);
        assert_eq!(extract_tag(None, "HISTORY_"), None);
    }
}
