//! Rank-list operations packaged as session mutations: each one applies
//! the edit and names the commit message to save it under.

use chrono::{DateTime, Utc};

use super::ops::{add_to_list, move_entry, nudge, ordered_list, remove_from_list, Direction};
use crate::catalog::Change;
use crate::error::ValidationError;
use crate::model::DataFile;

pub fn rank_coaster(
    doc: &mut DataFile,
    list_id: &str,
    coaster_id: &str,
    now: DateTime<Utc>,
) -> Result<Change, ValidationError> {
    add_to_list(doc, list_id, coaster_id, now)?;
    Ok(Change::new(coaster_id, "Add to rankings"))
}

pub fn unrank_coaster(
    doc: &mut DataFile,
    list_id: &str,
    coaster_id: &str,
) -> Result<Change, ValidationError> {
    remove_from_list(doc, list_id, coaster_id)?;
    Ok(Change::new(coaster_id, "Remove from rankings"))
}

pub fn reorder(
    doc: &mut DataFile,
    list_id: &str,
    from: usize,
    to: usize,
    now: DateTime<Utc>,
) -> Result<Change, ValidationError> {
    let subject = ordered_list(doc, list_id)
        .get(from)
        .map(|r| r.coaster_id.clone())
        .unwrap_or_default();
    move_entry(doc, list_id, from, to, now)?;
    Ok(Change::new(subject, "Reorder rankings"))
}

/// Nudge one slot. At an edge the document is left as it was, which the
/// session treats as nothing to save.
pub fn step(
    doc: &mut DataFile,
    list_id: &str,
    coaster_id: &str,
    direction: Direction,
    now: DateTime<Utc>,
) -> Result<Change, ValidationError> {
    nudge(doc, list_id, coaster_id, direction, now)?;
    Ok(Change::new(coaster_id, direction.commit_message()))
}
