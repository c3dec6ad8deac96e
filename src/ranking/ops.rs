use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::model::{DataFile, Rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn commit_message(self) -> &'static str {
        match self {
            Direction::Up => "Move up",
            Direction::Down => "Move down",
        }
    }
}

/// Indices into `doc.ranks` for one list, ordered by position.
/// The sort is stable so equal positions keep their stored order.
fn list_indices(doc: &DataFile, list_id: &str) -> Vec<usize> {
    let mut indices: Vec<usize> = doc
        .ranks
        .iter()
        .enumerate()
        .filter(|(_, r)| r.list_id == list_id)
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| doc.ranks[i].position);
    indices
}

/// Write positions 1..=N following `order`. Returns true if any changed.
fn renumber(doc: &mut DataFile, order: &[usize]) -> bool {
    let mut changed = false;
    for (slot, &i) in order.iter().enumerate() {
        let position = slot as i64 + 1;
        if doc.ranks[i].position != position {
            doc.ranks[i].position = position;
            changed = true;
        }
    }
    changed
}

/// Entries of a list in position order (best first).
pub fn ordered_list<'a>(doc: &'a DataFile, list_id: &str) -> Vec<&'a Rank> {
    list_indices(doc, list_id)
        .into_iter()
        .map(|i| &doc.ranks[i])
        .collect()
}

/// 0-based index of a coaster within a list's ordering
pub fn position_of(doc: &DataFile, list_id: &str, coaster_id: &str) -> Option<usize> {
    ordered_list(doc, list_id)
        .iter()
        .position(|r| r.coaster_id == coaster_id)
}

/// Re-sort a list by position and renumber it 1..=N without gaps.
/// Returns true if any position changed.
pub fn normalize_list(doc: &mut DataFile, list_id: &str) -> bool {
    let order = list_indices(doc, list_id);
    renumber(doc, &order)
}

/// Append a coaster at the bottom of a list.
pub fn add_to_list(
    doc: &mut DataFile,
    list_id: &str,
    coaster_id: &str,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if doc.coaster(coaster_id).is_none() {
        return Err(ValidationError::UnknownCoaster(coaster_id.to_string()));
    }
    if doc.rank_of(list_id, coaster_id).is_some() {
        return Err(ValidationError::AlreadyRanked(coaster_id.to_string()));
    }

    normalize_list(doc, list_id);
    let count = doc.ranks.iter().filter(|r| r.list_id == list_id).count();
    doc.ranks.push(Rank {
        list_id: list_id.to_string(),
        coaster_id: coaster_id.to_string(),
        position: count as i64 + 1,
        updated_at: now,
    });
    Ok(())
}

/// Remove a coaster from a list and close the gap.
pub fn remove_from_list(
    doc: &mut DataFile,
    list_id: &str,
    coaster_id: &str,
) -> Result<(), ValidationError> {
    let before = doc.ranks.len();
    doc.ranks
        .retain(|r| !(r.list_id == list_id && r.coaster_id == coaster_id));
    if doc.ranks.len() == before {
        return Err(ValidationError::NotRanked(coaster_id.to_string()));
    }
    normalize_list(doc, list_id);
    Ok(())
}

/// Move the entry at 0-based `from` so it ends up at 0-based `to`.
///
/// Only the moved entry gets a new `updated_at`; everything else is just
/// renumbered. `from == to` leaves the document untouched.
pub fn move_entry(
    doc: &mut DataFile,
    list_id: &str,
    from: usize,
    to: usize,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    let mut order = list_indices(doc, list_id);
    let len = order.len();
    for index in [from, to] {
        if index >= len {
            return Err(ValidationError::IndexOutOfRange { index, len });
        }
    }
    if from == to {
        return Ok(());
    }

    let moved = order.remove(from);
    order.insert(to, moved);
    renumber(doc, &order);
    doc.ranks[moved].updated_at = now;
    Ok(())
}

/// Swap a coaster with its neighbour. Returns false (and changes nothing)
/// when the coaster is already at that edge of the list.
pub fn nudge(
    doc: &mut DataFile,
    list_id: &str,
    coaster_id: &str,
    direction: Direction,
    now: DateTime<Utc>,
) -> Result<bool, ValidationError> {
    let index = position_of(doc, list_id, coaster_id)
        .ok_or_else(|| ValidationError::NotRanked(coaster_id.to_string()))?;
    let len = doc.ranks.iter().filter(|r| r.list_id == list_id).count();

    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < len => index + 1,
        _ => return Ok(false),
    };
    move_entry(doc, list_id, index, target, now)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coaster, MAIN_LIST};
    use chrono::TimeZone;

    fn t(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    /// Coasters A..E ranked 1..5 in the main list, all stamped at minute 0.
    fn five() -> DataFile {
        let mut doc = DataFile::default();
        for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            doc.coasters.push(Coaster {
                id: name.to_string(),
                name: name.to_string(),
                park_id: "p".into(),
                manufacturer_id: None,
                notes: None,
            });
            doc.ranks.push(Rank {
                list_id: MAIN_LIST.into(),
                coaster_id: name.to_string(),
                position: i as i64 + 1,
                updated_at: t(0),
            });
        }
        doc
    }

    fn names(doc: &DataFile) -> Vec<String> {
        ordered_list(doc, MAIN_LIST)
            .iter()
            .map(|r| r.coaster_id.clone())
            .collect()
    }

    fn positions(doc: &DataFile) -> Vec<i64> {
        ordered_list(doc, MAIN_LIST).iter().map(|r| r.position).collect()
    }

    #[test]
    fn test_move_down_then_normalize() {
        let mut doc = five();
        move_entry(&mut doc, MAIN_LIST, 1, 3, t(5)).unwrap();
        assert_eq!(names(&doc), vec!["A", "C", "D", "B", "E"]);
        assert_eq!(positions(&doc), vec![1, 2, 3, 4, 5]);
        assert_eq!(doc.rank_of(MAIN_LIST, "B").unwrap().updated_at, t(5));
        for untouched in ["A", "C", "D", "E"] {
            assert_eq!(
                doc.rank_of(MAIN_LIST, untouched).unwrap().updated_at,
                t(0),
                "{} was restamped",
                untouched
            );
        }
    }

    #[test]
    fn test_move_up() {
        let mut doc = five();
        move_entry(&mut doc, MAIN_LIST, 4, 0, t(5)).unwrap();
        assert_eq!(names(&doc), vec!["E", "A", "B", "C", "D"]);
    }

    #[test]
    fn test_move_to_same_index_is_noop() {
        let mut doc = five();
        let before = doc.clone();
        move_entry(&mut doc, MAIN_LIST, 2, 2, t(5)).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_move_out_of_range() {
        let mut doc = five();
        let err = move_entry(&mut doc, MAIN_LIST, 0, 5, t(5)).unwrap_err();
        assert_eq!(err, ValidationError::IndexOutOfRange { index: 5, len: 5 });
        let err = move_entry(&mut doc, MAIN_LIST, 7, 0, t(5)).unwrap_err();
        assert_eq!(err, ValidationError::IndexOutOfRange { index: 7, len: 5 });
    }

    #[test]
    fn test_remove_closes_gap() {
        let mut doc = five();
        remove_from_list(&mut doc, MAIN_LIST, "C").unwrap();
        assert_eq!(names(&doc), vec!["A", "B", "D", "E"]);
        assert_eq!(positions(&doc), vec![1, 2, 3, 4]);
        // Coaster itself stays in the catalog
        assert!(doc.coaster("C").is_some());
    }

    #[test]
    fn test_remove_unranked_is_error() {
        let mut doc = five();
        remove_from_list(&mut doc, MAIN_LIST, "C").unwrap();
        let err = remove_from_list(&mut doc, MAIN_LIST, "C").unwrap_err();
        assert_eq!(err, ValidationError::NotRanked("C".into()));
    }

    #[test]
    fn test_add_appends_at_bottom() {
        let mut doc = five();
        remove_from_list(&mut doc, MAIN_LIST, "A").unwrap();
        add_to_list(&mut doc, MAIN_LIST, "A", t(9)).unwrap();
        assert_eq!(names(&doc), vec!["B", "C", "D", "E", "A"]);
        assert_eq!(doc.rank_of(MAIN_LIST, "A").unwrap().position, 5);
        assert_eq!(doc.rank_of(MAIN_LIST, "A").unwrap().updated_at, t(9));
    }

    #[test]
    fn test_add_rejects_duplicates_and_unknown() {
        let mut doc = five();
        assert_eq!(
            add_to_list(&mut doc, MAIN_LIST, "A", t(1)).unwrap_err(),
            ValidationError::AlreadyRanked("A".into())
        );
        assert_eq!(
            add_to_list(&mut doc, MAIN_LIST, "Z", t(1)).unwrap_err(),
            ValidationError::UnknownCoaster("Z".into())
        );
    }

    #[test]
    fn test_add_to_empty_list() {
        let mut doc = five();
        add_to_list(&mut doc, "wood", "B", t(1)).unwrap();
        assert_eq!(doc.rank_of("wood", "B").unwrap().position, 1);
        // Other lists untouched
        assert_eq!(positions(&doc), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_nudge_swaps_neighbours() {
        let mut doc = five();
        assert!(nudge(&mut doc, MAIN_LIST, "C", Direction::Up, t(3)).unwrap());
        assert_eq!(names(&doc), vec!["A", "C", "B", "D", "E"]);
        assert_eq!(doc.rank_of(MAIN_LIST, "C").unwrap().updated_at, t(3));
        assert_eq!(doc.rank_of(MAIN_LIST, "B").unwrap().updated_at, t(0));

        assert!(nudge(&mut doc, MAIN_LIST, "C", Direction::Down, t(4)).unwrap());
        assert_eq!(names(&doc), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_nudge_at_edges_is_noop() {
        let mut doc = five();
        let before = doc.clone();
        assert!(!nudge(&mut doc, MAIN_LIST, "A", Direction::Up, t(3)).unwrap());
        assert!(!nudge(&mut doc, MAIN_LIST, "E", Direction::Down, t(3)).unwrap());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_normalize_sorts_and_fills_gaps() {
        let mut doc = five();
        doc.ranks[0].position = 10; // A
        doc.ranks[2].position = 7; // C
        assert!(normalize_list(&mut doc, MAIN_LIST));
        assert_eq!(names(&doc), vec!["B", "D", "E", "C", "A"]);
        assert_eq!(positions(&doc), vec![1, 2, 3, 4, 5]);
        assert!(!normalize_list(&mut doc, MAIN_LIST));
    }

    #[test]
    fn test_position_of() {
        let doc = five();
        assert_eq!(position_of(&doc, MAIN_LIST, "D"), Some(3));
        assert_eq!(position_of(&doc, MAIN_LIST, "Z"), None);
    }
}
