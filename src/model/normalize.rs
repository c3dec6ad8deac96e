use std::collections::HashSet;

use super::types::{DataFile, SCHEMA_VERSION};
use crate::ranking::normalize_list;

/// Repair a freshly loaded document in place so every list is contiguous,
/// duplicate-free and references only known coasters.
///
/// Returns one human-readable warning per repair. Each warning is also
/// logged.
pub fn normalize_document(doc: &mut DataFile) -> Vec<String> {
    let mut warnings = Vec::new();

    if doc.version > SCHEMA_VERSION {
        warnings.push(format!(
            "data file version {} is newer than supported version {}",
            doc.version, SCHEMA_VERSION
        ));
    }

    let coaster_ids: HashSet<&str> = doc.coasters.iter().map(|c| c.id.as_str()).collect();
    let park_ids: HashSet<&str> = doc.parks.iter().map(|p| p.id.as_str()).collect();
    let manufacturer_ids: HashSet<&str> =
        doc.manufacturers.iter().map(|m| m.id.as_str()).collect();

    for coaster in &doc.coasters {
        if !park_ids.contains(coaster.park_id.as_str()) {
            warnings.push(format!(
                "coaster '{}' references unknown park {}",
                coaster.name, coaster.park_id
            ));
        }
        if let Some(id) = coaster.manufacturer_id.as_deref() {
            if !manufacturer_ids.contains(id) {
                warnings.push(format!(
                    "coaster '{}' references unknown manufacturer {}",
                    coaster.name, id
                ));
            }
        }
    }

    // Ranks pointing at missing coasters cannot be displayed or scored
    let dangling: Vec<String> = doc
        .ranks
        .iter()
        .filter(|r| !coaster_ids.contains(r.coaster_id.as_str()))
        .map(|r| r.coaster_id.clone())
        .collect();
    if !dangling.is_empty() {
        doc.ranks.retain(|r| !dangling.contains(&r.coaster_id));
        for id in dangling {
            warnings.push(format!("dropped rank for unknown coaster {}", id));
        }
    }

    let mut lists: Vec<String> = Vec::new();
    for rank in &doc.ranks {
        if !lists.contains(&rank.list_id) {
            lists.push(rank.list_id.clone());
        }
    }

    for list_id in &lists {
        let dropped = dedupe_list(doc, list_id);
        for coaster_id in dropped {
            warnings.push(format!(
                "list '{}': dropped duplicate rank for coaster {}",
                list_id, coaster_id
            ));
        }
        if normalize_list(doc, list_id) {
            warnings.push(format!("list '{}': positions renumbered", list_id));
        }
    }

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    warnings
}

/// Keep only the best-positioned entry per coaster in one list.
/// Returns the coaster ids whose extra entries were dropped.
fn dedupe_list(doc: &mut DataFile, list_id: &str) -> Vec<String> {
    let mut indices: Vec<usize> = doc
        .ranks
        .iter()
        .enumerate()
        .filter(|(_, r)| r.list_id == list_id)
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| doc.ranks[i].position);

    let mut seen = HashSet::new();
    let mut remove = HashSet::new();
    let mut dropped = Vec::new();
    for i in indices {
        let coaster_id = &doc.ranks[i].coaster_id;
        if !seen.insert(coaster_id.clone()) {
            remove.insert(i);
            dropped.push(coaster_id.clone());
        }
    }

    if !remove.is_empty() {
        let mut index = 0;
        doc.ranks.retain(|_| {
            let keep = !remove.contains(&index);
            index += 1;
            keep
        });
    }
    dropped
}
