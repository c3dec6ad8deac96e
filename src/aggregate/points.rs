use std::collections::HashMap;

use crate::model::{Coaster, DataFile, Manufacturer, Park, Rank};
use crate::ranking::ordered_list;
use crate::scoring::{position_to_points, ScoringConfig};

/// Points per coaster id. Coasters absent from the map are unranked.
pub type PointsMap = HashMap<String, u32>;

/// Points for every ranked coaster.
///
/// With `list_id` set, only that list counts. Otherwise a coaster ranked in
/// several lists takes its best score; equal scores resolve to the
/// lexicographically smallest list id so the result is stable.
pub fn coaster_points(doc: &DataFile, list_id: Option<&str>, config: &ScoringConfig) -> PointsMap {
    let mut list_sizes: HashMap<&str, i64> = HashMap::new();
    for rank in doc.ranks.iter().filter(|r| in_scope(r, list_id)) {
        *list_sizes.entry(rank.list_id.as_str()).or_insert(0) += 1;
    }

    let mut best: HashMap<&str, (u32, &str)> = HashMap::new();
    for rank in doc.ranks.iter().filter(|r| in_scope(r, list_id)) {
        let total = list_sizes.get(rank.list_id.as_str()).copied().unwrap_or(0);
        let points = position_to_points(rank.position, total, config);
        let candidate = (points, rank.list_id.as_str());
        best.entry(rank.coaster_id.as_str())
            .and_modify(|current| {
                if candidate.0 > current.0 || (candidate.0 == current.0 && candidate.1 < current.1)
                {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    best.into_iter()
        .map(|(id, (points, _))| (id.to_string(), points))
        .collect()
}

fn in_scope(rank: &Rank, list_id: Option<&str>) -> bool {
    list_id.map_or(true, |id| rank.list_id == id)
}

/// One line of the rankings view.
#[derive(Debug, Clone)]
pub struct RankedRow<'a> {
    /// 1-based display position
    pub position: usize,
    pub coaster: &'a Coaster,
    pub park: Option<&'a Park>,
    pub manufacturer: Option<&'a Manufacturer>,
    pub points: u32,
    pub rank: &'a Rank,
}

/// A list in position order with each entry's points.
pub fn ranked_rows<'a>(doc: &'a DataFile, list_id: &str, config: &ScoringConfig) -> Vec<RankedRow<'a>> {
    let ranks = ordered_list(doc, list_id);
    let total = ranks.len() as i64;
    ranks
        .into_iter()
        .filter_map(|rank| doc.coaster(&rank.coaster_id).map(|c| (rank, c)))
        .enumerate()
        .map(|(i, (rank, coaster))| RankedRow {
            position: i + 1,
            coaster,
            park: doc.park_of(coaster),
            manufacturer: doc.manufacturer_of(coaster),
            points: position_to_points(i as i64 + 1, total, config),
            rank,
        })
        .collect()
}

/// Coasters not in the list, sorted by name.
pub fn unranked<'a>(doc: &'a DataFile, list_id: &str) -> Vec<&'a Coaster> {
    let mut coasters: Vec<&Coaster> = doc
        .coasters
        .iter()
        .filter(|c| doc.rank_of(list_id, &c.id).is_none())
        .collect();
    coasters.sort_by(|a, b| super::compare_names(&a.name, &b.name));
    coasters
}
