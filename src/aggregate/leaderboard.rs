use std::cmp::Ordering;
use std::str::FromStr;

use super::compare_names;
use super::groups::GroupStats;
use super::points::PointsMap;
use crate::model::{Coaster, DataFile, Manufacturer, Park};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    TotalPoints,
    Average,
    Count,
    Top3Average,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "total" | "points" | "totalpoints" => Ok(SortKey::TotalPoints),
            "avg" | "average" => Ok(SortKey::Average),
            "count" => Ok(SortKey::Count),
            "top3" | "top3avg" => Ok(SortKey::Top3Average),
            other => Err(format!(
                "unknown sort key '{}', expected total, avg, count or top3",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown direction '{}', expected asc or desc", other)),
        }
    }
}

fn compare_key(a: &GroupStats, b: &GroupStats, key: SortKey) -> Ordering {
    match key {
        SortKey::TotalPoints => a.total_points.cmp(&b.total_points),
        SortKey::Average => a.avg.total_cmp(&b.avg),
        SortKey::Count => a.count.cmp(&b.count),
        SortKey::Top3Average => a.top3_avg.total_cmp(&b.top3_avg),
    }
}

/// Order groups by `key` in `direction`. Equal keys fall back to ascending
/// name regardless of direction.
pub fn sort_groups(groups: &mut [GroupStats], key: SortKey, direction: SortDirection) {
    groups.sort_by(|a, b| {
        let primary = match direction {
            SortDirection::Ascending => compare_key(a, b, key),
            SortDirection::Descending => compare_key(b, a, key),
        };
        primary.then_with(|| compare_names(&a.name, &b.name))
    });
}

/// First `n` items of an already sorted sequence.
pub fn podium<T>(items: impl IntoIterator<Item = T>, n: usize) -> Vec<T> {
    items.into_iter().take(n).collect()
}

#[derive(Debug, Clone)]
pub struct CoasterStanding<'a> {
    pub coaster: &'a Coaster,
    pub park: Option<&'a Park>,
    pub manufacturer: Option<&'a Manufacturer>,
    pub points: u32,
}

/// Ranked coasters by points, best first; ties by name.
pub fn coaster_standings<'a>(doc: &'a DataFile, points: &PointsMap) -> Vec<CoasterStanding<'a>> {
    let mut standings: Vec<CoasterStanding> = doc
        .coasters
        .iter()
        .filter_map(|coaster| {
            points.get(&coaster.id).map(|&points| CoasterStanding {
                coaster,
                park: doc.park_of(coaster),
                manufacturer: doc.manufacturer_of(coaster),
                points,
            })
        })
        .collect();
    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| compare_names(&a.coaster.name, &b.coaster.name))
    });
    standings
}
