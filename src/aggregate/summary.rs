use super::groups::{default_order, group_coasters, GroupBy, GroupOptions, GroupStats};
use super::leaderboard::{coaster_standings, podium, sort_groups, CoasterStanding};
use super::leaderboard::{SortDirection, SortKey};
use super::points::coaster_points;
use chrono::{DateTime, Utc};

use crate::model::DataFile;
use crate::scoring::ScoringConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuickStats {
    pub coasters: usize,
    pub parks: usize,
    pub manufacturers: usize,
    pub ranked: usize,
}

pub fn quick_stats(doc: &DataFile, list_id: &str) -> QuickStats {
    QuickStats {
        coasters: doc.coasters.len(),
        parks: doc.parks.len(),
        manufacturers: doc.manufacturers.len(),
        ranked: doc.ranks.iter().filter(|r| r.list_id == list_id).count(),
    }
}

/// Most recent `updatedAt` in a list, `None` when it is empty.
pub fn last_change(doc: &DataFile, list_id: &str) -> Option<DateTime<Utc>> {
    doc.ranks
        .iter()
        .filter(|r| r.list_id == list_id)
        .map(|r| r.updated_at)
        .max()
}

/// Podiums for the home screen. Only ranked coasters take part.
#[derive(Debug, Clone)]
pub struct Highlights<'a> {
    pub coasters: Vec<CoasterStanding<'a>>,
    pub parks: Vec<GroupStats<'a>>,
    pub manufacturers: Vec<GroupStats<'a>>,
    pub stats: QuickStats,
}

pub fn highlights<'a>(
    doc: &'a DataFile,
    list_id: &str,
    config: &ScoringConfig,
    size: usize,
) -> Highlights<'a> {
    let points = coaster_points(doc, Some(list_id), config);
    let ranked_only = GroupOptions {
        include_unranked: false,
        include_unassigned: false,
    };

    let mut parks = group_coasters(doc, &points, GroupBy::Park, ranked_only);
    parks.sort_by(default_order);
    let mut manufacturers = group_coasters(doc, &points, GroupBy::Manufacturer, ranked_only);
    manufacturers.sort_by(default_order);

    Highlights {
        coasters: podium(coaster_standings(doc, &points), size),
        parks: podium(parks, size),
        manufacturers: podium(manufacturers, size),
        stats: quick_stats(doc, list_id),
    }
}

/// Sorted leaderboards for both groupings.
#[derive(Debug, Clone)]
pub struct Leaderboards<'a> {
    pub parks: Vec<GroupStats<'a>>,
    pub manufacturers: Vec<GroupStats<'a>>,
    pub ranked: usize,
}

pub fn leaderboards<'a>(
    doc: &'a DataFile,
    list_id: &str,
    config: &ScoringConfig,
    options: GroupOptions,
    key: SortKey,
    direction: SortDirection,
) -> Leaderboards<'a> {
    let points = coaster_points(doc, Some(list_id), config);
    let mut parks = group_coasters(doc, &points, GroupBy::Park, options);
    let mut manufacturers = group_coasters(doc, &points, GroupBy::Manufacturer, options);
    sort_groups(&mut parks, key, direction);
    sort_groups(&mut manufacturers, key, direction);
    Leaderboards {
        parks,
        manufacturers,
        ranked: points.len(),
    }
}
