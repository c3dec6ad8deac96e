pub mod groups;
pub mod leaderboard;
pub mod points;
pub mod summary;

use std::cmp::Ordering;

pub use groups::{group_coasters, GroupBy, GroupKey, GroupMember, GroupOptions, GroupStats};
pub use leaderboard::{
    coaster_standings, podium, sort_groups, CoasterStanding, SortDirection, SortKey,
};
pub use points::{coaster_points, ranked_rows, unranked, PointsMap, RankedRow};
pub use summary::{highlights, last_change, leaderboards, quick_stats, Highlights, Leaderboards, QuickStats};

/// Case-insensitive name order, falling back to the raw strings so the
/// order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
