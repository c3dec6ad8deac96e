use std::cmp::Ordering;
use std::str::FromStr;

use super::points::PointsMap;
use super::compare_names;
use crate::model::{Coaster, DataFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Park,
    Manufacturer,
}

impl GroupBy {
    fn unassigned_name(self) -> &'static str {
        match self {
            GroupBy::Park => "No Park",
            GroupBy::Manufacturer => "No Manufacturer",
        }
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "park" | "parks" => Ok(GroupBy::Park),
            "manufacturer" | "manufacturers" | "mfr" => Ok(GroupBy::Manufacturer),
            other => Err(format!(
                "unknown grouping '{}', expected park or manufacturer",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Id(String),
    /// Coasters whose park or manufacturer is missing
    Unassigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupOptions {
    /// Count unranked coasters as 0-point members
    pub include_unranked: bool,
    /// Emit a "No Park"/"No Manufacturer" group
    pub include_unassigned: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            include_unranked: true,
            include_unassigned: false,
        }
    }
}

impl GroupOptions {
    /// Every coaster lands in some group, the unassigned ones included.
    pub fn browse() -> Self {
        Self {
            include_unranked: true,
            include_unassigned: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupMember<'a> {
    pub coaster: &'a Coaster,
    pub points: u32,
    pub ranked: bool,
}

#[derive(Debug, Clone)]
pub struct GroupStats<'a> {
    pub key: GroupKey,
    pub name: String,
    pub count: usize,
    pub total_points: u64,
    pub avg: f64,
    /// Sum of the three best scores divided by 3, even with fewer members
    pub top3_avg: f64,
    /// Best first; ties by name
    pub members: Vec<GroupMember<'a>>,
}

impl GroupStats<'_> {
    pub fn ranked_count(&self) -> usize {
        self.members.iter().filter(|m| m.ranked).count()
    }
}

/// Group coasters by park or manufacturer and compute per-group statistics.
///
/// Groups come back in the order their first member appears in the
/// catalog; use [`super::sort_groups`] to order them.
pub fn group_coasters<'a>(
    doc: &'a DataFile,
    points: &PointsMap,
    by: GroupBy,
    options: GroupOptions,
) -> Vec<GroupStats<'a>> {
    let mut groups: Vec<(GroupKey, String, Vec<GroupMember<'a>>)> = Vec::new();

    for coaster in &doc.coasters {
        let ranked_points = points.get(&coaster.id).copied();
        if ranked_points.is_none() && !options.include_unranked {
            continue;
        }

        let (key, name) = match group_of(doc, coaster, by) {
            Some((id, name)) => (GroupKey::Id(id), name),
            None if options.include_unassigned => {
                (GroupKey::Unassigned, by.unassigned_name().to_string())
            }
            None => continue,
        };

        let member = GroupMember {
            coaster,
            points: ranked_points.unwrap_or(0),
            ranked: ranked_points.is_some(),
        };
        match groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, members)) => members.push(member),
            None => groups.push((key, name, vec![member])),
        }
    }

    groups
        .into_iter()
        .map(|(key, name, members)| summarize(key, name, members))
        .collect()
}

fn group_of(doc: &DataFile, coaster: &Coaster, by: GroupBy) -> Option<(String, String)> {
    match by {
        GroupBy::Park => doc.park_of(coaster).map(|p| (p.id.clone(), p.name.clone())),
        GroupBy::Manufacturer => doc
            .manufacturer_of(coaster)
            .map(|m| (m.id.clone(), m.name.clone())),
    }
}

fn summarize<'a>(key: GroupKey, name: String, mut members: Vec<GroupMember<'a>>) -> GroupStats<'a> {
    members.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| compare_names(&a.coaster.name, &b.coaster.name))
    });

    let count = members.len();
    let total_points: u64 = members.iter().map(|m| u64::from(m.points)).sum();
    let avg = if count == 0 {
        0.0
    } else {
        total_points as f64 / count as f64
    };
    // members are sorted best first
    let top3: u64 = members.iter().take(3).map(|m| u64::from(m.points)).sum();

    GroupStats {
        key,
        name,
        count,
        total_points,
        avg,
        top3_avg: top3 as f64 / 3.0,
        members,
    }
}

/// Descending by total points, then ascending by name
pub fn default_order(a: &GroupStats, b: &GroupStats) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| compare_names(&a.name, &b.name))
}
