use super::config::{ScoringConfig, DEFAULT_PIVOT_FRACTION, DEFAULT_TOP_MULTIPLIER};

/// Which part of the hinged curve a position falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Linear,
    Exponential,
}

/// How a position's points were derived, for the breakdown popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsBreakdown {
    pub position: i64,
    pub total: i64,
    /// Ascending quality index: 1 is last place, `total` is first place
    pub index: i64,
    pub pivot: i64,
    pub segment: Segment,
    /// Unrounded curve value
    pub raw: f64,
    pub points: u32,
}

/// Convert a 1-based rank position into points.
///
/// Position 1 is the best slot. The bottom of the list scores linearly
/// (last place = 1, then +1 per slot) up to the pivot; above the pivot the
/// score grows geometrically so that first place gets `top_multiplier`
/// times the pivot score.
///
/// Returns 0 when `total <= 0`. Positions outside `1..=total` are clamped.
pub fn position_to_points(position: i64, total: i64, config: &ScoringConfig) -> u32 {
    breakdown(position, total, config).map_or(0, |b| b.points)
}

/// Same as [`position_to_points`] but keeps the intermediate values.
/// Returns None when `total <= 0`.
pub fn breakdown(position: i64, total: i64, config: &ScoringConfig) -> Option<PointsBreakdown> {
    if total <= 0 {
        return None;
    }

    let n = total;
    let position = position.clamp(1, n);
    let index = n - position + 1;

    let pivot_fraction = sanitize(config.pivot_fraction(), DEFAULT_PIVOT_FRACTION).clamp(0.0, 1.0);
    let pivot = ((n as f64) * pivot_fraction).round() as i64;
    let pivot = pivot.clamp(1, n);

    if index <= pivot {
        return Some(PointsBreakdown {
            position,
            total,
            index,
            pivot,
            segment: Segment::Linear,
            raw: index as f64,
            points: saturating_points(index as f64),
        });
    }

    let top_multiplier = sanitize(config.top_multiplier(), DEFAULT_TOP_MULTIPLIER).max(1.0);
    let steps = (n - pivot) as f64;
    // top^((i-m)/(N-m)) == b^(i-m) with b = top^(1/(N-m)); exact at the top slot
    let raw = pivot as f64 * top_multiplier.powf((index - pivot) as f64 / steps);
    let points = saturating_points(config.rounding().apply(raw).max(1.0));

    Some(PointsBreakdown {
        position,
        total,
        index,
        pivot,
        segment: Segment::Exponential,
        raw,
        points,
    })
}

/// Points for every position `1..=total`, best first.
pub fn points_table(total: usize, config: &ScoringConfig) -> Vec<u32> {
    let n = total as i64;
    (1..=n).map(|position| position_to_points(position, n, config)).collect()
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn saturating_points(value: f64) -> u32 {
    // float -> int `as` casts saturate
    value as u32
}
