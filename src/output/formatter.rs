use chrono::Duration;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::aggregate::{CoasterStanding, GroupStats, Highlights, RankedRow};
use crate::model::{Coaster, DataFile};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// At most two decimals, trailing zeros dropped: 16.75, 22.33, 40
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// "Park · Manufacturer", skipping whichever is missing
fn context_line(park: Option<&str>, manufacturer: Option<&str>) -> String {
    match (park, manufacturer) {
        (Some(p), Some(m)) => format!("{} · {}", p, m),
        (Some(p), None) => p.to_string(),
        (None, Some(m)) => m.to_string(),
        (None, None) => String::new(),
    }
}

/// Ranked list as a table: index, points, coaster name, park and maker.
/// No headers.
pub fn format_rankings_table(rows: &[RankedRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No coasters ranked yet.".to_string();
    }

    let term_width = get_terminal_width();
    let index_width = rows.len().to_string().len() + 1;
    let points_width = rows
        .iter()
        .map(|r| r.points.to_string().len())
        .max()
        .unwrap_or(1);
    let name_width = rows
        .iter()
        .map(|r| r.coaster.name.chars().count())
        .max()
        .unwrap_or(0);
    let separator = "  ";

    rows.iter()
        .map(|row| {
            let index_str = format!("{:>width$}", format!("{}.", row.position), width = index_width);
            let points_str = format!("{:>width$}", row.points, width = points_width);
            let context = context_line(
                row.park.map(|p| p.name.as_str()),
                row.manufacturer.map(|m| m.name.as_str()),
            );

            let fixed_width = index_width + 1 + points_width + separator.len() * 2;
            let name = match term_width {
                Some(width) if width > fixed_width + name_width + 10 => {
                    pad(&row.coaster.name, name_width)
                }
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&row.coaster.name, width - fixed_width - 10)
                }
                Some(_) => truncate_name(&row.coaster.name, 20),
                None => pad(&row.coaster.name, name_width),
            };

            let line = if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    points_str.bold(),
                    separator,
                    name,
                    separator,
                    context.cyan()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    index_str, points_str, separator, name, separator, context
                )
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ranked list as tab-separated values for scripting
/// Columns: position, points, coaster, park, manufacturer, coaster id
pub fn format_rankings_tsv(rows: &[RankedRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                row.position,
                row.points,
                row.coaster.name,
                row.park.map(|p| p.name.as_str()).unwrap_or(""),
                row.manufacturer.map(|m| m.name.as_str()).unwrap_or(""),
                row.coaster.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Coasters not yet in the list
pub fn format_unranked(doc: &DataFile, coasters: &[&Coaster], use_colors: bool) -> String {
    if coasters.is_empty() {
        return "Every coaster is ranked.".to_string();
    }

    let mut lines = vec![if use_colors {
        format!("{}", "Unranked".bold())
    } else {
        "Unranked".to_string()
    }];
    for coaster in coasters {
        let park = doc.park_of(coaster).map(|p| p.name.as_str());
        let context = context_line(park, doc.manufacturer_of(coaster).map(|m| m.name.as_str()));
        if use_colors {
            lines.push(format!("  {}  {}", coaster.name, context.dimmed()));
        } else {
            lines.push(format!("  {}  {}", coaster.name, context).trim_end().to_string());
        }
    }
    lines.join("\n")
}

/// Leaderboard with one row per group and a header
pub fn format_group_table(title: &str, groups: &[GroupStats], use_colors: bool) -> String {
    let heading = if use_colors {
        format!("{}", title.bold())
    } else {
        title.to_string()
    };
    if groups.is_empty() {
        return format!("{}\n  Nothing to show.", heading);
    }

    let name_width = groups
        .iter()
        .map(|g| g.name.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 40);

    let header = format!(
        "  {}  {:>8}  {:>6}  {:>7}  {:>9}",
        pad("Name", name_width),
        "Coasters",
        "Total",
        "Avg",
        "Top 3 Avg"
    );
    let mut lines = vec![
        heading,
        if use_colors {
            format!("{}", header.dimmed())
        } else {
            header
        },
    ];

    for group in groups {
        let name = pad(&truncate_name(&group.name, name_width), name_width);
        let total = format!("{:>6}", group.total_points);
        lines.push(format!(
            "  {}  {:>8}  {}  {:>7}  {:>9}",
            name,
            group.count,
            if use_colors {
                format!("{}", total.bold())
            } else {
                total
            },
            format_number(group.avg),
            format_number(group.top3_avg)
        ));
    }
    lines.join("\n")
}

/// Each group with its member coasters, best first
pub fn format_groups(groups: &[GroupStats], use_colors: bool) -> String {
    if groups.is_empty() {
        return "No coasters yet.".to_string();
    }

    groups
        .iter()
        .map(|group| {
            let summary = format!(
                "{} coaster{} · {} pts",
                group.count,
                if group.count == 1 { "" } else { "s" },
                group.total_points
            );
            let mut lines = vec![if use_colors {
                format!("{}  {}", group.name.bold(), summary.dimmed())
            } else {
                format!("{}  {}", group.name, summary)
            }];
            for member in &group.members {
                let points = if member.ranked {
                    format!("{:>4}", member.points)
                } else {
                    format!("{:>4}", "-")
                };
                lines.push(format!("  {}  {}", points, member.coaster.name));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn medal(place: usize) -> &'static str {
    match place {
        0 => "1st",
        1 => "2nd",
        2 => "3rd",
        _ => "   ",
    }
}

fn format_coaster_podium(standings: &[CoasterStanding], use_colors: bool) -> Vec<String> {
    standings
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let context = context_line(
                s.park.map(|p| p.name.as_str()),
                s.manufacturer.map(|m| m.name.as_str()),
            );
            if use_colors {
                format!(
                    "  {}  {}  {} pts  {}",
                    medal(i).yellow(),
                    s.coaster.name.bold(),
                    s.points,
                    context.dimmed()
                )
            } else {
                format!("  {}  {}  {} pts  {}", medal(i), s.coaster.name, s.points, context)
                    .trim_end()
                    .to_string()
            }
        })
        .collect()
}

fn format_group_podium(groups: &[GroupStats], use_colors: bool) -> Vec<String> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let detail = format!("{} pts · avg {}", g.total_points, format_number(g.avg));
            if use_colors {
                format!("  {}  {}  {}", medal(i).yellow(), g.name.bold(), detail.dimmed())
            } else {
                format!("  {}  {}  {}", medal(i), g.name, detail)
            }
        })
        .collect()
}

/// Home screen: three podiums and the quick stats line
pub fn format_highlights(view: &Highlights, use_colors: bool) -> String {
    let title = |text: &str| {
        if use_colors {
            format!("{}", text.bold().underline())
        } else {
            text.to_string()
        }
    };
    let empty = || vec!["  Rank some coasters to fill this podium.".to_string()];

    let mut sections = Vec::new();

    let mut coasters = vec![title("Top Coasters")];
    if view.coasters.is_empty() {
        coasters.extend(empty());
    } else {
        coasters.extend(format_coaster_podium(&view.coasters, use_colors));
    }
    sections.push(coasters.join("\n"));

    let mut parks = vec![title("Top Parks")];
    if view.parks.is_empty() {
        parks.extend(empty());
    } else {
        parks.extend(format_group_podium(&view.parks, use_colors));
    }
    sections.push(parks.join("\n"));

    let mut manufacturers = vec![title("Top Manufacturers")];
    if view.manufacturers.is_empty() {
        manufacturers.extend(empty());
    } else {
        manufacturers.extend(format_group_podium(&view.manufacturers, use_colors));
    }
    sections.push(manufacturers.join("\n"));

    let stats = view.stats;
    sections.push(format!(
        "{} coasters · {} parks · {} manufacturers · {} ranked",
        stats.coasters, stats.parks, stats.manufacturers, stats.ranked
    ));

    sections.join("\n\n")
}

/// Points for each position of a list of the given size
pub fn format_points_table(table: &[u32]) -> String {
    if table.is_empty() {
        return "An empty list scores nothing.".to_string();
    }
    let width = table.len().to_string().len() + 1;
    table
        .iter()
        .enumerate()
        .map(|(i, points)| format!("{:>width$} {}", format!("{}.", i + 1), points, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Catalog listing: one "name  id  detail" line per record
pub fn format_catalog<'a>(
    records: impl IntoIterator<Item = (&'a str, &'a str, String)>,
    use_colors: bool,
) -> String {
    let lines: Vec<String> = records
        .into_iter()
        .map(|(name, id, detail)| {
            let line = if use_colors {
                format!("{}  {}  {}", name.bold(), id.dimmed(), detail)
            } else {
                format!("{}  {}  {}", name, id, detail)
            };
            line.trim_end().to_string()
        })
        .collect();
    if lines.is_empty() {
        "Nothing here yet.".to_string()
    } else {
        lines.join("\n")
    }
}
