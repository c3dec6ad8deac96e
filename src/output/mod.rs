pub mod formatter;

pub use formatter::{
    format_age, format_catalog, format_group_table, format_groups, format_highlights,
    format_number, format_points_table, format_rankings_table, format_rankings_tsv,
    format_unranked, should_use_colors, truncate_name,
};
