pub mod edits;
pub mod ops;

pub use edits::{rank_coaster, reorder, step, unrank_coaster};
pub use ops::{
    add_to_list, move_entry, normalize_list, nudge, ordered_list, position_of, remove_from_list,
    Direction,
};
