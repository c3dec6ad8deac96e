/// Local validation failures. Raised before any write is attempted; the
/// document being mutated is a scratch copy and is discarded on error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("A {kind} named '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("A coaster named '{name}' already exists at {park}")]
    DuplicateCoaster { name: String, park: String },

    #[error("Unknown park: {0}")]
    UnknownPark(String),

    #[error("Unknown manufacturer: {0}")]
    UnknownManufacturer(String),

    #[error("Unknown coaster: {0}")]
    UnknownCoaster(String),

    #[error("'{key}' matches {count} {kind}s; use the id instead")]
    Ambiguous {
        kind: &'static str,
        key: String,
        count: usize,
    },

    #[error("Coaster is already ranked: {0}")]
    AlreadyRanked(String),

    #[error("Coaster is not ranked: {0}")]
    NotRanked(String),

    #[error("Position {index} is out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}
