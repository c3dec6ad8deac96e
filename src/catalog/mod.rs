//! Parks, manufacturers and coasters: creation, edits and name lookup.
//!
//! Every mutation returns a [`Change`] carrying the affected id and the
//! commit message to record with the save.

pub mod entities;
pub mod lookup;

pub use entities::{
    add_coaster, add_manufacturer, add_park, update_coaster, update_manufacturer, update_park,
    CoasterDraft, ParkDraft,
};
pub use lookup::{resolve_coaster, resolve_manufacturer, resolve_park};

/// Outcome of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Id of the record the mutation touched
    pub subject: String,
    pub message: String,
}

impl Change {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Fresh opaque identifier for a new record.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
