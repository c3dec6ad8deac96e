pub mod normalize;
pub mod types;

pub use normalize::normalize_document;
pub use types::*;
