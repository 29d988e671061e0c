/// Filesystem walker producing scan descriptors.
pub mod walker;

pub use walker::{WalkError, WalkOutput, Walker};
