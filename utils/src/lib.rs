//! Small helpers shared between crates within the workspace.

pub mod mpscutil;
