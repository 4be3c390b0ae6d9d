//! Writing migrated collections to a tool's configuration files

pub mod write;

pub use write::{target_paths, ApplyError, TargetWriter, WriteReport};
