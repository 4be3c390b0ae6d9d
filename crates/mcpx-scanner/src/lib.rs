//! MCPX Scanner - MCP configuration discovery and the canonical model
//!
//! This crate provides the canonical MCP collection model and its validator,
//! per-tool adapters, JSON/YAML codecs, and read-only scanning of each
//! tool's configuration files through an injectable file access layer.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::items_after_statements,
    clippy::single_match_else,
    clippy::match_same_arms,
    clippy::unnecessary_debug_formatting,
    clippy::option_if_let_else,
    clippy::needless_pass_by_value,
    clippy::map_unwrap_or,
    clippy::manual_let_else,
    clippy::unnecessary_wraps,
    clippy::unused_self,
    clippy::cast_precision_loss,
    clippy::format_push_string
)]

pub mod adapter;
pub mod busy;
pub mod canonical;
pub mod dedup;
pub mod error;
pub mod events;
pub mod extract;
pub mod format;
pub mod fs;
pub mod model;
pub mod output;
pub mod profile;
pub mod scan;
pub mod validate;

pub use adapter::{Tool, ToolAdapter};
pub use dedup::{fingerprint, DeduplicationAnalyzer, DuplicateGroup, DuplicateReport};
pub use error::{Result, ScanError};
pub use events::{LogEvent, LogLevel, Logger, NoopLogger, TracingLogger};
pub use extract::ConfidenceTable;
pub use format::{FileFormat, FormatAdapter, Formats};
pub use fs::{FileAccess, LocalFs, MemoryFs};
pub use model::{CodeSnippet, McpCollection, Metadata};
pub use profile::{default_profiles, ToolProfile};
pub use scan::{FoundConfig, LocalToolScanner, ScanProgress, ScanResult, ScanStatus};
pub use validate::{validate_collection, ValidationResult};
