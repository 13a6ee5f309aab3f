//! tidydesk - a smart file organizer with duplicate detection
//!
//! This library scans a source directory, classifies files by extension,
//! detects duplicate content via a persistent SHA-256 index, and moves
//! files into a structured destination tree. It supports dry-run previews,
//! month or workflow bucketing, and a cancellable watch mode.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod hasher;
pub mod index_store;
pub mod output;
pub mod path_resolver;
pub mod watcher;

pub use classifier::{Category, SourceBucket};
pub use config::{CompiledFilters, ConfigError, ScanConfig};
pub use engine::{
    ActionKind, EngineError, FileAction, OrganizeOptions, Organizer, Report, SortMode,
};
pub use index_store::{HashIndex, INDEX_FILENAME, IndexEntry, IndexError};
pub use watcher::{CancelToken, WatchStats};

pub use cli::{Cli, run_cli};
