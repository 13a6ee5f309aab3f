//! Scan filtering configuration.
//!
//! Controls which files and directories an organizing pass will even look
//! at. Rules are loaded from a TOML file and compiled once into efficient
//! matchers before the pass starts.
//!
//! # Configuration File Format
//!
//! ```toml
//! [scan]
//! include_hidden = false
//! ignored_dirs = [".git", "__pycache__"]
//!
//! [scan.exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! patterns = ["*.tmp"]
//! extensions = ["bak"]
//! regex = []
//!
//! [scan.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory names that are skipped during recursion out of the box,
/// matched case-insensitively against each path component.
const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "$recycle.bin",
    "system volume information",
    ".git",
    "__pycache__",
];

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at an explicitly requested path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub scan: ScanRules,
}

/// Filtering rules applied during candidate enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRules {
    /// Whether hidden files (leading ".") are organized. Defaults to false.
    #[serde(default)]
    pub include_hidden: bool,

    /// Directory names skipped entirely during recursion.
    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,

    /// Rules for excluding individual files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist rules that override exclusions.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_ignored_dirs() -> Vec<String> {
    DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect()
}

/// Rules for excluding files from organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "bak").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the filename.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Whitelist rules, overriding exclusions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ScanConfig {
    /// Load configuration with fallback to defaults.
    ///
    /// Resolution order:
    /// 1. An explicitly provided path (missing file is then an error)
    /// 2. `.tidydeskrc.toml` in the current directory
    /// 3. `~/.config/tidydesk/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".tidydeskrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("tidydesk")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the rules into matchers for per-file checks.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.scan)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan: ScanRules {
                include_hidden: false,
                ignored_dirs: default_ignored_dirs(),
                exclude: ExcludeRules::default(),
                include: IncludeRules::default(),
            },
        }
    }
}

/// Pre-compiled filter matchers.
///
/// Glob and regex patterns are validated and compiled once here so a pass
/// never reparses a pattern per file.
pub struct CompiledFilters {
    include_hidden: bool,
    ignored_dirs: HashSet<String>,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: ScanRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let include_patterns = rules
            .include
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: rules.include_hidden,
            ignored_dirs: rules
                .ignored_dirs
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Whether a directory component should be skipped entirely.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.contains(&name.to_lowercase())
    }

    /// Check whether a file passes the filters.
    ///
    /// Checks run in this order, with early termination:
    /// 1. Include patterns (whitelist) always win
    /// 2. Hidden files are skipped unless enabled
    /// 3. Exact filename exclusions
    /// 4. Extension exclusions
    /// 5. Glob pattern exclusions
    /// 6. Regex exclusions
    /// 7. Included by default
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.matches_any(&self.include_patterns, file_path) {
            return true;
        }

        if !self.include_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.matches_any(&self.exclude_patterns, file_path) {
            return false;
        }

        if self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
        {
            return false;
        }

        true
    }

    fn matches_any(&self, patterns: &[Pattern], file_path: &Path) -> bool {
        patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        ScanConfig::default()
            .compile()
            .expect("default configuration must compile")
    }
}
