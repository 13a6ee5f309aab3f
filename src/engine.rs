//! The organizing engine.
//!
//! One pass over a source directory: enumerate candidate files, consult the
//! content-hash index for duplicates, decide destination paths, move files
//! (or only plan the moves under dry-run), and persist the updated index
//! once at the end.
//!
//! Files are processed sequentially in a deterministic order, so index
//! updates are race-free and the report's action list is stable. A per-file
//! I/O failure is recorded as a skipped entry and never aborts the pass.

use crate::classifier;
use crate::config::CompiledFilters;
use crate::hasher;
use crate::index_store::{HashIndex, INDEX_FILENAME};
use crate::path_resolver;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// How files are grouped below their category directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Group by modification month, `YYYY-MM`.
    Date,
    /// Group by inferred workflow/source bucket.
    Source,
}

/// Options controlling a single organizing pass.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Bucket grouping mode.
    pub sort_mode: SortMode,
    /// Report planned moves without touching the filesystem or the index.
    pub dry_run: bool,
    /// Descend into subdirectories of the source.
    pub recursive: bool,
    /// Skip files already under the destination tree, so repeated passes
    /// (and watch mode) never re-process their own output.
    pub exclude_self: bool,
    /// Leave empty directories behind in the source after the pass.
    pub keep_empty: bool,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::Date,
            dry_run: false,
            recursive: true,
            exclude_self: true,
            keep_empty: false,
        }
    }
}

/// What happened (or would happen) to one candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Relocated to its category/bucket path.
    Moved,
    /// Content already known; parked under `duplicates/`.
    Duplicate,
    /// Left in place because of a per-file error.
    Skipped,
}

/// One entry of the per-file action list in a [`Report`].
#[derive(Debug, Clone)]
pub struct FileAction {
    /// Original path of the file.
    pub source: PathBuf,
    /// Final (or planned) destination; `None` when the file was skipped
    /// before a destination was decided.
    pub destination: Option<PathBuf>,
    /// Outcome for this file.
    pub kind: ActionKind,
    /// Reason the file was skipped, if it was.
    pub error: Option<String>,
}

/// Summary of an organizing pass, returned to the caller.
#[derive(Debug, Default)]
pub struct Report {
    /// Files relocated to category/bucket paths.
    pub moved: usize,
    /// Files routed to `duplicates/`.
    pub duplicates: usize,
    /// Files skipped because of per-file errors.
    pub skipped: usize,
    /// Per-file actions in processing order.
    pub actions: Vec<FileAction>,
    /// Whether this pass was a dry run.
    pub dry_run: bool,
    /// Set when the final index save failed; moves are not rolled back and
    /// a later pass re-derives missing entries by re-hashing.
    pub index_warning: Option<String>,
}

impl Report {
    /// Total number of candidate files processed.
    pub fn total(&self) -> usize {
        self.moved + self.duplicates + self.skipped
    }
}

/// A candidate file observed during enumeration.
///
/// Lives only for the duration of one pass; the content digest is computed
/// separately (and lazily) because hashing is the expensive step.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path of the file in the source tree.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

impl FileRecord {
    /// Reads metadata for a candidate path.
    pub fn new(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified().unwrap_or_else(|_| SystemTime::now()),
        })
    }
}

/// Fatal configuration errors detected before any file is touched.
#[derive(Debug)]
pub enum EngineError {
    /// The source directory does not exist.
    SourceNotFound { path: PathBuf },
    /// The source path exists but is not a directory.
    SourceNotADirectory { path: PathBuf },
    /// Source and destination resolve to the same directory.
    SameSourceAndDestination { path: PathBuf },
    /// The destination root could not be created.
    DestinationUnwritable {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound { path } => {
                write!(f, "Source directory does not exist: {}", path.display())
            }
            Self::SourceNotADirectory { path } => {
                write!(f, "Source path is not a directory: {}", path.display())
            }
            Self::SameSourceAndDestination { path } => {
                write!(
                    f,
                    "Source and destination cannot be the same directory: {}",
                    path.display()
                )
            }
            Self::DestinationUnwritable { path, source } => {
                write!(
                    f,
                    "Failed to create destination root {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Runs organizing passes over a source/destination pair.
///
/// The organizer holds only configuration; all per-pass state (the index,
/// the working set) is created inside [`Organizer::organize`] so passes
/// are independent and repeatable.
pub struct Organizer {
    options: OrganizeOptions,
    filters: CompiledFilters,
}

impl Organizer {
    /// Creates an organizer from options and compiled scan filters.
    pub fn new(options: OrganizeOptions, filters: CompiledFilters) -> Self {
        Self { options, filters }
    }

    /// Runs one organizing pass.
    ///
    /// Loads the index from `<destination>/.organizer_index.json`,
    /// processes every candidate file, and (unless dry-run) saves the
    /// index once at the end and prunes empty source directories.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] only for fatal pre-conditions (missing
    /// source, uncreatable destination, source == destination). Per-file
    /// failures are recorded in the report instead.
    pub fn organize(&self, source: &Path, destination: &Path) -> Result<Report, EngineError> {
        self.organize_with(source, destination, |_| {})
    }

    /// Like [`Organizer::organize`], invoking `on_action` after each file
    /// so callers can display live progress.
    pub fn organize_with<F>(
        &self,
        source: &Path,
        destination: &Path,
        mut on_action: F,
    ) -> Result<Report, EngineError>
    where
        F: FnMut(&FileAction),
    {
        self.check_preconditions(source, destination)?;

        if !self.options.dry_run {
            fs::create_dir_all(destination).map_err(|e| EngineError::DestinationUnwritable {
                path: destination.to_path_buf(),
                source: e,
            })?;
        }

        let index_path = HashIndex::index_path(destination);
        let mut index = HashIndex::load(&index_path);
        let mut seen_this_pass: HashSet<String> = HashSet::new();

        let candidates = self.collect_candidates(source, destination);

        let mut report = Report {
            dry_run: self.options.dry_run,
            ..Report::default()
        };

        for path in candidates {
            let action = self.organize_file(&path, destination, &mut index, &mut seen_this_pass);
            match action.kind {
                ActionKind::Moved => report.moved += 1,
                ActionKind::Duplicate => report.duplicates += 1,
                ActionKind::Skipped => report.skipped += 1,
            }
            on_action(&action);
            report.actions.push(action);
        }

        if !self.options.dry_run {
            if let Err(e) = index.save(&index_path) {
                report.index_warning = Some(e.to_string());
            }
            if !self.options.keep_empty {
                prune_empty_dirs(source);
            }
        }

        Ok(report)
    }

    fn check_preconditions(&self, source: &Path, destination: &Path) -> Result<(), EngineError> {
        if !source.exists() {
            return Err(EngineError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        if !source.is_dir() {
            return Err(EngineError::SourceNotADirectory {
                path: source.to_path_buf(),
            });
        }

        let same = match (fs::canonicalize(source), fs::canonicalize(destination)) {
            (Ok(s), Ok(d)) => s == d,
            _ => source == destination,
        };
        if same {
            return Err(EngineError::SameSourceAndDestination {
                path: source.to_path_buf(),
            });
        }

        Ok(())
    }

    /// Enumerates candidate files in a deterministic order.
    ///
    /// Skips directories on the ignore list, everything under the
    /// destination tree (when `exclude_self`), the index file and its temp
    /// sibling, and anything rejected by the scan filters.
    fn collect_candidates(&self, source: &Path, destination: &Path) -> Vec<PathBuf> {
        let destination =
            fs::canonicalize(destination).unwrap_or_else(|_| destination.to_path_buf());

        let mut walker = WalkDir::new(source).follow_links(false).sort_by_file_name();
        if !self.options.recursive {
            walker = walker.max_depth(1);
        }

        walker
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir()
                        && self
                            .filters
                            .is_ignored_dir(&entry.file_name().to_string_lossy()))
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.is_candidate(path, &destination))
            .collect()
    }

    fn is_candidate(&self, path: &Path, destination: &Path) -> bool {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        // The index and its temp sibling are never organized.
        if file_name.starts_with(INDEX_FILENAME) {
            return false;
        }

        if self.options.exclude_self {
            let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            if resolved.starts_with(destination) {
                return false;
            }
        }

        self.filters.should_include(path)
    }

    /// Decides and (unless dry-run) performs the move for one file.
    fn organize_file(
        &self,
        path: &Path,
        destination: &Path,
        index: &mut HashIndex,
        seen_this_pass: &mut HashSet<String>,
    ) -> FileAction {
        let record = match FileRecord::new(path) {
            Ok(record) => record,
            Err(e) => return skipped(path, format!("Failed to read metadata: {}", e)),
        };

        let digest = match hasher::digest_file(path) {
            Ok(digest) => digest,
            Err(e) => return skipped(path, format!("Failed to hash contents: {}", e)),
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        // Content is a duplicate when its digest was recorded earlier in
        // this pass, or when the index knows it and the recorded copy is
        // still present and is not this very file. A recorded path that no
        // longer exists is stale; the entry is overwritten below so the
        // surviving copy is kept rather than parked under duplicates/.
        let is_duplicate = match index.lookup(&digest) {
            Some(entry) => {
                let known_path = PathBuf::from(&entry.path);
                seen_this_pass.contains(&digest)
                    || (known_path.exists() && !path_resolver::is_same_file(&known_path, path))
            }
            None => false,
        };

        let target = if is_duplicate {
            path_resolver::resolve_duplicate(destination, &file_name)
        } else {
            let category = classifier::classify(path);
            let bucket = match self.options.sort_mode {
                SortMode::Date => classifier::month_bucket(record.modified),
                SortMode::Source => classifier::infer_source_bucket(path).dir_name().to_string(),
            };
            path_resolver::resolve(destination, category.dir_name(), &bucket, &file_name)
        };
        let target = path_resolver::disambiguate(&target, path);

        if !self.options.dry_run
            && let Err(e) = move_file(path, &target)
        {
            return skipped(
                path,
                format!("Failed to move to {}: {}", target.display(), e),
            );
        }

        let kind = if is_duplicate {
            ActionKind::Duplicate
        } else {
            index.record(&digest, &target);
            seen_this_pass.insert(digest);
            ActionKind::Moved
        };

        FileAction {
            source: path.to_path_buf(),
            destination: Some(target),
            kind,
            error: None,
        }
    }
}

fn skipped(path: &Path, reason: String) -> FileAction {
    FileAction {
        source: path.to_path_buf(),
        destination: None,
        kind: ActionKind::Skipped,
        error: Some(reason),
    }
}

/// Moves a file, creating destination directories as needed.
///
/// Falls back to copy-then-remove when the rename crosses filesystems.
fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, target)?;
            fs::remove_file(source)
        }
        Err(e) => Err(e),
    }
}

/// Removes directories left empty under `root`, deepest first.
///
/// The root itself is kept. Non-empty directories fail the removal and are
/// simply left alone.
fn prune_empty_dirs(root: &Path) {
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
    {
        let _ = fs::remove_dir(entry.path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn organizer(options: OrganizeOptions) -> Organizer {
        Organizer::new(options, CompiledFilters::default())
    }

    #[test]
    fn test_moves_file_into_category_and_bucket() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("inbox");
        let destination = temp_dir.path().join("organized");
        fs::create_dir(&source).expect("Failed to create source");
        fs::write(source.join("photo.png"), b"png bytes").expect("Failed to write file");

        let report = organizer(OrganizeOptions::default())
            .organize(&source, &destination)
            .expect("Pass failed");

        assert_eq!(report.moved, 1);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.skipped, 0);

        let action = &report.actions[0];
        assert_eq!(action.kind, ActionKind::Moved);
        let moved_to = action.destination.as_ref().expect("Missing destination");
        assert!(moved_to.exists());
        assert!(moved_to.starts_with(destination.join("images")));
        assert!(!source.join("photo.png").exists());
    }

    #[test]
    fn test_source_mode_uses_source_bucket() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("inbox");
        let destination = temp_dir.path().join("organized");
        fs::create_dir(&source).expect("Failed to create source");
        fs::write(source.join("Screenshot 2024-05-01.png"), b"capture")
            .expect("Failed to write file");

        let options = OrganizeOptions {
            sort_mode: SortMode::Source,
            ..OrganizeOptions::default()
        };
        let report = organizer(options)
            .organize(&source, &destination)
            .expect("Pass failed");

        assert_eq!(report.moved, 1);
        assert!(
            destination
                .join("images")
                .join("screenshots")
                .join("Screenshot 2024-05-01.png")
                .exists()
        );
    }

    #[test]
    fn test_duplicate_content_routed_to_duplicates() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("inbox");
        let destination = temp_dir.path().join("organized");
        fs::create_dir(&source).expect("Failed to create source");
        fs::write(source.join("a-first.txt"), b"identical").expect("Failed to write");
        fs::write(source.join("b-second.txt"), b"identical").expect("Failed to write");

        let report = organizer(OrganizeOptions::default())
            .organize(&source, &destination)
            .expect("Pass failed");

        assert_eq!(report.moved, 1);
        assert_eq!(report.duplicates, 1);
        // Processing order is name-sorted, so a-first wins the canonical spot.
        assert!(
            destination
                .join("duplicates")
                .join("b-second.txt")
                .exists()
        );
    }

    #[test]
    fn test_dry_run_reports_without_touching_anything() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("inbox");
        let destination = temp_dir.path().join("organized");
        fs::create_dir(&source).expect("Failed to create source");
        fs::write(source.join("notes.pdf"), b"pdf").expect("Failed to write");

        let options = OrganizeOptions {
            dry_run: true,
            ..OrganizeOptions::default()
        };
        let report = organizer(options)
            .organize(&source, &destination)
            .expect("Pass failed");

        assert_eq!(report.moved, 1);
        assert!(report.dry_run);
        assert!(source.join("notes.pdf").exists());
        assert!(!destination.exists());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = organizer(OrganizeOptions::default()).organize(
            &temp_dir.path().join("missing"),
            &temp_dir.path().join("organized"),
        );
        assert!(matches!(result, Err(EngineError::SourceNotFound { .. })));
    }

    #[test]
    fn test_same_source_and_destination_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("folder");
        fs::create_dir(&dir).expect("Failed to create dir");

        let result = organizer(OrganizeOptions::default()).organize(&dir, &dir);
        assert!(matches!(
            result,
            Err(EngineError::SameSourceAndDestination { .. })
        ));
    }

    #[test]
    fn test_non_recursive_ignores_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("inbox");
        let destination = temp_dir.path().join("organized");
        fs::create_dir_all(source.join("nested")).expect("Failed to create dirs");
        fs::write(source.join("top.txt"), b"top").expect("Failed to write");
        fs::write(source.join("nested").join("deep.txt"), b"deep").expect("Failed to write");

        let options = OrganizeOptions {
            recursive: false,
            keep_empty: true,
            ..OrganizeOptions::default()
        };
        let report = organizer(options)
            .organize(&source, &destination)
            .expect("Pass failed");

        assert_eq!(report.moved, 1);
        assert!(source.join("nested").join("deep.txt").exists());
    }

    #[test]
    fn test_empty_source_dirs_pruned_after_pass() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("inbox");
        let destination = temp_dir.path().join("organized");
        fs::create_dir_all(source.join("emptied")).expect("Failed to create dirs");
        fs::write(source.join("emptied").join("file.txt"), b"x").expect("Failed to write");

        organizer(OrganizeOptions::default())
            .organize(&source, &destination)
            .expect("Pass failed");

        assert!(!source.join("emptied").exists());
        assert!(source.exists());
    }
}
