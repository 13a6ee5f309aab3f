//! Destination path construction and collision handling.
//!
//! Collision checks are purely filesystem-existence based and independent
//! of the content index: two different files sharing a name must both be
//! kept, never overwritten.

use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the destination root where duplicate content is parked.
pub const DUPLICATES_DIR: &str = "duplicates";

/// Builds the normal destination path `destination/category/bucket/filename`.
pub fn resolve(destination: &Path, category: &str, bucket: &str, filename: &str) -> PathBuf {
    destination.join(category).join(bucket).join(filename)
}

/// Builds the duplicates destination path `destination/duplicates/filename`.
pub fn resolve_duplicate(destination: &Path, filename: &str) -> PathBuf {
    destination.join(DUPLICATES_DIR).join(filename)
}

/// Resolves a name collision at `target` without clobbering existing files.
///
/// If `target` already exists on disk and is not `moving` itself, a numeric
/// suffix is appended before the extension (`name (1).ext`, `name (2).ext`,
/// ...) until a free name is found. The suffix goes before the final
/// extension only, so `archive.tar.gz` becomes `archive.tar (1).gz`.
pub fn disambiguate(target: &Path, moving: &Path) -> PathBuf {
    if !target.exists() || is_same_file(target, moving) {
        return target.to_path_buf();
    }

    let parent = target.parent().unwrap_or_else(|| Path::new(""));
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let extension = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{} ({}){}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Whether two paths refer to the same file on disk.
///
/// Falls back to false if either side cannot be canonicalized, in which
/// case callers treat the paths as distinct rather than risk an overwrite.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_builds_category_bucket_path() {
        let path = resolve(Path::new("/dest"), "images", "2024-03", "photo.png");
        assert_eq!(path, Path::new("/dest/images/2024-03/photo.png"));
    }

    #[test]
    fn test_resolve_duplicate_is_flat() {
        let path = resolve_duplicate(Path::new("/dest"), "photo.png");
        assert_eq!(path, Path::new("/dest/duplicates/photo.png"));
    }

    #[test]
    fn test_disambiguate_free_target_unchanged() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("report.txt");
        let moving = temp_dir.path().join("incoming").join("report.txt");

        assert_eq!(disambiguate(&target, &moving), target);
    }

    #[test]
    fn test_disambiguate_appends_numeric_suffix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("report.txt");
        fs::write(&target, "existing").expect("Failed to write existing file");

        let moving = temp_dir.path().join("other-report.txt");
        fs::write(&moving, "incoming").expect("Failed to write moving file");

        let resolved = disambiguate(&target, &moving);
        assert_eq!(resolved, temp_dir.path().join("report (1).txt"));
    }

    #[test]
    fn test_disambiguate_increments_past_taken_suffixes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("report.txt");
        fs::write(&target, "a").expect("Failed to write");
        fs::write(temp_dir.path().join("report (1).txt"), "b").expect("Failed to write");
        fs::write(temp_dir.path().join("report (2).txt"), "c").expect("Failed to write");

        let moving = temp_dir.path().join("new.txt");
        fs::write(&moving, "d").expect("Failed to write");

        let resolved = disambiguate(&target, &moving);
        assert_eq!(resolved, temp_dir.path().join("report (3).txt"));
    }

    #[test]
    fn test_disambiguate_same_file_is_not_a_collision() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("report.txt");
        fs::write(&target, "content").expect("Failed to write");

        assert_eq!(disambiguate(&target, &target), target);
    }

    #[test]
    fn test_disambiguate_without_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("README");
        fs::write(&target, "existing").expect("Failed to write");

        let moving = temp_dir.path().join("incoming-README");
        fs::write(&moving, "incoming").expect("Failed to write");

        let resolved = disambiguate(&target, &moving);
        assert_eq!(resolved, temp_dir.path().join("README (1)"));
    }

    #[test]
    fn test_disambiguate_keeps_final_extension_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("archive.tar.gz");
        fs::write(&target, "existing").expect("Failed to write");

        let moving = temp_dir.path().join("incoming.tar.gz");
        fs::write(&moving, "incoming").expect("Failed to write");

        let resolved = disambiguate(&target, &moving);
        assert_eq!(resolved, temp_dir.path().join("archive.tar (1).gz"));
    }
}
