//! File classification for the organizer.
//!
//! Maps file extensions to broad categories (e.g., "images", "documents"),
//! infers a workflow/source bucket from filename and path patterns, and
//! derives month buckets from modification times.
//!
//! # Examples
//!
//! ```
//! use tidydesk::classifier::{classify, Category};
//! use std::path::Path;
//!
//! assert_eq!(classify(Path::new("photo.PNG")), Category::Images);
//! assert_eq!(classify(Path::new("notes.md")), Category::Documents);
//! assert_eq!(classify(Path::new("mystery.xyz123")), Category::Other);
//! ```

use std::path::Path;
use std::time::SystemTime;

/// Represents a broad file category.
///
/// Categories name the first level of the organized destination tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Image files (PNG, JPG, HEIC, etc.)
    Images,
    /// Video files (MP4, MKV, MOV, etc.)
    Videos,
    /// Audio files (MP3, FLAC, OGG, etc.)
    Audio,
    /// Document files (PDF, TXT, MD, etc.)
    Documents,
    /// Spreadsheet files (CSV, XLSX, ODS, etc.)
    Spreadsheets,
    /// Presentation files (PPTX, KEY, ODP, etc.)
    Presentations,
    /// Archive files (ZIP, 7Z, TAR, etc.)
    Archives,
    /// Source code and markup files (Rust, Python, HTML, etc.)
    Code,
    /// Executables and scripts (EXE, MSI, PS1, etc.)
    Executables,
    /// Unknown or uncategorized files
    Other,
}

impl Category {
    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidydesk::classifier::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "images");
    /// assert_eq!(Category::Other.dir_name(), "other");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Videos => "videos",
            Category::Audio => "audio",
            Category::Documents => "documents",
            Category::Spreadsheets => "spreadsheets",
            Category::Presentations => "presentations",
            Category::Archives => "archives",
            Category::Code => "code",
            Category::Executables => "executables",
            Category::Other => "other",
        }
    }

    /// Maps a file extension (without the leading dot) to a category.
    ///
    /// Matching is case-insensitive. Unrecognized extensions map to
    /// [`Category::Other`].
    pub fn from_extension(ext: &str) -> Category {
        let ext = ext.to_lowercase();
        for (category, extensions) in EXTENSION_TABLE {
            if extensions.contains(&ext.as_str()) {
                return *category;
            }
        }
        Category::Other
    }
}

/// Static extension lookup table, one row per category.
const EXTENSION_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "heic"],
    ),
    (Category::Videos, &["mp4", "mov", "avi", "mkv", "webm", "wmv"]),
    (Category::Audio, &["mp3", "wav", "flac", "aac", "ogg", "m4a"]),
    (Category::Documents, &["pdf", "txt", "rtf", "md"]),
    (Category::Spreadsheets, &["csv", "xls", "xlsx", "ods"]),
    (Category::Presentations, &["ppt", "pptx", "key", "odp"]),
    (Category::Archives, &["zip", "rar", "7z", "tar", "gz", "bz2"]),
    (
        Category::Code,
        &[
            "py", "js", "ts", "jsx", "tsx", "html", "css", "java", "c", "cpp", "go", "rs", "php",
            "json", "yaml", "yml", "sql",
        ],
    ),
    (Category::Executables, &["exe", "msi", "bat", "cmd", "ps1"]),
];

/// Determines the category for a file from its extension.
///
/// Files without an extension map to [`Category::Other`].
pub fn classify(path: &Path) -> Category {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => Category::from_extension(ext),
        None => Category::Other,
    }
}

/// Represents an inferred workflow or source of a file.
///
/// Buckets name the second level of the destination tree when sorting in
/// source mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceBucket {
    /// Media exported or saved from WhatsApp.
    Whatsapp,
    /// Media exported or saved from Telegram.
    Telegram,
    /// Attachments saved from Discord.
    Discord,
    /// Attachments saved from Slack.
    Slack,
    /// Screen captures.
    Screenshots,
    /// Camera roll exports (IMG_/DSC_/PXL_ prefixes).
    CameraExports,
    /// Files named by a browser download manager.
    BrowserDownloads,
    /// Unfinished browser downloads.
    BrowserPartialDownloads,
    /// Meeting recordings and exports.
    Meetings,
    /// Torrent metadata files.
    Torrent,
    /// No recognizable source.
    Other,
}

impl SourceBucket {
    /// Returns the directory name for this bucket.
    pub fn dir_name(&self) -> &'static str {
        match self {
            SourceBucket::Whatsapp => "whatsapp",
            SourceBucket::Telegram => "telegram",
            SourceBucket::Discord => "discord",
            SourceBucket::Slack => "slack",
            SourceBucket::Screenshots => "screenshots",
            SourceBucket::CameraExports => "camera_exports",
            SourceBucket::BrowserDownloads => "browser_downloads",
            SourceBucket::BrowserPartialDownloads => "browser_partial_downloads",
            SourceBucket::Meetings => "meetings",
            SourceBucket::Torrent => "torrent",
            SourceBucket::Other => "other",
        }
    }
}

/// A single filename/path pattern used by the source heuristics.
///
/// All matching is performed against lowercased inputs.
#[derive(Debug, Clone, Copy)]
pub enum SourcePattern {
    /// Substring match against the filename or any parent path component.
    NameOrParentContains(&'static str),
    /// Prefix match against the filename.
    NameStartsWith(&'static str),
    /// Substring match against the filename.
    NameContains(&'static str),
    /// Exact match against the extension, including the leading dot.
    ExtensionIs(&'static str),
}

impl SourcePattern {
    fn matches(&self, name: &str, parent: &str, extension: &str) -> bool {
        match self {
            SourcePattern::NameOrParentContains(s) => name.contains(s) || parent.contains(s),
            SourcePattern::NameStartsWith(s) => name.starts_with(s),
            SourcePattern::NameContains(s) => name.contains(s),
            SourcePattern::ExtensionIs(s) => extension == *s,
        }
    }
}

/// One ordered heuristic: if any pattern matches, the file belongs to
/// `bucket`.
#[derive(Debug, Clone, Copy)]
pub struct SourceRule {
    /// Patterns tried for this rule; any single match suffices.
    pub any_of: &'static [SourcePattern],
    /// Bucket assigned when the rule matches.
    pub bucket: SourceBucket,
}

/// Ordered source heuristics. Rules are evaluated top to bottom and the
/// first match wins, so messaging-app markers take precedence over the
/// generic screenshot and camera prefixes.
pub const SOURCE_RULES: &[SourceRule] = &[
    SourceRule {
        any_of: &[SourcePattern::NameOrParentContains("whatsapp")],
        bucket: SourceBucket::Whatsapp,
    },
    SourceRule {
        any_of: &[SourcePattern::NameOrParentContains("telegram")],
        bucket: SourceBucket::Telegram,
    },
    SourceRule {
        any_of: &[SourcePattern::NameOrParentContains("discord")],
        bucket: SourceBucket::Discord,
    },
    SourceRule {
        any_of: &[SourcePattern::NameOrParentContains("slack")],
        bucket: SourceBucket::Slack,
    },
    SourceRule {
        any_of: &[
            SourcePattern::NameStartsWith("screenshot"),
            SourcePattern::NameContains("screen shot"),
            SourcePattern::NameStartsWith("snip"),
        ],
        bucket: SourceBucket::Screenshots,
    },
    SourceRule {
        any_of: &[
            SourcePattern::NameStartsWith("img_"),
            SourcePattern::NameStartsWith("dsc_"),
            SourcePattern::NameStartsWith("pxl_"),
        ],
        bucket: SourceBucket::CameraExports,
    },
    SourceRule {
        any_of: &[
            SourcePattern::NameContains("chrome"),
            SourcePattern::NameContains("edge"),
            SourcePattern::NameContains("firefox"),
        ],
        bucket: SourceBucket::BrowserDownloads,
    },
    SourceRule {
        any_of: &[
            SourcePattern::ExtensionIs(".crdownload"),
            SourcePattern::ExtensionIs(".part"),
        ],
        bucket: SourceBucket::BrowserPartialDownloads,
    },
    SourceRule {
        any_of: &[
            SourcePattern::NameContains("zoom"),
            SourcePattern::NameContains("meeting"),
            SourcePattern::NameContains("teams"),
        ],
        bucket: SourceBucket::Meetings,
    },
    SourceRule {
        any_of: &[SourcePattern::ExtensionIs(".torrent")],
        bucket: SourceBucket::Torrent,
    },
];

/// Infers the workflow/source bucket for a file from its name and path.
///
/// Evaluates [`SOURCE_RULES`] in order; the first matching rule wins.
/// Files matching no rule fall back to [`SourceBucket::Other`].
///
/// # Examples
///
/// ```
/// use tidydesk::classifier::{infer_source_bucket, SourceBucket};
/// use std::path::Path;
///
/// let bucket = infer_source_bucket(Path::new("Screenshot 2024-01-05.png"));
/// assert_eq!(bucket, SourceBucket::Screenshots);
/// ```
pub fn infer_source_bucket(path: &Path) -> SourceBucket {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let parent = path
        .parent()
        .map(|p| p.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    for rule in SOURCE_RULES {
        if rule
            .any_of
            .iter()
            .any(|pattern| pattern.matches(&name, &parent, &extension))
        {
            return rule.bucket;
        }
    }
    SourceBucket::Other
}

/// Formats a modification time as a `"YYYY-MM"` month bucket in local time.
pub fn month_bucket(modified: SystemTime) -> String {
    let datetime: chrono::DateTime<chrono::Local> = modified.into();
    datetime.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Images.dir_name(), "images");
        assert_eq!(Category::Videos.dir_name(), "videos");
        assert_eq!(Category::Audio.dir_name(), "audio");
        assert_eq!(Category::Documents.dir_name(), "documents");
        assert_eq!(Category::Spreadsheets.dir_name(), "spreadsheets");
        assert_eq!(Category::Presentations.dir_name(), "presentations");
        assert_eq!(Category::Archives.dir_name(), "archives");
        assert_eq!(Category::Code.dir_name(), "code");
        assert_eq!(Category::Executables.dir_name(), "executables");
        assert_eq!(Category::Other.dir_name(), "other");
    }

    #[test]
    fn test_every_table_extension_maps_to_its_category() {
        for (category, extensions) in EXTENSION_TABLE {
            for ext in *extensions {
                assert_eq!(
                    Category::from_extension(ext),
                    *category,
                    "extension '{}' should map to {:?}",
                    ext,
                    category
                );
            }
        }
    }

    #[test]
    fn test_unknown_extension_is_other() {
        assert_eq!(Category::from_extension("xyz123"), Category::Other);
        assert_eq!(Category::from_extension(""), Category::Other);
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        assert_eq!(Category::from_extension("PNG"), Category::Images);
        assert_eq!(Category::from_extension("Pdf"), Category::Documents);
        assert_eq!(Category::from_extension("ZIP"), Category::Archives);
    }

    #[test]
    fn test_classify_without_extension_is_other() {
        assert_eq!(classify(Path::new("README")), Category::Other);
        assert_eq!(classify(Path::new("archive.")), Category::Other);
    }

    #[test]
    fn test_source_bucket_from_filename_prefix() {
        assert_eq!(
            infer_source_bucket(Path::new("Screenshot 2024-03-01 at 10.15.png")),
            SourceBucket::Screenshots
        );
        assert_eq!(
            infer_source_bucket(Path::new("Snip_001.png")),
            SourceBucket::Screenshots
        );
        assert_eq!(
            infer_source_bucket(Path::new("IMG_2041.jpg")),
            SourceBucket::CameraExports
        );
        assert_eq!(
            infer_source_bucket(Path::new("PXL_20240105_101500.jpg")),
            SourceBucket::CameraExports
        );
    }

    #[test]
    fn test_source_bucket_from_parent_path() {
        assert_eq!(
            infer_source_bucket(Path::new("/downloads/WhatsApp Images/photo.jpg")),
            SourceBucket::Whatsapp
        );
        assert_eq!(
            infer_source_bucket(Path::new("/downloads/Telegram Desktop/file.pdf")),
            SourceBucket::Telegram
        );
    }

    #[test]
    fn test_source_rules_first_match_wins() {
        // A WhatsApp screenshot matches both the whatsapp rule and the
        // screenshot rule; the whatsapp rule is earlier in the table.
        assert_eq!(
            infer_source_bucket(Path::new("whatsapp screenshot 2024.png")),
            SourceBucket::Whatsapp
        );
        // A screenshot named by Chrome matches the screenshot rule before
        // the browser rule.
        assert_eq!(
            infer_source_bucket(Path::new("screenshot from chrome.png")),
            SourceBucket::Screenshots
        );
    }

    #[test]
    fn test_source_bucket_from_extension() {
        assert_eq!(
            infer_source_bucket(Path::new("movie.torrent")),
            SourceBucket::Torrent
        );
        assert_eq!(
            infer_source_bucket(Path::new("big-file.iso.part")),
            SourceBucket::BrowserPartialDownloads
        );
        assert_eq!(
            infer_source_bucket(Path::new("installer.exe.crdownload")),
            SourceBucket::BrowserPartialDownloads
        );
    }

    #[test]
    fn test_source_bucket_fallback_is_other() {
        assert_eq!(
            infer_source_bucket(Path::new("quarterly-report.pdf")),
            SourceBucket::Other
        );
    }

    #[test]
    fn test_month_bucket_shape() {
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let bucket = month_bucket(when);
        assert_eq!(bucket.len(), 7);
        assert_eq!(&bucket[4..5], "-");
        assert!(bucket.starts_with("20"));
    }
}
