//! Source discovery for ingestion.
//!
//! Reads the best-practices file and walks a code directory, keeping only
//! files whose extension is in a validated [`ExtensionSet`].

use ragpilot_core::{AppError, AppResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Accepted file extensions, normalized to lowercase with a leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

impl ExtensionSet {
    /// Parse a comma-separated list such as `.py,md, .RS`.
    pub fn parse(list: &str) -> AppResult<Self> {
        Self::from_items(list.split(','))
    }

    /// Build from individual entries, validating each one.
    pub fn from_items<I, S>(items: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions = BTreeSet::new();

        for item in items {
            let raw = item.as_ref().trim();
            let bare = raw.strip_prefix('.').unwrap_or(raw);

            if bare.is_empty() {
                return Err(AppError::Config(format!(
                    "Empty entry in extension list: '{}'",
                    item.as_ref()
                )));
            }
            if bare.contains(['.', '/', '\\', '*']) || bare.chars().any(char::is_whitespace) {
                return Err(AppError::Config(format!(
                    "Malformed extension '{}': expected something like '.py'",
                    raw
                )));
            }

            extensions.insert(format!(".{}", bare.to_lowercase()));
        }

        if extensions.is_empty() {
            return Err(AppError::Config("Extension list is empty".to_string()));
        }

        Ok(Self { extensions })
    }

    /// Whether the path's extension is accepted (case-insensitive).
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&format!(".{}", e.to_lowercase())))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl std::fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.iter().collect::<Vec<_>>().join(","))
    }
}

/// A file found under the code root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or root-joined) path on disk
    pub path: PathBuf,

    /// Path relative to the root, `/`-separated
    pub relative: String,
}

/// Walk `root` recursively and return matching files sorted by relative path.
///
/// Hidden entries (names starting with `.`) are skipped below the root.
pub fn discover_files(root: &Path, extensions: &ExtensionSet) -> AppResult<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(AppError::Knowledge(format!(
            "Not a directory: {:?}",
            root
        )));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !extensions.matches(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            relative,
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));

    tracing::debug!(
        "Discovered {} files under {:?} matching {}",
        files.len(),
        root,
        extensions
    );

    Ok(files)
}

/// Read a text file, replacing invalid UTF-8 sequences.
pub fn read_text(path: &Path) -> AppResult<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_normalizes_entries() {
        let set = ExtensionSet::parse(".py, md ,.RS").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![".md", ".py", ".rs"]);
        assert_eq!(set.to_string(), ".md,.py,.rs");
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert!(ExtensionSet::parse("").is_err());
        assert!(ExtensionSet::parse(".py,,.md").is_err());
        assert!(ExtensionSet::parse(".").is_err());
        assert!(ExtensionSet::parse("*.py").is_err());
        assert!(ExtensionSet::parse("src/py").is_err());
        assert!(ExtensionSet::parse("tar.gz").is_err());
        assert!(ExtensionSet::parse("p y").is_err());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let set = ExtensionSet::parse(".py").unwrap();
        assert!(set.matches(Path::new("a/b/foo.py")));
        assert!(set.matches(Path::new("FOO.PY")));
        assert!(!set.matches(Path::new("foo.pyc")));
        assert!(!set.matches(Path::new("Makefile")));
    }

    #[test]
    fn test_discover_files_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("pkg/sub")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("zeta.py"), "z").unwrap();
        std::fs::write(root.join("pkg/sub/alpha.py"), "a").unwrap();
        std::fs::write(root.join("pkg/readme.md"), "r").unwrap();
        std::fs::write(root.join("pkg/data.bin"), "b").unwrap();
        std::fs::write(root.join(".git/hook.py"), "h").unwrap();

        let set = ExtensionSet::parse(".py,.md").unwrap();
        let files = discover_files(root, &set).unwrap();
        let relative: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();

        assert_eq!(relative, vec!["pkg/readme.md", "pkg/sub/alpha.py", "zeta.py"]);
    }

    #[test]
    fn test_discover_files_rejects_missing_dir() {
        let temp = TempDir::new().unwrap();
        let set = ExtensionSet::parse(".py").unwrap();
        assert!(discover_files(&temp.path().join("missing"), &set).is_err());
    }

    #[test]
    fn test_read_text_lossy() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.py");
        std::fs::write(&path, [b'o', b'k', 0xff, b'!']).unwrap();
        assert_eq!(read_text(&path).unwrap(), "ok\u{fffd}!");
    }
}
