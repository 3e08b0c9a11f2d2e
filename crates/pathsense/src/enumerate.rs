//
// enumerate.rs
//
// Directory enumeration for path suggestions
//

use std::cmp::Ordering;
use std::path::Path;

/// Classification of a raw suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Dir,
    BuiltinModule,
}

/// An unformatted suggestion: one directory entry or builtin module name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSuggestion {
    pub kind: EntryKind,
    pub entry: String,
}

impl RawSuggestion {
    pub fn new(kind: EntryKind, entry: impl Into<String>) -> Self {
        Self {
            kind,
            entry: entry.into(),
        }
    }

    pub fn parent() -> Self {
        Self::new(EntryKind::Dir, PARENT_ENTRY)
    }

    pub fn is_parent(&self) -> bool {
        self.kind == EntryKind::Dir && self.entry == PARENT_ENTRY
    }
}

/// Name of the parent-navigation entry
pub const PARENT_ENTRY: &str = "..";

/// List `search_path` as raw suggestions.
///
/// Entries are stat'ed (following symlinks) and classified as file or
/// directory; entries that fail to stat are skipped. When `extension_filter`
/// is given, files whose extension is not listed are dropped (directories are
/// always kept). The result starts with the `..` entry, followed by the
/// remaining entries in natural order.
///
/// # Errors
/// Returns an error only when the directory itself cannot be read.
pub async fn list_directory(
    search_path: &Path,
    extension_filter: Option<&[&str]>,
) -> std::io::Result<Vec<RawSuggestion>> {
    let mut dir = tokio::fs::read_dir(search_path).await?;
    let mut entries = Vec::new();

    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                log::trace!("Failed to read entry in {}: {}", search_path.display(), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        let metadata = match tokio::fs::metadata(entry.path()).await {
            Ok(m) => m,
            Err(e) => {
                log::trace!("Skipping {:?}: {}", entry.path(), e);
                continue;
            }
        };

        let kind = if metadata.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };

        if kind == EntryKind::File {
            if let Some(filter) = extension_filter {
                if !has_allowed_extension(&name, filter) {
                    continue;
                }
            }
        }

        entries.push(RawSuggestion::new(kind, name));
    }

    sort_entries(&mut entries);
    entries.insert(0, RawSuggestion::parent());
    Ok(entries)
}

/// Check `name` against extensions written with or without the leading dot
pub fn has_allowed_extension(name: &str, filter: &[&str]) -> bool {
    let Some(ext) = Path::new(name).extension() else {
        return false;
    };
    let ext = ext.to_string_lossy();
    filter
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}

/// Sort by entry name in natural order
pub fn sort_entries(entries: &mut [RawSuggestion]) {
    entries.sort_by(|a, b| natural_cmp(&a.entry, &b.entry));
}

/// Natural, case-insensitive ordering: digit runs compare by numeric value,
/// everything else by lowercase char. Ties fall back to a plain comparison
/// so the order is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_digits(&mut left);
                let rn = take_digits(&mut right);
                let ordering = compare_digit_runs(&ln, &rn);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: &[RawSuggestion]) -> Vec<&str> {
        entries.iter().map(|e| e.entry.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_directory_parent_first_then_natural_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file10.js"), "").unwrap();
        fs::write(tmp.path().join("file2.js"), "").unwrap();
        fs::write(tmp.path().join("Beta.js"), "").unwrap();
        fs::create_dir(tmp.path().join("alpha")).unwrap();

        let entries = list_directory(tmp.path(), None).await.unwrap();
        assert_eq!(
            names(&entries),
            vec!["..", "alpha", "Beta.js", "file2.js", "file10.js"]
        );
        assert!(entries[0].is_parent());
        assert_eq!(entries[1].kind, EntryKind::Dir);
        assert_eq!(entries[2].kind, EntryKind::File);
    }

    #[tokio::test]
    async fn test_list_directory_extension_filter_keeps_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.css"), "").unwrap();
        fs::write(tmp.path().join("b.js"), "").unwrap();
        fs::write(tmp.path().join("c.SCSS"), "").unwrap();
        fs::write(tmp.path().join("README"), "").unwrap();
        fs::create_dir(tmp.path().join("styles.js")).unwrap();

        let entries = list_directory(tmp.path(), Some(&[".css", "scss"][..]))
            .await
            .unwrap();
        assert_eq!(names(&entries), vec!["..", "a.css", "c.SCSS", "styles.js"]);
    }

    #[tokio::test]
    async fn test_list_empty_directory_has_only_parent() {
        let tmp = TempDir::new().unwrap();
        let entries = list_directory(tmp.path(), None).await.unwrap();
        assert_eq!(entries, vec![RawSuggestion::parent()]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(list_directory(&tmp.path().join("nope"), None).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("real.js"), "").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("dangling")).unwrap();
        let entries = list_directory(tmp.path(), None).await.unwrap();
        assert_eq!(names(&entries), vec!["..", "real.js"]);
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("a2", "a10"), Ordering::Less);
        assert_eq!(natural_cmp("a010", "a9"), Ordering::Greater);
        assert_eq!(natural_cmp("Zeta", "alpha"), Ordering::Greater);
        assert_eq!(natural_cmp("a", "a.js"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
        // Case-only difference still orders deterministically
        assert_ne!(natural_cmp("Readme", "readme"), Ordering::Equal);
    }

    #[test]
    fn test_has_allowed_extension() {
        assert!(has_allowed_extension("x.less", &["less"]));
        assert!(has_allowed_extension("x.LESS", &[".less"]));
        assert!(!has_allowed_extension("x", &[".less"]));
        assert!(!has_allowed_extension("x.less.bak", &[".less"]));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Sorted entries are non-decreasing under natural order
        #[test]
        fn prop_sorted_entries_non_decreasing(names in prop::collection::vec("[a-zA-Z0-9._-]{1,10}", 0..20)) {
            let mut entries: Vec<RawSuggestion> = names
                .into_iter()
                .map(|n| RawSuggestion::new(EntryKind::File, n))
                .collect();
            sort_entries(&mut entries);
            for pair in entries.windows(2) {
                prop_assert_ne!(natural_cmp(&pair[0].entry, &pair[1].entry), Ordering::Greater);
            }
        }
    }
}
