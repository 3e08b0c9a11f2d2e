//
// search_path.rs
//
// Resolve the directory to list from arbitrary text before the cursor
//
// A line can hold several path-shaped substrings, so resolution walks the
// path-start tokens (`/`, `./`, `../`) from the one closest to the cursor
// back towards the start of the line, probing the filesystem for each and
// stopping at the first candidate that names (or sits inside) a real
// directory.
//
// Probe policy for a candidate `full = normalize(base + candidate)`:
// - existing file: list its parent
// - existing directory, candidate ends with `/`: list it
// - existing directory without a trailing `/`: list its parent, never
//   descend automatically
// - missing, no trailing `/`: list the parent if that is a directory
//   (completion of a partially typed name), otherwise backtrack
// - missing with a trailing `/`: backtrack
//

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::request::Request;

/// Upper bound on candidates tried for one resolution
pub const MAX_CANDIDATES: usize = 64;

/// A validated search location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    /// Directory the candidate was resolved against (file dir or project root)
    pub base_path: PathBuf,
    /// Existing directory to enumerate
    pub search_path: PathBuf,
    /// The candidate text, starting at its path-start token
    pub test_path: String,
}

/// Filesystem anchors for relative (`./`, `../`) and rooted (`/`) candidates
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    pub file_dir: Option<PathBuf>,
    pub project_root: Option<PathBuf>,
}

impl ResolveContext {
    pub fn from_request(request: &Request) -> Self {
        Self {
            file_dir: request.file_dir().map(Path::to_path_buf),
            project_root: request.project_root().map(Path::to_path_buf),
        }
    }

    fn base_for(&self, candidate: &str) -> Option<&Path> {
        if candidate.starts_with('/') {
            self.project_root.as_deref()
        } else {
            self.file_dir.as_deref()
        }
    }
}

/// Resolve `test_path` against the request's file and project.
///
/// Returns `None` when no candidate leads to an existing directory.
pub fn resolve_search_path(request: &Request, test_path: &str) -> Option<SearchPath> {
    resolve_with_context(&ResolveContext::from_request(request), test_path)
}

/// Resolve `test_path` against explicit anchors
pub fn resolve_with_context(ctx: &ResolveContext, test_path: &str) -> Option<SearchPath> {
    let starts = path_start_offsets(test_path);
    if starts.is_empty() {
        log::trace!("resolve_search_path: no path-start token in {:?}", test_path);
        return None;
    }

    for (iteration, &start) in starts.iter().rev().take(MAX_CANDIDATES).enumerate() {
        let candidate = &test_path[start..];
        let Some(base) = ctx.base_for(candidate) else {
            log::trace!(
                "resolve_search_path: no base directory for {:?} (iteration {})",
                candidate,
                iteration
            );
            continue;
        };

        if let Some(search_path) = probe_candidate(base, candidate) {
            log::trace!(
                "resolve_search_path: {:?} -> {:?} after {} backtrack(s)",
                candidate,
                search_path,
                iteration
            );
            return Some(SearchPath {
                base_path: base.to_path_buf(),
                search_path,
                test_path: candidate.to_string(),
            });
        }
    }

    log::trace!("resolve_search_path: exhausted candidates for {:?}", test_path);
    None
}

/// Apply the probe policy to one candidate
fn probe_candidate(base: &Path, candidate: &str) -> Option<PathBuf> {
    let full = normalize_path(&base.join(candidate.trim_start_matches('/')))?;
    let trailing_separator = candidate.ends_with('/');

    match probe(&full) {
        Probe::File => full.parent().map(Path::to_path_buf),
        Probe::Dir if trailing_separator => Some(full),
        Probe::Dir => full.parent().map(Path::to_path_buf),
        Probe::Missing if trailing_separator => None,
        Probe::Missing => {
            let parent = full.parent()?;
            match probe(parent) {
                Probe::Dir => Some(parent.to_path_buf()),
                _ => None,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    File,
    Dir,
    Missing,
}

/// Synchronous metadata probe; errors count as missing
fn probe(path: &Path) -> Probe {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Probe::Dir,
        Ok(_) => Probe::File,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                log::warn!("Failed to stat {}: {}", path.display(), e);
            }
            Probe::Missing
        }
    }
}

// ============================================================================
// Path-start scanning
// ============================================================================

/// Byte offsets of every path-start token (`/`, `./`, `../`) that begins a
/// path, in ascending order.
///
/// A token only begins a path when it is at the start of the text or follows a
/// character that cannot be part of a path (quote, whitespace, bracket,
/// operator). This keeps the separators inside `../a/b` from being treated as
/// independent rooted paths.
pub fn path_start_offsets(text: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut prev: Option<char> = None;

    for (idx, c) in text.char_indices() {
        let at_boundary = prev.map_or(true, |p| !is_path_char(p));
        if at_boundary {
            let rest = &text[idx..];
            if rest.starts_with("../") || rest.starts_with("./") || rest.starts_with('/') {
                offsets.push(idx);
            }
        }
        prev = Some(c);
    }

    offsets
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '~' | '@' | '$' | '+' | '%' | '#' | '!')
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root. Returns `None` for an empty result.
pub fn normalize_path(path: &Path) -> Option<PathBuf> {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
            Component::CurDir => {}
            c => components.push(c),
        }
    }

    if components.is_empty() {
        return None;
    }

    let mut result = PathBuf::new();
    for c in components {
        result.push(c);
    }
    Some(result)
}

// ============================================================================
// Tests
// ============================================================================
