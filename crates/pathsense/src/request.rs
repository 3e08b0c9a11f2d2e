//
// request.rs
//
// A single completion request: buffer text, cursor, scope labels and the
// filesystem context needed to resolve paths relative to the edited file.
//

use std::path::{Path, PathBuf};

use ropey::Rope;

/// How the completion request was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationMode {
    /// Triggered while typing
    #[default]
    Automatic,
    /// Explicitly invoked by the user
    Manual,
}

/// Cursor location: 0-based row and 0-based column counted in chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub column: usize,
}

impl Cursor {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Immutable input for one resolution.
///
/// The text is held as a `Rope`, so cloning a request for a spawned task is
/// cheap and never copies the document.
#[derive(Debug, Clone)]
pub struct Request {
    text: Rope,
    pub cursor: Cursor,
    /// Scope labels, outermost first (e.g. `source.js`, `string.quoted.single.js`)
    pub scope_labels: Vec<String>,
    pub activation: ActivationMode,
    /// Path of the file being edited, if it has one on disk
    pub file_path: Option<PathBuf>,
    /// Root directories of the open projects
    pub project_roots: Vec<PathBuf>,
}

impl Request {
    pub fn new(text: Rope, cursor: Cursor) -> Self {
        Self {
            text,
            cursor,
            scope_labels: Vec::new(),
            activation: ActivationMode::Automatic,
            file_path: None,
            project_roots: Vec::new(),
        }
    }

    /// Convenience constructor for callers holding plain text
    pub fn from_text(text: &str, cursor: Cursor) -> Self {
        Self::new(Rope::from_str(text), cursor)
    }

    pub fn with_scopes<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_activation(mut self, activation: ActivationMode) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_project_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.project_roots = roots;
        self
    }

    pub fn text(&self) -> &Rope {
        &self.text
    }

    /// Full text of the cursor's line without its line terminator
    pub fn line_text(&self) -> String {
        if self.cursor.row >= self.text.len_lines() {
            return String::new();
        }
        let line = self.text.line(self.cursor.row).to_string();
        line.trim_end_matches(['\n', '\r']).to_string()
    }

    /// Text from the start of the cursor's line up to the cursor
    pub fn line_prefix(&self) -> String {
        let line = self.line_text();
        let end = char_to_byte(&line, self.cursor.column);
        line[..end].to_string()
    }

    /// Cursor column as a byte offset into `line_text()`
    pub fn cursor_byte(&self) -> usize {
        char_to_byte(&self.line_text(), self.cursor.column)
    }

    /// Directory containing the edited file
    pub fn file_dir(&self) -> Option<&Path> {
        self.file_path.as_deref().and_then(Path::parent)
    }

    /// Root of the open project containing the edited file.
    ///
    /// When several roots contain the file the deepest one wins. A file outside
    /// every root (or an unsaved buffer) falls back to the first root.
    pub fn project_root(&self) -> Option<&Path> {
        let containing = self.file_path.as_deref().and_then(|file| {
            self.project_roots
                .iter()
                .filter(|root| file.starts_with(root))
                .max_by_key(|root| root.components().count())
        });
        containing
            .or_else(|| self.project_roots.first())
            .map(PathBuf::as_path)
    }
}

/// Byte offset of the `char_idx`-th char, clamped to the string length
fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}
