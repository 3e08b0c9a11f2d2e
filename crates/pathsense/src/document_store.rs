//
// document_store.rs
//
// Text of the documents open in the editor
//

use std::collections::HashMap;

use ropey::Rope;
use tower_lsp::lsp_types::TextDocumentContentChangeEvent;
use url::Url;

use crate::utf16::utf16_column_to_char_column;

/// One open document
#[derive(Debug, Clone)]
pub struct Document {
    pub contents: Rope,
    pub language_id: String,
    pub version: i32,
}

impl Document {
    pub fn new(text: &str, language_id: &str, version: i32) -> Self {
        Self {
            contents: Rope::from_str(text),
            language_id: language_id.to_string(),
            version,
        }
    }

    /// Apply an incremental (ranged) or full-text change
    pub fn apply_change(&mut self, change: &TextDocumentContentChangeEvent) {
        let Some(range) = change.range else {
            self.contents = Rope::from_str(&change.text);
            return;
        };

        let start_idx = self.position_to_char(range.start.line as usize, range.start.character);
        let end_idx = self
            .position_to_char(range.end.line as usize, range.end.character)
            .max(start_idx);

        self.contents.remove(start_idx..end_idx);
        self.contents.insert(start_idx, &change.text);
    }

    /// Absolute char index of an LSP position, clamped to the document
    fn position_to_char(&self, line: usize, utf16_col: u32) -> usize {
        if line >= self.contents.len_lines() {
            return self.contents.len_chars();
        }
        let line_text = self.contents.line(line).to_string();
        let line_text = line_text.trim_end_matches(['\n', '\r']);
        self.contents.line_to_char(line) + utf16_column_to_char_column(line_text, utf16_col)
    }

    pub fn line(&self, line: usize) -> Option<String> {
        if line >= self.contents.len_lines() {
            return None;
        }
        let text = self.contents.line(line).to_string();
        Some(text.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Open documents keyed by URI
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, uri: Url, text: &str, language_id: &str, version: i32) {
        log::trace!("Opened {} ({})", uri, language_id);
        self.documents
            .insert(uri, Document::new(text, language_id, version));
    }

    pub fn update(&mut self, uri: &Url, changes: &[TextDocumentContentChangeEvent], version: i32) {
        let Some(doc) = self.documents.get_mut(uri) else {
            log::warn!("Change for unopened document {}", uri);
            return;
        };
        for change in changes {
            doc.apply_change(change);
        }
        doc.version = version;
    }

    pub fn close(&mut self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &Url) -> Option<&Document> {
        self.documents.get(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{Position, Range};

    fn change(sl: u32, sc: u32, el: u32, ec: u32, text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range {
                start: Position::new(sl, sc),
                end: Position::new(el, ec),
            }),
            range_length: None,
            text: text.to_string(),
        }
    }

    fn uri() -> Url {
        Url::parse("file:///project/src/main.js").unwrap()
    }

    #[test]
    fn test_incremental_insert() {
        let mut store = DocumentStore::new();
        store.open(uri(), "import x from '';\n", "javascript", 1);
        store.update(&uri(), &[change(0, 15, 0, 15, "./")], 2);
        let doc = store.get(&uri()).unwrap();
        assert_eq!(doc.contents.to_string(), "import x from './';\n");
        assert_eq!(doc.version, 2);
    }

    #[test]
    fn test_utf16_range_after_emoji() {
        let mut doc = Document::new("'😀/a'", "javascript", 1);
        // Replace `a` (UTF-16 column 4)
        doc.apply_change(&change(0, 4, 0, 5, "b"));
        assert_eq!(doc.contents.to_string(), "'😀/b'");
    }

    #[test]
    fn test_multiline_delete() {
        let mut doc = Document::new("a\nb\nc", "javascript", 1);
        doc.apply_change(&change(0, 1, 2, 0, ""));
        assert_eq!(doc.contents.to_string(), "ac");
    }

    #[test]
    fn test_full_sync() {
        let mut doc = Document::new("old", "css", 1);
        doc.apply_change(&TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "@import './'".to_string(),
        });
        assert_eq!(doc.line(0).as_deref(), Some("@import './'"));
        assert_eq!(doc.line(1), None);
    }

    #[test]
    fn test_out_of_range_positions_clamp() {
        let mut doc = Document::new("ab", "javascript", 1);
        doc.apply_change(&change(5, 0, 9, 0, "c"));
        assert_eq!(doc.contents.to_string(), "abc");
    }

    #[test]
    fn test_close() {
        let mut store = DocumentStore::new();
        store.open(uri(), "", "javascript", 1);
        store.close(&uri());
        assert!(store.is_empty());
    }
}
