//
// format.rs
//
// Formatting raw directory entries into suggestion records
//
// `text` is what gets inserted into the source, so quote characters matching
// the enclosing literal are escaped there; `display_text` shows the name as it
// is on disk.
//

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::enumerate::{EntryKind, RawSuggestion};
use crate::extract::escape_quotes;
use crate::search_path::normalize_path;

/// What a suggestion refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    File,
    Directory,
    Module,
}

/// A suggestion ready for the host editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSuggestion {
    /// Unescaped label shown to the user
    pub display_text: String,
    /// Escaped text inserted in place of `replacement_prefix`
    pub text: String,
    /// Escaped text before the cursor that the insertion replaces
    pub replacement_prefix: String,
    pub kind: SuggestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One provider's unformatted result
#[derive(Debug, Clone)]
pub struct RawListing {
    /// Directory the entries came from (absent for builtin-only results)
    pub directory: Option<PathBuf>,
    /// Unescaped path text typed so far
    pub typed: String,
    /// Delimiting quote of the literal being completed
    pub quote: Option<char>,
    pub entries: Vec<RawSuggestion>,
}

impl RawListing {
    /// The escaped final segment of the typed text
    fn replacement_prefix(&self) -> String {
        let segment = match self.typed.rfind('/') {
            Some(idx) => &self.typed[idx + 1..],
            None => self.typed.as_str(),
        };
        escape_quotes(segment, self.quote)
    }

    fn full_path(&self, entry: &str) -> Option<String> {
        let dir = self.directory.as_deref()?;
        let joined = normalize_path(&dir.join(entry)).unwrap_or_else(|| dir.join(entry));
        Some(joined.display().to_string())
    }
}

/// Formatter per content family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formatter {
    #[default]
    Default,
    ModuleSpecifier,
    Stylesheet,
}

impl Formatter {
    pub fn format(&self, listing: &RawListing) -> Vec<FormattedSuggestion> {
        let replacement_prefix = listing.replacement_prefix();
        listing
            .entries
            .iter()
            .map(|raw| {
                let mut suggestion = base_suggestion(raw, listing, &replacement_prefix);
                match self {
                    Formatter::Default => decorate_default(&mut suggestion, listing),
                    Formatter::ModuleSpecifier => decorate_module(&mut suggestion, raw),
                    Formatter::Stylesheet => decorate_stylesheet(&mut suggestion, raw),
                }
                suggestion
            })
            .collect()
    }
}

fn base_suggestion(
    raw: &RawSuggestion,
    listing: &RawListing,
    replacement_prefix: &str,
) -> FormattedSuggestion {
    let (display_text, kind, icon) = match raw.kind {
        EntryKind::Dir => (format!("{}/", raw.entry), SuggestionKind::Directory, "folder"),
        EntryKind::File => (raw.entry.clone(), SuggestionKind::File, "file"),
        EntryKind::BuiltinModule => (raw.entry.clone(), SuggestionKind::Module, "package"),
    };

    let description = match raw.kind {
        EntryKind::BuiltinModule => None,
        _ => listing.full_path(&raw.entry),
    };

    FormattedSuggestion {
        text: escape_quotes(&display_text, listing.quote),
        display_text,
        replacement_prefix: replacement_prefix.to_string(),
        kind,
        description,
        right_label: None,
        icon: Some(icon.to_string()),
    }
}

fn decorate_default(suggestion: &mut FormattedSuggestion, listing: &RawListing) {
    let label = if listing.typed.starts_with('.') {
        "relative"
    } else if listing.typed.starts_with('/') {
        "project"
    } else {
        "local"
    };
    suggestion.right_label = Some(label.to_string());
}

fn decorate_module(suggestion: &mut FormattedSuggestion, raw: &RawSuggestion) {
    match raw.kind {
        EntryKind::BuiltinModule => {
            suggestion.right_label = Some("built-in module".to_string());
            suggestion.description = Some(format!("Built-in module '{}'", raw.entry));
        }
        EntryKind::Dir => {
            suggestion.kind = SuggestionKind::Module;
            suggestion.icon = Some("package".to_string());
            suggestion.right_label = Some("dependency".to_string());
        }
        EntryKind::File => {
            suggestion.right_label = Some("dependency".to_string());
        }
    }
}

fn decorate_stylesheet(suggestion: &mut FormattedSuggestion, raw: &RawSuggestion) {
    let label = match raw.kind {
        EntryKind::Dir => "directory",
        _ if is_sass_partial(&raw.entry) => "partial",
        _ => "stylesheet",
    };
    suggestion.right_label = Some(label.to_string());
}

/// `_name.scss` / `_name.sass`
fn is_sass_partial(name: &str) -> bool {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    name.starts_with('_') && matches!(ext.as_deref(), Some("scss" | "sass"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::unescape_quotes;
    use proptest::prelude::*;

    fn listing(typed: &str, quote: Option<char>, entries: Vec<RawSuggestion>) -> RawListing {
        RawListing {
            directory: Some(PathBuf::from("/project/src")),
            typed: typed.to_string(),
            quote,
            entries,
        }
    }

    #[test]
    fn test_default_formatting() {
        let l = listing(
            "./li",
            Some('\''),
            vec![
                RawSuggestion::parent(),
                RawSuggestion::new(EntryKind::Dir, "lib"),
                RawSuggestion::new(EntryKind::File, "index.js"),
            ],
        );
        let out = Formatter::Default.format(&l);
        let display: Vec<_> = out.iter().map(|s| s.display_text.as_str()).collect();
        assert_eq!(display, vec!["../", "lib/", "index.js"]);
        assert!(out.iter().all(|s| s.replacement_prefix == "li"));
        assert_eq!(out[0].description.as_deref(), Some("/project"));
        assert_eq!(out[1].kind, SuggestionKind::Directory);
        assert_eq!(out[1].description.as_deref(), Some("/project/src/lib"));
        assert_eq!(out[2].icon.as_deref(), Some("file"));
        assert!(out
            .iter()
            .all(|s| s.right_label.as_deref() == Some("relative")));
    }

    #[test]
    fn test_quote_escaping_in_text_only() {
        let l = listing(
            "../it's/",
            Some('\''),
            vec![RawSuggestion::new(EntryKind::Dir, "o'clock")],
        );
        let out = Formatter::Default.format(&l);
        assert_eq!(out[0].display_text, "o'clock/");
        assert_eq!(out[0].text, r"o\'clock/");
        assert_eq!(out[0].replacement_prefix, "");

        let l = listing("./it's", Some('\''), vec![]);
        assert_eq!(l.replacement_prefix(), r"it\'s");
    }

    #[test]
    fn test_other_quote_is_not_escaped() {
        let l = listing(
            "./",
            Some('"'),
            vec![RawSuggestion::new(EntryKind::File, "it's.js")],
        );
        let out = Formatter::Default.format(&l);
        assert_eq!(out[0].text, "it's.js");
    }

    #[test]
    fn test_backslash_before_quote_survives_unescape() {
        let l = listing(
            "./",
            Some('\''),
            vec![RawSuggestion::new(EntryKind::File, r#"a\"b.js"#)],
        );
        let out = Formatter::Default.format(&l);
        assert_eq!(out[0].display_text, r#"a\"b.js"#);
        assert_eq!(out[0].text, r#"a\\"b.js"#);
        assert_eq!(unescape_quotes(&out[0].text), out[0].display_text);
    }

    #[test]
    fn test_default_labels() {
        let entries = vec![RawSuggestion::new(EntryKind::File, "a.js")];
        let label = |typed: &str| {
            Formatter::Default.format(&listing(typed, None, entries.clone()))[0]
                .right_label
                .clone()
        };
        assert_eq!(label("/assets/").as_deref(), Some("project"));
        assert_eq!(label("../").as_deref(), Some("relative"));
        assert_eq!(label("a").as_deref(), Some("local"));
    }

    #[test]
    fn test_module_formatting() {
        let l = RawListing {
            directory: None,
            typed: "pa".to_string(),
            quote: Some('\''),
            entries: vec![
                RawSuggestion::new(EntryKind::BuiltinModule, "path"),
                RawSuggestion::new(EntryKind::Dir, "package-a"),
            ],
        };
        let out = Formatter::ModuleSpecifier.format(&l);
        assert_eq!(out[0].display_text, "path");
        assert_eq!(out[0].kind, SuggestionKind::Module);
        assert_eq!(out[0].right_label.as_deref(), Some("built-in module"));
        assert_eq!(out[0].replacement_prefix, "pa");
        assert_eq!(out[1].display_text, "package-a/");
        assert_eq!(out[1].kind, SuggestionKind::Module);
        assert_eq!(out[1].right_label.as_deref(), Some("dependency"));
        assert_eq!(out[1].description, None);
    }

    #[test]
    fn test_stylesheet_formatting() {
        let l = listing(
            "./",
            Some('"'),
            vec![
                RawSuggestion::new(EntryKind::File, "_vars.scss"),
                RawSuggestion::new(EntryKind::File, "main.css"),
                RawSuggestion::new(EntryKind::Dir, "themes"),
            ],
        );
        let out = Formatter::Stylesheet.format(&l);
        let labels: Vec<_> = out.iter().map(|s| s.right_label.as_deref()).collect();
        assert_eq!(
            labels,
            vec![Some("partial"), Some("stylesheet"), Some("directory")]
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let l = listing("", None, vec![RawSuggestion::new(EntryKind::File, "a.js")]);
        let value = serde_json::to_value(&Formatter::Default.format(&l)[0]).unwrap();
        assert_eq!(value["displayText"], "a.js");
        assert_eq!(value["replacementPrefix"], "");
        assert_eq!(value["kind"], "file");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// `text` unescapes back to the display text for file and dir entries
        #[test]
        fn prop_text_unescapes_to_display(name in "[a-zA-Z0-9_'\"`\\\\ .-]{1,12}", is_dir in proptest::bool::ANY) {
            let kind = if is_dir { EntryKind::Dir } else { EntryKind::File };
            let l = listing("./", Some('\''), vec![RawSuggestion::new(kind, name.clone())]);
            let s = &Formatter::Default.format(&l)[0];
            prop_assert_eq!(unescape_quotes(&s.text), s.display_text.clone());
            let expected = if is_dir { format!("{}/", name) } else { name };
            prop_assert_eq!(s.text.clone(), escape_quotes(&expected, Some('\'')));
        }
    }
}
