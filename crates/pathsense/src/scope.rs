//
// scope.rs
//
// Scope selectors and scope-label derivation
//
// A selector is `*`, a single dot-path token such as `.source.js`, or a
// comma-separated list of alternatives where each alternative is a
// whitespace-separated list of tokens. Commas are OR, whitespace is AND.
// A token matches a scope label when all of the token's dot segments occur
// among the label's dot segments, in any order.
//

/// A parsed scope selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeSelector {
    /// `*`: matches every scope set
    Any,
    /// OR over alternatives; each alternative is an AND over tokens, and each
    /// token is its list of dot segments
    Alternatives(Vec<Vec<Vec<String>>>),
}

impl ScopeSelector {
    pub fn parse(selector: &str) -> Self {
        let trimmed = selector.trim();
        if trimmed == "*" {
            return ScopeSelector::Any;
        }

        let alternatives = trimmed
            .split(',')
            .map(|alternative| {
                alternative
                    .split_whitespace()
                    .map(token_segments)
                    .filter(|segments| !segments.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|tokens| !tokens.is_empty())
            .collect();

        ScopeSelector::Alternatives(alternatives)
    }

    /// Check the selector against a scope set (outermost label first).
    ///
    /// An empty selector matches nothing.
    pub fn matches<S: AsRef<str>>(&self, scope_labels: &[S]) -> bool {
        match self {
            ScopeSelector::Any => true,
            ScopeSelector::Alternatives(alternatives) => alternatives.iter().any(|tokens| {
                tokens.iter().all(|token| {
                    scope_labels
                        .iter()
                        .any(|label| token_matches_label(token, label.as_ref()))
                })
            }),
        }
    }
}

/// One-shot helper: parse `selector` and match it against `scope_labels`
pub fn matches<S: AsRef<str>>(selector: &str, scope_labels: &[S]) -> bool {
    ScopeSelector::parse(selector).matches(scope_labels)
}

fn token_segments(token: &str) -> Vec<String> {
    token
        .trim_start_matches('.')
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn token_matches_label(token: &[String], label: &str) -> bool {
    let label_segments: Vec<&str> = label.split('.').collect();
    token
        .iter()
        .all(|segment| label_segments.contains(&segment.as_str()))
}

// ============================================================================
// Scope label derivation
// ============================================================================

/// Root scope for an LSP language id, e.g. `javascript` -> `source.js`
pub fn root_scope_for_language(language_id: &str) -> &'static str {
    match language_id {
        "javascript" => "source.js",
        "javascriptreact" => "source.js.jsx",
        "typescript" => "source.ts",
        "typescriptreact" => "source.tsx",
        "css" => "source.css",
        "scss" => "source.css.scss",
        "less" => "source.css.less",
        "sass" => "source.sass",
        "json" | "jsonc" => "source.json",
        "html" => "text.html.basic",
        "markdown" => "text.md",
        _ => "text.plain",
    }
}

/// Languages where `//` starts a line comment
fn has_slash_comments(language_id: &str) -> bool {
    matches!(
        language_id,
        "javascript"
            | "javascriptreact"
            | "typescript"
            | "typescriptreact"
            | "scss"
            | "sass"
            | "less"
            | "jsonc"
    )
}

/// Derive scope labels for a cursor position.
///
/// Produces the language root scope, then a comment scope when the cursor
/// follows a line comment marker (only in languages with `//` comments), or
/// else a string scope when the cursor sits inside an unterminated quoted
/// literal on the current line.
pub fn derive_scope_labels(language_id: &str, line_prefix: &str) -> Vec<String> {
    let root = root_scope_for_language(language_id);
    let suffix = root.rsplit('.').next().unwrap_or("plain");
    let mut labels = vec![root.to_string()];

    if has_slash_comments(language_id) && has_line_comment(line_prefix) {
        labels.push(format!("comment.line.{}", suffix));
    } else if let Some((_, quote)) = crate::extract::open_string_literal(line_prefix) {
        let kind = match quote {
            '\'' => "string.quoted.single",
            '"' => "string.quoted.double",
            _ => "string.template",
        };
        labels.push(format!("{}.{}", kind, suffix));
    }

    labels
}

/// True when a `//` outside any quoted literal precedes the cursor
fn has_line_comment(line_prefix: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev = '\0';
    for c in line_prefix.chars() {
        if escaped {
            escaped = false;
            prev = c;
            continue;
        }
        match quote {
            Some(q) => {
                if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '/' && prev == '/' {
                    return true;
                }
                if matches!(c, '\'' | '"' | '`') {
                    quote = Some(c);
                }
            }
        }
        prev = c;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_matches_everything() {
        assert!(matches("*", &["source.js"]));
        assert!(matches(" * ", &Vec::<String>::new()));
    }

    #[test]
    fn test_single_token_with_leading_dot() {
        assert!(matches(".source.js", &["source.js", "string.quoted.single.js"]));
        assert!(matches("source.js", &["source.js"]));
        assert!(!matches(".source.ts", &["source.js"]));
    }

    #[test]
    fn test_token_segments_are_order_independent_subset() {
        // `string.js` segments are both present in the label, non-contiguously
        assert!(matches(".string.js", &["string.quoted.single.js"]));
        assert!(matches(".js.string", &["string.quoted.single.js"]));
        assert!(!matches(".string.ts", &["string.quoted.single.js"]));
    }

    #[test]
    fn test_whitespace_is_and_across_labels() {
        let scopes = ["source.js", "string.quoted.double.js"];
        assert!(matches(".source.js .string.quoted", &scopes));
        assert!(!matches(".source.css .string.quoted", &scopes));
    }

    #[test]
    fn test_comma_is_or() {
        let scopes = ["source.css.scss"];
        assert!(matches(".source.css, .source.sass", &scopes));
        assert!(matches(".source.sass, .source.css", &scopes));
        assert!(!matches(".source.sass, .source.less", &scopes));
    }

    #[test]
    fn test_empty_selector_matches_nothing() {
        assert!(!matches("", &["source.js"]));
        assert!(!matches(" , ", &["source.js"]));
    }

    #[test]
    fn test_parsed_selector_is_reusable() {
        let selector = ScopeSelector::parse(".source.js .string, .source.ts .string");
        assert!(selector.matches(&["source.ts", "string.template.ts"]));
        assert!(!selector.matches(&["source.ts"]));
    }

    #[test]
    fn test_root_scope_for_language() {
        assert_eq!(root_scope_for_language("javascript"), "source.js");
        assert_eq!(root_scope_for_language("scss"), "source.css.scss");
        assert_eq!(root_scope_for_language("rust"), "text.plain");
    }

    #[test]
    fn test_derive_scope_labels_inside_string() {
        assert_eq!(
            derive_scope_labels("javascript", "import fs from '"),
            vec!["source.js", "string.quoted.single.js"]
        );
        assert_eq!(
            derive_scope_labels("typescript", "const p = `./"),
            vec!["source.ts", "string.template.ts"]
        );
        assert_eq!(
            derive_scope_labels("scss", "@use \"part"),
            vec!["source.css.scss", "string.quoted.double.scss"]
        );
    }

    #[test]
    fn test_derive_scope_labels_outside_string() {
        assert_eq!(
            derive_scope_labels("javascript", "import fs from './a';"),
            vec!["source.js"]
        );
    }

    #[test]
    fn test_derive_scope_labels_comment() {
        assert_eq!(
            derive_scope_labels("javascript", "x(); // see ./docs"),
            vec!["source.js", "comment.line.js"]
        );
        // Quotes inside a comment do not open a literal
        assert_eq!(
            derive_scope_labels("javascript", "// see './"),
            vec!["source.js", "comment.line.js"]
        );
        // `//` inside a literal is not a comment
        assert_eq!(
            derive_scope_labels("javascript", "fetch('http://x'); y"),
            vec!["source.js"]
        );
        assert_eq!(
            derive_scope_labels("scss", "a { } // @use './"),
            vec!["source.css.scss", "comment.line.scss"]
        );
    }

    #[test]
    fn test_css_has_no_line_comments() {
        assert_eq!(
            derive_scope_labels("css", "a { background: url(http://x) } @import './"),
            vec!["source.css", "string.quoted.single.css"]
        );
        assert_eq!(
            derive_scope_labels("css", "a { } // not a comment './"),
            vec!["source.css", "string.quoted.single.css"]
        );
    }
}
