//
// extract.rs
//
// Path token extraction from the text before the cursor
//
// Four pattern families pull the path-shaped candidate out of a line:
// 1. Plain: the content of the open literal, or the whole prefix outside one
// 2. Module specifier: the quoted argument of import/require/from
// 3. Stylesheet import: one quoted alternative of an @import/@use/@forward list
// 4. Array literal: the open quoted element of a `[ ... ]` list
//
// Quote escapes (`\'`, `\"`) and doubled backslashes are normalized in every
// extracted candidate, so a path such as `esca\'ped_dir` is looked up on disk
// as `esca'ped_dir`.
//

use regex::Regex;
use std::sync::OnceLock;

/// Which pattern produced a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Plain,
    ModuleSpecifier,
    StylesheetImport,
    ArrayLiteral,
}

/// A path-shaped substring of the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathToken {
    /// Candidate text from its start up to the cursor, quote escapes normalized
    pub text: String,
    /// Byte offset in the line where the (escaped) candidate starts
    pub start: usize,
    pub kind: PatternKind,
    /// Delimiting quote of the enclosing literal, when known
    pub quote: Option<char>,
}

/// Extract candidate tokens for `kind` from `line`, with the cursor at byte
/// offset `cursor` (clamped to the line length).
pub fn extract_tokens(kind: PatternKind, line: &str, cursor: usize) -> Vec<PathToken> {
    let cursor = floor_char_boundary(line, cursor.min(line.len()));
    let prefix = &line[..cursor];

    let token = match kind {
        PatternKind::Plain => Some(plain_token(prefix)),
        PatternKind::ModuleSpecifier => module_specifier_token(prefix),
        PatternKind::StylesheetImport => stylesheet_import_token(line, cursor),
        PatternKind::ArrayLiteral => array_literal_token(prefix),
    };

    token.into_iter().collect()
}

/// A candidate never spans a closed literal: inside an open literal only its
/// content counts
fn plain_token(prefix: &str) -> PathToken {
    let (start, quote) = match open_string_literal(prefix) {
        Some((start, quote)) => (start, Some(quote)),
        None => (0, None),
    };
    PathToken {
        text: unescape_quotes(&prefix[start..]),
        start,
        kind: PatternKind::Plain,
        quote,
    }
}

fn module_specifier_token(prefix: &str) -> Option<PathToken> {
    let (content_start, quote) = open_string_literal(prefix)?;
    let before = unescape_quotes(&prefix[..content_start - quote.len_utf8()]);
    if !patterns().module_call.is_match(&before) {
        return None;
    }

    Some(PathToken {
        text: unescape_quotes(&prefix[content_start..]),
        start: content_start,
        kind: PatternKind::ModuleSpecifier,
        quote: Some(quote),
    })
}

fn stylesheet_import_token(line: &str, cursor: usize) -> Option<PathToken> {
    for caps in patterns().stylesheet_import.captures_iter(line) {
        let Some(args) = caps.get(1) else {
            continue;
        };
        if cursor < args.start() || cursor > args.end() {
            continue;
        }

        // Pick the quoted alternative whose span contains the cursor
        let alternative = quoted_spans(args.as_str())
            .into_iter()
            .map(|(start, end, quote)| (args.start() + start, args.start() + end, quote))
            .find(|(start, end, _)| *start <= cursor && cursor <= *end);

        if let Some((start, _, quote)) = alternative {
            return Some(PathToken {
                text: unescape_quotes(&line[start..cursor]),
                start,
                kind: PatternKind::StylesheetImport,
                quote: Some(quote),
            });
        }
    }

    log::trace!("stylesheet_import_token: no alternative contains byte {}", cursor);
    None
}

fn array_literal_token(prefix: &str) -> Option<PathToken> {
    let caps = patterns().array_literal.captures(prefix)?;
    let items = caps.get(1)?;
    let (content_start, quote) = open_string_literal(items.as_str())?;
    let start = items.start() + content_start;

    Some(PathToken {
        text: unescape_quotes(&prefix[start..]),
        start,
        kind: PatternKind::ArrayLiteral,
        quote: Some(quote),
    })
}

// ============================================================================
// Quote scanning
// ============================================================================

/// If the text ends inside an unterminated quoted literal, return the byte
/// offset where the literal's content starts (just after the opening quote)
/// and the quote character. Backslash escapes are honored.
pub fn open_string_literal(text: &str) -> Option<(usize, char)> {
    let mut open: Option<(usize, char)> = None;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match open {
            Some((_, quote)) => {
                if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    open = None;
                }
            }
            None => {
                if is_quote(c) {
                    open = Some((idx + c.len_utf8(), c));
                }
            }
        }
    }

    open
}

/// Spans of the quoted literals in `text` as `(content_start, content_end,
/// quote)`. An unterminated literal runs to the end of `text`.
fn quoted_spans(text: &str) -> Vec<(usize, usize, char)> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, char)> = None;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match open {
            Some((start, quote)) => {
                if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    spans.push((start, idx, quote));
                    open = None;
                }
            }
            None => {
                if is_quote(c) {
                    open = Some((idx + c.len_utf8(), c));
                }
            }
        }
    }

    if let Some((start, quote)) = open {
        spans.push((start, text.len(), quote));
    }
    spans
}

fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`')
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

// ============================================================================
// Escaping
// ============================================================================

/// Replace `\'`, `\"`, `` \` `` and `\\` with the bare character; other
/// backslashes are kept
pub fn unescape_quotes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if is_quote(next) || next == '\\' {
                    result.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        result.push(c);
    }

    result
}

/// Backslash-escape `quote` in `s`. With no known quote, both `'` and `"` are
/// escaped. A backslash is doubled when it precedes a quote or another
/// backslash, so `unescape_quotes` restores `s` exactly.
pub fn escape_quotes(s: &str, quote: Option<char>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        let needs_escape = match c {
            '\\' => chars.peek().is_some_and(|&next| next == '\\' || is_quote(next)),
            _ => match quote {
                Some(q) => c == q,
                None => c == '\'' || c == '"',
            },
        };
        if needs_escape {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

// ============================================================================
// Regex Patterns
// ============================================================================

struct TokenPatterns {
    /// Text immediately before a module specifier's opening quote
    module_call: Regex,
    /// `@import`-style rule; group 1 is the argument list up to `;` or line end
    stylesheet_import: Regex,
    /// Unclosed `[` list at the end of the prefix; group 1 is its items
    array_literal: Regex,
}

fn patterns() -> &'static TokenPatterns {
    static PATTERNS: OnceLock<TokenPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TokenPatterns {
        module_call: Regex::new(
            r#"(?:\b(?:require(?:\.resolve)?|import)\s*\(\s*|\bfrom\s+|^\s*import\s+)$"#,
        )
        .unwrap(),
        stylesheet_import: Regex::new(r#"@(?:import|use|forward|require)\s+([^;]*)"#).unwrap(),
        array_literal: Regex::new(r#"\[([^\[\]]*)$"#).unwrap(),
    })
}

// ============================================================================
// Tests
// ============================================================================
