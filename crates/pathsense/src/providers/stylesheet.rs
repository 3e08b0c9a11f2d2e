//
// providers/stylesheet.rs
//
// Suggestions for `@import`, `@use`, `@forward` and `@require` arguments in
// CSS, SCSS, Sass and Less.
//

use async_trait::async_trait;

use crate::extract::{extract_tokens, PathToken, PatternKind};
use crate::format::{FormattedSuggestion, Formatter, RawListing};
use crate::request::Request;
use crate::scope::ScopeSelector;
use crate::search_path::{path_start_offsets, resolve_search_path};

use super::{list_or_empty, PathProvider};

const STYLESHEET_EXTENSIONS: &[&str] = &[".css", ".scss", ".sass", ".less"];

pub struct StylesheetProvider {
    selector: ScopeSelector,
    formatter: Formatter,
}

impl StylesheetProvider {
    pub const ID: &'static str = "stylesheet-import";
    pub const PRIORITY: i32 = 3;

    pub fn new() -> Self {
        Self {
            selector: ScopeSelector::parse(".source.css, .source.sass"),
            formatter: Formatter::Stylesheet,
        }
    }

    fn token(request: &Request) -> Option<PathToken> {
        extract_tokens(
            PatternKind::StylesheetImport,
            &request.line_text(),
            request.cursor_byte(),
        )
        .into_iter()
        .next()
    }
}

impl Default for StylesheetProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PathProvider for StylesheetProvider {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn scope_selector(&self) -> &ScopeSelector {
        &self.selector
    }

    fn can_resolve(&self, request: &Request) -> bool {
        Self::token(request).is_some()
    }

    async fn resolve(&self, request: &Request) -> anyhow::Result<Vec<FormattedSuggestion>> {
        let Some(token) = Self::token(request) else {
            return Ok(Vec::new());
        };

        // `partials/_x` is relative to the stylesheet itself
        let candidate = if path_start_offsets(&token.text).is_empty() {
            format!("./{}", token.text)
        } else {
            token.text.clone()
        };
        let Some(found) = resolve_search_path(request, &candidate) else {
            return Ok(Vec::new());
        };

        let entries = list_or_empty(&found.search_path, Some(STYLESHEET_EXTENSIONS)).await;
        Ok(self.formatter.format(&RawListing {
            directory: Some(found.search_path),
            typed: token.text,
            quote: token.quote,
            entries,
        }))
    }
}
