//
// providers/relative_path.rs
//
// Suggestions for `./`, `../` and project-rooted `/` paths anywhere in a
// quoted literal
//

use async_trait::async_trait;

use crate::extract::{extract_tokens, PatternKind};
use crate::format::{FormattedSuggestion, Formatter, RawListing};
use crate::request::Request;
use crate::scope::ScopeSelector;
use crate::search_path::{path_start_offsets, resolve_search_path};

use super::{list_or_empty, PathProvider};

pub struct RelativePathProvider {
    selector: ScopeSelector,
    formatter: Formatter,
}

impl RelativePathProvider {
    pub const ID: &'static str = "relative-path";
    pub const PRIORITY: i32 = 2;

    pub fn new() -> Self {
        Self {
            selector: ScopeSelector::parse(".string.quoted, .string.template"),
            formatter: Formatter::Default,
        }
    }
}

impl Default for RelativePathProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PathProvider for RelativePathProvider {
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
        extract_tokens(PatternKind::Plain, &request.line_text(), request.cursor_byte())
            .iter()
            .any(|token| !path_start_offsets(&token.text).is_empty())
    }

    async fn resolve(&self, request: &Request) -> anyhow::Result<Vec<FormattedSuggestion>> {
        let tokens = extract_tokens(PatternKind::Plain, &request.line_text(), request.cursor_byte());
        let Some(token) = tokens.into_iter().next() else {
            return Ok(Vec::new());
        };
        let Some(found) = resolve_search_path(request, &token.text) else {
            return Ok(Vec::new());
        };

        let entries = list_or_empty(&found.search_path, None).await;
        Ok(self.formatter.format(&RawListing {
            directory: Some(found.search_path),
            typed: found.test_path,
            quote: token.quote,
            entries,
        }))
    }
}
