//
// providers/current_directory.rs
//
// Suggestions from the edited file's own directory
//
// Serves quoted literals that do not contain a separator yet, e.g. the empty
// literal in `import fs from ''`.
//

use async_trait::async_trait;

use crate::extract::{open_string_literal, unescape_quotes};
use crate::format::{FormattedSuggestion, Formatter, RawListing};
use crate::request::Request;
use crate::scope::ScopeSelector;

use super::{list_or_empty, PathProvider};

pub struct CurrentDirectoryProvider {
    selector: ScopeSelector,
    formatter: Formatter,
}

impl CurrentDirectoryProvider {
    pub const ID: &'static str = "current-directory";
    pub const PRIORITY: i32 = 1;

    pub fn new() -> Self {
        Self {
            selector: ScopeSelector::parse(".string.quoted, .string.template"),
            formatter: Formatter::Default,
        }
    }

    /// Content of the open literal before the cursor, if it has no separator
    fn literal_content(request: &Request) -> Option<(String, char)> {
        let prefix = request.line_prefix();
        let (start, quote) = open_string_literal(&prefix)?;
        let content = unescape_quotes(&prefix[start..]);
        if content.contains('/') {
            return None;
        }
        Some((content, quote))
    }
}

impl Default for CurrentDirectoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PathProvider for CurrentDirectoryProvider {
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
        request.file_dir().is_some() && Self::literal_content(request).is_some()
    }

    async fn resolve(&self, request: &Request) -> anyhow::Result<Vec<FormattedSuggestion>> {
        let (Some(dir), Some((typed, quote))) = (request.file_dir(), Self::literal_content(request))
        else {
            return Ok(Vec::new());
        };

        let entries = list_or_empty(dir, None).await;
        Ok(self.formatter.format(&RawListing {
            directory: Some(dir.to_path_buf()),
            typed,
            quote: Some(quote),
            entries,
        }))
    }
}
