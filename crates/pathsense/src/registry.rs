//
// registry.rs
//
// Provider registry: selection by scope and capability, priority ordering and
// aggregation of results
//

use std::cmp::Reverse;
use std::path::PathBuf;

use crate::config::CompletionConfig;
use crate::extract::unescape_quotes;
use crate::format::FormattedSuggestion;
use crate::providers::{
    CurrentDirectoryProvider, ModuleSpecifierProvider, PathProvider, RelativePathProvider,
    StylesheetProvider,
};
use crate::request::Request;

/// Owns every provider for the lifetime of the server
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn PathProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in providers. Dependency-root discovery for
    /// module specifiers starts in the background, in `project_root`.
    pub fn with_default_providers(config: &CompletionConfig, project_root: Option<PathBuf>) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CurrentDirectoryProvider::new()));
        registry.register(Box::new(RelativePathProvider::new()));
        registry.register(Box::new(ModuleSpecifierProvider::new(
            &config.package_manager,
            project_root,
        )));
        registry.register(Box::new(StylesheetProvider::new()));
        registry
    }

    pub fn register(&mut self, provider: Box<dyn PathProvider>) {
        log::debug!(
            "Registered provider {} (priority {})",
            provider.id(),
            provider.priority()
        );
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers whose scope selector matches the request and that can
    /// resolve it, highest priority first. Equal priorities keep
    /// registration order.
    pub fn select(&self, request: &Request) -> Vec<&dyn PathProvider> {
        let mut selected: Vec<&dyn PathProvider> = self
            .providers
            .iter()
            .map(|p| &**p)
            .filter(|p| p.scope_selector().matches(&request.scope_labels))
            .filter(|p| p.can_resolve(request))
            .collect();
        selected.sort_by_key(|p| Reverse(p.priority()));
        selected
    }

    /// Run the request through the configured gates and providers.
    ///
    /// Single-winner mode invokes only the first selected provider;
    /// otherwise every selected provider runs and results are concatenated
    /// in priority order. No matching provider yields an empty list.
    ///
    /// # Errors
    /// A provider error aborts this request only.
    pub async fn suggestions(
        &self,
        request: &Request,
        config: &CompletionConfig,
    ) -> anyhow::Result<Vec<FormattedSuggestion>> {
        if !config.admits(request) {
            return Ok(Vec::new());
        }

        let selected = self.select(request);
        let Some(first) = selected.first() else {
            log::trace!("No provider for scopes {:?}", request.scope_labels);
            return Ok(Vec::new());
        };

        let mut suggestions = Vec::new();
        if config.invoke_all_providers {
            for provider in &selected {
                log::trace!("Invoking provider {}", provider.id());
                suggestions.extend(provider.resolve(request).await?);
            }
        } else {
            log::trace!("Invoking provider {}", first.id());
            suggestions = first.resolve(request).await?;
        }

        if config.suggestion_filtering {
            suggestions.retain(matches_typed_segment);
        }
        Ok(suggestions)
    }

    /// Release provider resources
    pub fn dispose(&self) {
        for provider in &self.providers {
            provider.dispose();
        }
    }
}

/// The parent entry always passes
fn matches_typed_segment(suggestion: &FormattedSuggestion) -> bool {
    if suggestion.display_text == "../" {
        return true;
    }
    let typed = unescape_quotes(&suggestion.replacement_prefix).to_lowercase();
    suggestion.display_text.to_lowercase().starts_with(&typed)
}
