//
// providers/module_specifier.rs
//
// Suggestions for bare module specifiers in import/require calls and AMD
// dependency arrays: runtime builtins plus packages under the dependency root.
//

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::enumerate::{sort_entries, EntryKind, RawSuggestion};
use crate::extract::{extract_tokens, PathToken, PatternKind};
use crate::format::{FormattedSuggestion, Formatter, RawListing};
use crate::module_root::ModuleRootResolver;
use crate::request::Request;
use crate::scope::ScopeSelector;

use super::{list_or_empty, PathProvider};

/// Files offered inside packages
const MODULE_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".json", ".node", ".ts"];

pub struct ModuleSpecifierProvider {
    selector: ScopeSelector,
    formatter: Formatter,
    resolver: Arc<ModuleRootResolver>,
    activation: Mutex<Option<JoinHandle<()>>>,
}

impl ModuleSpecifierProvider {
    pub const ID: &'static str = "module-specifier";
    pub const PRIORITY: i32 = 3;

    /// Create the provider and start dependency-root discovery in the
    /// background. Requests made before discovery finishes see builtins only.
    pub fn new(package_manager: &str, working_dir: Option<PathBuf>) -> Self {
        let resolver = Arc::new(ModuleRootResolver::new());
        let activation = resolver.spawn_activation(package_manager.to_string(), working_dir);
        Self {
            activation: Mutex::new(activation),
            ..Self::with_resolver(resolver)
        }
    }

    /// Create the provider around an existing resolver, without discovery
    pub fn with_resolver(resolver: Arc<ModuleRootResolver>) -> Self {
        Self {
            selector: ScopeSelector::parse(
                ".source.js .string, .source.ts .string, .source.tsx .string",
            ),
            formatter: Formatter::ModuleSpecifier,
            resolver,
            activation: Mutex::new(None),
        }
    }

    pub fn resolver(&self) -> &ModuleRootResolver {
        &self.resolver
    }

    /// The bare specifier under the cursor, if any
    fn specifier(request: &Request) -> Option<PathToken> {
        let line = request.line_text();
        let cursor = request.cursor_byte();
        [PatternKind::ModuleSpecifier, PatternKind::ArrayLiteral]
            .into_iter()
            .flat_map(|kind| extract_tokens(kind, &line, cursor))
            .find(|token| is_bare_specifier(&token.text))
    }

    async fn builtins_and_packages(&self) -> (Option<PathBuf>, Vec<RawSuggestion>) {
        let mut entries: Vec<RawSuggestion> = self
            .resolver
            .builtin_modules()
            .iter()
            .map(|name| RawSuggestion::new(EntryKind::BuiltinModule, *name))
            .collect();

        let root = self.resolver.root().map(PathBuf::from);
        if let Some(root) = &root {
            entries.extend(
                list_or_empty(root, Some(MODULE_EXTENSIONS))
                    .await
                    .into_iter()
                    .filter(|e| !e.is_parent() && !e.entry.starts_with('.')),
            );
        } else {
            log::trace!("No dependency root yet; offering builtins only");
        }

        sort_entries(&mut entries);
        (root, entries)
    }

    async fn package_contents(&self, package_dir: &str) -> (Option<PathBuf>, Vec<RawSuggestion>) {
        let Some(root) = self.resolver.root() else {
            return (None, Vec::new());
        };
        let dir = root.join(package_dir);
        let entries = list_or_empty(&dir, Some(MODULE_EXTENSIONS))
            .await
            .into_iter()
            .filter(|e| !e.is_parent())
            .collect();
        (Some(dir), entries)
    }
}

/// Non-empty and neither relative nor rooted
fn is_bare_specifier(text: &str) -> bool {
    !text.is_empty() && !text.starts_with('.') && !text.starts_with('/')
}

#[async_trait]
impl PathProvider for ModuleSpecifierProvider {
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
        Self::specifier(request).is_some()
    }

    async fn resolve(&self, request: &Request) -> anyhow::Result<Vec<FormattedSuggestion>> {
        let Some(token) = Self::specifier(request) else {
            return Ok(Vec::new());
        };

        let (directory, entries) = match token.text.rfind('/') {
            Some(idx) => self.package_contents(&token.text[..idx]).await,
            None => self.builtins_and_packages().await,
        };

        Ok(self.formatter.format(&RawListing {
            directory,
            typed: token.text,
            quote: token.quote,
            entries,
        }))
    }

    fn dispose(&self) {
        if let Ok(mut activation) = self.activation.lock() {
            if let Some(handle) = activation.take() {
                handle.abort();
            }
        }
    }
}
