//
// providers/mod.rs
//
// Path providers: one resolver per content family
//

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;

use crate::enumerate::{list_directory, RawSuggestion};
use crate::format::FormattedSuggestion;
use crate::request::Request;
use crate::scope::ScopeSelector;

pub mod current_directory;
pub mod module_specifier;
pub mod relative_path;
pub mod stylesheet;

pub use current_directory::CurrentDirectoryProvider;
pub use module_specifier::ModuleSpecifierProvider;
pub use relative_path::RelativePathProvider;
pub use stylesheet::StylesheetProvider;

/// Capability shared by every provider.
///
/// Identity, priority and scope are fixed at construction. `resolve` returns
/// an empty list for "nothing to suggest"; `Err` is reserved for unexpected
/// failures and only affects the request that hit it.
#[async_trait]
pub trait PathProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Higher runs first
    fn priority(&self) -> i32;

    fn scope_selector(&self) -> &ScopeSelector;

    /// Cheap, synchronous check whether the text before the cursor has the
    /// shape this provider handles
    fn can_resolve(&self, request: &Request) -> bool;

    async fn resolve(&self, request: &Request) -> anyhow::Result<Vec<FormattedSuggestion>>;

    /// Release background resources
    fn dispose(&self) {}
}

/// List a directory, treating read failures as "nothing to list"
pub(crate) async fn list_or_empty(dir: &Path, filter: Option<&[&str]>) -> Vec<RawSuggestion> {
    match list_directory(dir, filter).await {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                log::warn!("Failed to list {}: {}", dir.display(), e);
            }
            Vec::new()
        }
    }
}
