// lib.rs - Path-literal completion engine and its language server front end.
//
// The binary entry point lives in main.rs; benches/ and tests/ use the
// library directly.

pub mod backend;
pub mod config;
pub mod document_store;
pub mod enumerate;
pub mod extract;
pub mod format;
pub mod module_root;
pub mod providers;
pub mod registry;
pub mod request;
pub mod scope;
pub mod search_path;
// test_utils is available in test builds and when the `test-support` feature is enabled.
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod utf16;

pub use config::CompletionConfig;
pub use format::{FormattedSuggestion, SuggestionKind};
pub use registry::ProviderRegistry;
pub use request::{ActivationMode, Cursor, Request};
