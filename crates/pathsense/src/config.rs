//
// config.rs
//
// Completion settings and their parsing from LSP settings JSON
//

use crate::request::{ActivationMode, Request};
use crate::scope::ScopeSelector;

/// Settings consulted for every completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    /// Only answer user-invoked requests
    pub manual_mode: bool,
    /// Scope selector a request must match
    pub allowed_scopes: String,
    /// Scope selector a request must not match
    pub disallowed_scopes: String,
    /// Rank of path suggestions relative to other completion sources
    pub inclusion_priority: i64,
    /// Rank of path suggestions within the merged list
    pub suggestion_priority: i64,
    /// Invoke every matching provider instead of only the highest priority one
    pub invoke_all_providers: bool,
    /// Drop suggestions whose display text does not start with the typed segment
    pub suggestion_filtering: bool,
    /// Raise the log level to debug
    pub debug: bool,
    /// Program queried for the dependency root
    pub package_manager: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            manual_mode: false,
            allowed_scopes: "*".to_string(),
            disallowed_scopes: ".comment".to_string(),
            inclusion_priority: 1,
            suggestion_priority: 2,
            invoke_all_providers: false,
            suggestion_filtering: false,
            debug: false,
            package_manager: "npm".to_string(),
        }
    }
}

impl CompletionConfig {
    /// Whether a request passes the manual-mode and scope gates
    pub fn admits(&self, request: &Request) -> bool {
        if self.manual_mode && request.activation == ActivationMode::Automatic {
            log::trace!("Manual mode: ignoring automatic request");
            return false;
        }
        if !ScopeSelector::parse(&self.allowed_scopes).matches(&request.scope_labels) {
            log::trace!("Scopes {:?} not allowed", request.scope_labels);
            return false;
        }
        if ScopeSelector::parse(&self.disallowed_scopes).matches(&request.scope_labels) {
            log::trace!("Scopes {:?} disallowed", request.scope_labels);
            return false;
        }
        true
    }

    /// Log level implied by the `debug` flag
    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Parse the `pathsense` section of LSP settings.
///
/// Returns `None` when the section is absent so the caller keeps its current
/// configuration. Keys that are absent or of the wrong type keep defaults.
pub fn parse_completion_config(settings: &serde_json::Value) -> Option<CompletionConfig> {
    let section = settings.get("pathsense")?;
    let mut config = CompletionConfig::default();

    if let Some(v) = section.get("enableManualMode").and_then(|v| v.as_bool()) {
        config.manual_mode = v;
    }
    if let Some(selectors) = section.get("scopeSelectors") {
        if let Some(v) = selectors.get("allowed").and_then(|v| v.as_str()) {
            config.allowed_scopes = v.to_string();
        }
        if let Some(v) = selectors.get("disallowed").and_then(|v| v.as_str()) {
            config.disallowed_scopes = v.to_string();
        }
    }
    if let Some(v) = section.get("inclusionPriority").and_then(|v| v.as_i64()) {
        config.inclusion_priority = v;
    }
    if let Some(v) = section.get("suggestionPriority").and_then(|v| v.as_i64()) {
        config.suggestion_priority = v;
    }
    if let Some(v) = section.get("invokeAllProviders").and_then(|v| v.as_bool()) {
        config.invoke_all_providers = v;
    }
    if let Some(v) = section.get("suggestionFiltering").and_then(|v| v.as_bool()) {
        config.suggestion_filtering = v;
    }
    if let Some(v) = section.get("debug").and_then(|v| v.as_bool()) {
        config.debug = v;
    }
    if let Some(v) = section.get("packageManager").and_then(|v| v.as_str()) {
        if !v.trim().is_empty() && !v.contains('\0') {
            config.package_manager = v.trim().to_string();
        }
    }

    log::info!("Completion configuration loaded from LSP settings:");
    log::info!("  manual_mode: {}", config.manual_mode);
    log::info!("  allowed_scopes: {:?}", config.allowed_scopes);
    log::info!("  disallowed_scopes: {:?}", config.disallowed_scopes);
    log::info!(
        "  priorities: inclusion={} suggestion={}",
        config.inclusion_priority,
        config.suggestion_priority
    );
    log::info!("  invoke_all_providers: {}", config.invoke_all_providers);
    log::info!("  suggestion_filtering: {}", config.suggestion_filtering);
    log::info!("  debug: {}", config.debug);
    log::info!("  package_manager: {}", config.package_manager);

    Some(config)
}
