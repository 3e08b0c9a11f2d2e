//
// backend.rs
//
// Language server front end: document sync, settings and
// textDocument/completion
//

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tower_lsp::LanguageServer;
use tower_lsp::LspService;
use tower_lsp::Server;

use crate::config::{parse_completion_config, CompletionConfig};
use crate::document_store::{Document, DocumentStore};
use crate::format::{FormattedSuggestion, SuggestionKind};
use crate::registry::ProviderRegistry;
use crate::request::{ActivationMode, Cursor, Request};
use crate::scope::derive_scope_labels;
use crate::utf16::{char_column_to_utf16_column, utf16_column_to_char_column};

/// Mutable server state
#[derive(Debug, Default)]
pub struct ServerState {
    pub documents: DocumentStore,
    pub project_roots: Vec<PathBuf>,
    pub config: CompletionConfig,
}

pub struct Backend {
    client: Client,
    state: RwLock<ServerState>,
    /// Built in `initialized`; replaced when the package manager changes
    registry: RwLock<Option<Arc<ProviderRegistry>>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: RwLock::new(ServerState::default()),
            registry: RwLock::new(None),
        }
    }

    /// Replace the configuration when `settings` has a `pathsense` section
    async fn apply_settings(&self, settings: &serde_json::Value) {
        let Some(config) = parse_completion_config(settings) else {
            log::debug!("No pathsense settings; keeping current configuration");
            return;
        };
        if std::env::var_os("RUST_LOG").is_none() {
            log::set_max_level(config.log_level());
        }

        let package_manager_changed = {
            let mut state = self.state.write().await;
            let changed = state.config.package_manager != config.package_manager;
            state.config = config;
            changed
        };

        // Dependency-root discovery runs once per provider; a new package
        // manager needs a fresh module provider
        if package_manager_changed && self.registry.read().await.is_some() {
            log::info!("Package manager changed; rebuilding providers");
            self.rebuild_registry().await;
        }
    }

    /// Build the providers from the current configuration, disposing any
    /// previous set
    async fn rebuild_registry(&self) {
        let (config, project_root) = {
            let state = self.state.read().await;
            (state.config.clone(), state.project_roots.first().cloned())
        };
        let registry = Arc::new(ProviderRegistry::with_default_providers(&config, project_root));
        log::info!("Built {} providers", registry.len());
        if let Some(previous) = self.registry.write().await.replace(registry) {
            previous.dispose();
        }
    }

    async fn current_registry(&self) -> Option<Arc<ProviderRegistry>> {
        self.registry.read().await.clone()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        log::info!("Initializing pathsense");

        {
            let mut state = self.state.write().await;
            if let Some(folders) = params.workspace_folders {
                for folder in folders {
                    log::info!("Adding workspace folder: {}", folder.uri);
                    if let Ok(path) = folder.uri.to_file_path() {
                        state.project_roots.push(path);
                    }
                }
            } else if let Some(root_uri) = params.root_uri {
                log::info!("Adding root URI as workspace folder: {}", root_uri);
                if let Ok(path) = root_uri.to_file_path() {
                    state.project_roots.push(path);
                }
            }
        }

        if let Some(options) = &params.initialization_options {
            self.apply_settings(options).await;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        String::from("/"),
                        String::from("'"),
                        String::from("\""),
                        String::from("`"),
                    ]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: String::from("pathsense"),
                version: Some(String::from(env!("CARGO_PKG_VERSION"))),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.rebuild_registry().await;
        log::info!("pathsense initialized");
        self.client
            .log_message(MessageType::INFO, "pathsense initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("pathsense shutting down");
        if let Some(registry) = self.registry.write().await.take() {
            registry.dispose();
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.state
            .write()
            .await
            .documents
            .open(doc.uri, &doc.text, &doc.language_id, doc.version);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.state.write().await.documents.update(
            &params.text_document.uri,
            &params.content_changes,
            params.text_document.version,
        );
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state
            .write()
            .await
            .documents
            .close(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        log::trace!("Configuration changed");
        self.apply_settings(&params.settings).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let Some(registry) = self.current_registry().await else {
            return Ok(None);
        };

        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let invoked = params.context.as_ref().map(|c| c.trigger_kind)
            == Some(CompletionTriggerKind::INVOKED);
        let activation = if invoked {
            ActivationMode::Manual
        } else {
            ActivationMode::Automatic
        };

        // Build the request under a brief read lock; resolution runs unlocked
        let (request, line, config) = {
            let state = self.state.read().await;
            let Some(doc) = state.documents.get(uri) else {
                return Ok(None);
            };
            let Some(line) = doc.line(position.line as usize) else {
                return Ok(None);
            };
            let request = build_request(doc, uri, position, activation, &state.project_roots);
            (request, line, state.config.clone())
        };

        match registry.suggestions(&request, &config).await {
            Ok(suggestions) => {
                let items: Vec<CompletionItem> = suggestions
                    .iter()
                    .enumerate()
                    .map(|(index, s)| to_completion_item(s, &line, position, &config, index))
                    .collect();
                Ok(Some(CompletionResponse::Array(items)))
            }
            Err(e) => {
                log::warn!("Completion failed for {}: {}", uri, e);
                Ok(None)
            }
        }
    }
}

/// Build a resolution request for `position` in `doc`
pub fn build_request(
    doc: &Document,
    uri: &Url,
    position: Position,
    activation: ActivationMode,
    project_roots: &[PathBuf],
) -> Request {
    let line = doc.line(position.line as usize).unwrap_or_default();
    let column = utf16_column_to_char_column(&line, position.character);
    let prefix: String = line.chars().take(column).collect();

    let mut request = Request::new(doc.contents.clone(), Cursor::new(position.line as usize, column))
        .with_scopes(derive_scope_labels(&doc.language_id, &prefix))
        .with_activation(activation)
        .with_project_roots(project_roots.to_vec());
    if let Ok(path) = uri.to_file_path() {
        request = request.with_file_path(path);
    }
    request
}

/// Map a suggestion to an LSP item whose edit replaces the typed segment
pub fn to_completion_item(
    suggestion: &FormattedSuggestion,
    line: &str,
    position: Position,
    config: &CompletionConfig,
    index: usize,
) -> CompletionItem {
    let cursor_col = utf16_column_to_char_column(line, position.character);
    let start_col = cursor_col.saturating_sub(suggestion.replacement_prefix.chars().count());
    let range = Range {
        start: Position::new(position.line, char_column_to_utf16_column(line, start_col)),
        end: position,
    };

    let is_directory = suggestion.display_text.ends_with('/');
    let kind = match suggestion.kind {
        SuggestionKind::File => CompletionItemKind::FILE,
        SuggestionKind::Directory => CompletionItemKind::FOLDER,
        SuggestionKind::Module => CompletionItemKind::MODULE,
    };

    // Re-trigger after entering a directory
    let command = is_directory.then(|| Command {
        title: String::from("Trigger Suggest"),
        command: String::from("editor.action.triggerSuggest"),
        arguments: None,
    });

    CompletionItem {
        label: suggestion.display_text.clone(),
        kind: Some(kind),
        detail: suggestion.description.clone(),
        label_details: suggestion.right_label.as_ref().map(|label| CompletionItemLabelDetails {
            detail: None,
            description: Some(label.clone()),
        }),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range,
            new_text: suggestion.text.clone(),
        })),
        command,
        sort_text: Some(sort_text(config, index)),
        ..Default::default()
    }
}

/// Higher priorities sort first; `index` keeps the engine's order
fn sort_text(config: &CompletionConfig, index: usize) -> String {
    let rank = |priority: i64| 999 - priority.clamp(0, 999);
    format!(
        "{:03}{:03}{:06}",
        rank(config.inclusion_priority),
        rank(config.suggestion_priority),
        index
    )
}

pub async fn start_lsp() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
