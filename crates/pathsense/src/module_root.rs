//
// module_root.rs
//
// Dependency-root discovery and builtin module names for module specifiers
//

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Modules supplied by the Node.js runtime
pub const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Upper bound for the package-manager query
const ROOT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Write-once cache of the dependency root directory.
///
/// Empty until [`ModuleRootResolver::activate`] succeeds; readers never block
/// and see "no dependency root" until then.
#[derive(Debug, Default)]
pub struct ModuleRootResolver {
    root: OnceLock<PathBuf>,
}

impl ModuleRootResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver with a known root, skipping the package-manager query
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let resolver = Self::new();
        let _ = resolver.root.set(root.into());
        resolver
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.get().map(PathBuf::as_path)
    }

    pub fn builtin_modules(&self) -> &'static [&'static str] {
        BUILTIN_MODULES
    }

    /// Query `package_manager root` in `working_dir` and cache the result.
    ///
    /// Failures are logged and leave the cache empty.
    pub async fn activate(&self, package_manager: &str, working_dir: Option<&Path>) {
        if self.root.get().is_some() {
            return;
        }
        match query_dependency_root(package_manager, working_dir).await {
            Ok(root) => {
                log::info!("Dependency root: {}", root.display());
                let _ = self.root.set(root);
            }
            Err(e) => {
                log::warn!("Dependency root discovery failed: {}", e);
            }
        }
    }

    /// Run [`activate`](Self::activate) on the current tokio runtime.
    ///
    /// Returns `None` outside a runtime; the cache then stays empty.
    pub fn spawn_activation(
        self: &Arc<Self>,
        package_manager: String,
        working_dir: Option<PathBuf>,
    ) -> Option<JoinHandle<()>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("No tokio runtime; skipping dependency root discovery");
                return None;
            }
        };
        let resolver = Arc::clone(self);
        Some(handle.spawn(async move {
            resolver
                .activate(&package_manager, working_dir.as_deref())
                .await;
        }))
    }
}

async fn query_dependency_root(package_manager: &str, working_dir: Option<&Path>) -> Result<PathBuf> {
    let program = which::which(package_manager)
        .map_err(|e| anyhow!("{} not found on PATH: {}", package_manager, e))?;

    let mut cmd = Command::new(program);
    cmd.arg("root");
    if let Some(wd) = working_dir {
        cmd.current_dir(wd);
    }
    cmd.stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|e| anyhow!("Failed to spawn {}: {e}", package_manager))?;
    let output = match tokio::time::timeout(ROOT_QUERY_TIMEOUT, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| anyhow!("Failed to run {}: {e}", package_manager))?,
        Err(_) => {
            return Err(anyhow!(
                "{} root timed out after {:?}",
                package_manager,
                ROOT_QUERY_TIMEOUT
            ));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{} root failed with status {}: {}",
            package_manager,
            output.status,
            stderr.trim()
        ));
    }

    parse_root_output(&String::from_utf8_lossy(&output.stdout))
}

/// Take the first non-empty line of the package-manager output as an
/// absolute path.
pub fn parse_root_output(output: &str) -> Result<PathBuf> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| anyhow!("empty output"))?;

    let path = PathBuf::from(line);
    if !path.is_absolute() {
        return Err(anyhow!("not an absolute path: {}", line));
    }
    Ok(crate::search_path::normalize_path(&path).unwrap_or(path))
}
