//! User-initiated actions: run a file, compile-check a file, report status.
//!
//! This is the boundary where every failure becomes one notification.
//! Checks happen in a fixed order (open document, `.dhr` extension, save,
//! resolve, invoke) and nothing is probed or launched until the first two
//! pass.

pub mod error;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

pub use error::{ActionError, ActionKind, ActionResult};

use crate::config::DhrLangSettings;
use crate::toolchain::{
    self, process::ExitOutcome, Invocation, InvocationResult, Locator, Mode, Orchestrator,
    ProbeRoots, ResolvedToolchain, RunningProcess, ToolchainCache, ToolchainStatus,
};

/// Header written above non-empty compiler output.
pub const OUTPUT_HEADER: &str = "=== DhrLang Compilation Output ===";

/// The host's view of an open file.
#[async_trait]
pub trait Document: Send {
    fn path(&self) -> &Path;

    /// Flush unsaved edits so the toolchain sees the current text.
    async fn save(&mut self) -> std::io::Result<()>;
}

/// A document backed by a file on disk, optionally with unsaved text.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
    unsaved: Option<String>,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            unsaved: None,
        }
    }

    /// Replace the buffer contents without touching the file.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.unsaved = Some(text.into());
    }

    pub fn is_dirty(&self) -> bool {
        self.unsaved.is_some()
    }
}

#[async_trait]
impl Document for FileDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&mut self) -> std::io::Result<()> {
        if let Some(text) = self.unsaved.take() {
            if let Err(e) = tokio::fs::write(&self.path, &text).await {
                self.unsaved = Some(text);
                return Err(e);
            }
            debug!("saved {}", self.path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// What the host should show after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    /// Text for an output panel, when there is any.
    pub output: Option<String>,
}

impl Notification {
    pub fn from_error(error: &ActionError) -> Self {
        let level = match error {
            ActionError::ToolchainUnresolved => Level::Warning,
            _ => Level::Error,
        };
        Self {
            level,
            message: error.to_string(),
            output: None,
        }
    }

    pub fn compiled(result: &InvocationResult) -> Self {
        let output = (!result.stdout.trim().is_empty())
            .then(|| format!("{OUTPUT_HEADER}\n{}", result.stdout));
        Self {
            level: Level::Info,
            message: "✅ DhrLang file compiled successfully!".to_string(),
            output,
        }
    }

    pub fn launched(path: &Path) -> Self {
        Self {
            level: Level::Info,
            message: format!("Running {}", path.display()),
            output: None,
        }
    }
}

/// Status of the toolchain for a status bar or `status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: ToolchainStatus,
    pub java_path: String,
    /// `--version` output, when the jar resolved and answered.
    pub version: Option<String>,
}

/// Per-activation state: settings, search roots and the resolution cache.
#[derive(Debug)]
pub struct Session {
    settings: DhrLangSettings,
    roots: ProbeRoots,
    cache: ToolchainCache,
}

impl Session {
    pub fn new(settings: DhrLangSettings, roots: ProbeRoots) -> Self {
        Self {
            settings,
            roots,
            cache: ToolchainCache::new(),
        }
    }

    pub fn settings(&self) -> &DhrLangSettings {
        &self.settings
    }

    pub fn roots(&self) -> &ProbeRoots {
        &self.roots
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::from_settings(&self.settings)
    }

    fn locator(&self) -> Locator {
        Locator::new(&self.settings, self.roots.clone())
    }

    /// Apply changed settings. Returns whether the cached toolchain was dropped.
    pub async fn update_settings(&mut self, next: DhrLangSettings) -> bool {
        let invalidate = self.settings.affects_toolchain(&next);
        self.settings = next;
        if invalidate {
            info!("toolchain settings changed, dropping cached jar");
            self.cache.invalidate().await;
        }
        invalidate
    }

    /// Replace the workspace folders. Always drops the cached toolchain.
    pub async fn set_workspace_roots(&mut self, roots: Vec<PathBuf>) {
        self.roots.workspace_roots = roots;
        self.cache.invalidate().await;
    }

    pub async fn resolve_toolchain(&self) -> ActionResult<ResolvedToolchain> {
        self.cache
            .resolve(&self.locator())
            .await
            .ok_or(ActionError::ToolchainUnresolved)
    }

    pub async fn status(&self) -> ToolchainStatus {
        self.cache.status().await
    }

    /// Resolve if needed and ask the jar for its version.
    pub async fn status_report(&self) -> StatusReport {
        let version = match self.resolve_toolchain().await {
            Ok(tc) => self.orchestrator().version(&tc).await,
            Err(_) => None,
        };
        StatusReport {
            status: self.status().await,
            java_path: self.settings.java_path.clone(),
            version,
        }
    }

    /// Run the active file. Returns once the process has started.
    pub async fn run_file(&self, document: Option<&mut dyn Document>) -> ActionResult<RunningProcess> {
        let (toolchain, target) = self.prepare(document, ActionKind::Run).await?;
        match self.orchestrator().invoke(&toolchain, Mode::Run, &target).await {
            Invocation::Launched(process) => Ok(process),
            Invocation::Completed(result) => Err(into_action_error(result)),
        }
    }

    /// Compile-check the active file and wait for the verdict.
    pub async fn compile_file(&self, document: Option<&mut dyn Document>) -> ActionResult<InvocationResult> {
        let (toolchain, target) = self.prepare(document, ActionKind::Compile).await?;
        match self.orchestrator().invoke(&toolchain, Mode::Check, &target).await {
            Invocation::Completed(result) if result.is_success() => Ok(result),
            Invocation::Completed(result) => Err(into_action_error(result)),
            // Check mode always captures.
            Invocation::Launched(_) => Err(ActionError::InvocationFailure(
                "check produced no captured output".into(),
            )),
        }
    }

    async fn prepare(
        &self,
        document: Option<&mut dyn Document>,
        action: ActionKind,
    ) -> ActionResult<(ResolvedToolchain, PathBuf)> {
        let document = document.ok_or(ActionError::NoActiveDocument)?;
        let path = document.path().to_path_buf();
        if !toolchain::is_source_file(&path) {
            return Err(ActionError::WrongExtension { path, action });
        }

        document.save().await.map_err(|e| ActionError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let toolchain = self.resolve_toolchain().await?;
        debug!("{} {} with {}", action.verb(), path.display(), toolchain.artifact_path.display());
        Ok((toolchain, path))
    }
}

fn into_action_error(result: InvocationResult) -> ActionError {
    match result.outcome {
        ExitOutcome::InvocationFailure(message) => ActionError::InvocationFailure(message),
        ExitOutcome::ToolError | ExitOutcome::Success => ActionError::ToolError(result.stderr),
    }
}
