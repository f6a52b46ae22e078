//! Toolchain discovery — ordered probing for `DhrLang.jar`.
//!
//! Search order, first hit wins:
//!
//! 1. `jarPath` setting, when non-blank
//! 2. (stop here when `autoDetectJar` is off)
//! 3. `<root>/DhrLang.jar` for each workspace root, in order
//! 4. `<root>/lib/DhrLang-*.jar` for each workspace root, in order
//! 5. `<install root>/compiler/DhrLang.jar`
//!
//! A failed probe of any kind means "try the next candidate".

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Origin, ResolvedToolchain, ToolchainStatus, ARTIFACT_NAME, BUNDLED_PATH, LIB_GLOB};
use crate::config::DhrLangSettings;

/// Directories the locator is allowed to search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeRoots {
    /// Workspace folders, in the order the host declares them.
    pub workspace_roots: Vec<PathBuf>,
    /// Where this tool is installed; the bundled jar lives under it.
    pub install_root: Option<PathBuf>,
}

impl ProbeRoots {
    pub fn new(workspace_roots: Vec<PathBuf>, install_root: Option<PathBuf>) -> Self {
        Self {
            workspace_roots,
            install_root,
        }
    }

    /// Install root for a running binary at `<root>/bin/<exe>`.
    pub fn install_root_from_exe(exe: &Path) -> Option<PathBuf> {
        exe.parent()?.parent().map(Path::to_path_buf)
    }
}

/// One place the jar might be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A single file path.
    File(PathBuf, Origin),
    /// The versioned-jar glob under one workspace root's `lib/`.
    LibGlob(PathBuf),
}

/// Stateless resolver for one settings snapshot.
#[derive(Debug, Clone)]
pub struct Locator {
    override_path: Option<PathBuf>,
    auto_detect: bool,
    roots: ProbeRoots,
}

impl Locator {
    pub fn new(settings: &DhrLangSettings, roots: ProbeRoots) -> Self {
        let override_path = settings.override_path().map(|p| {
            let p = PathBuf::from(p);
            match roots.workspace_roots.first() {
                Some(root) if p.is_relative() => root.join(p),
                _ => p,
            }
        });
        Self {
            override_path,
            auto_detect: settings.auto_detect_jar,
            roots,
        }
    }

    /// Candidates in probe order.
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut out = Vec::new();
        if let Some(path) = &self.override_path {
            out.push(Candidate::File(path.clone(), Origin::ExplicitOverride));
        }
        if !self.auto_detect {
            return out;
        }
        for root in &self.roots.workspace_roots {
            out.push(Candidate::File(root.join(ARTIFACT_NAME), Origin::WorkspaceRoot));
        }
        for root in &self.roots.workspace_roots {
            out.push(Candidate::LibGlob(root.clone()));
        }
        if let Some(install) = &self.roots.install_root {
            out.push(Candidate::File(install.join(BUNDLED_PATH), Origin::Bundled));
        }
        out
    }

    /// Probe candidates in order and return the first that exists.
    pub async fn resolve(&self) -> Option<ResolvedToolchain> {
        for candidate in self.candidates() {
            match candidate {
                Candidate::File(path, origin) => {
                    if is_file(&path).await {
                        info!("resolved {ARTIFACT_NAME} via {origin}: {}", path.display());
                        return Some(ResolvedToolchain::new(path, origin));
                    }
                    if origin == Origin::ExplicitOverride {
                        warn!("jarPath {} does not exist, searching", path.display());
                    } else {
                        debug!("no {ARTIFACT_NAME} at {}", path.display());
                    }
                }
                Candidate::LibGlob(root) => {
                    if let Some(path) = first_lib_match(&root).await {
                        info!("resolved {ARTIFACT_NAME} via lib glob: {}", path.display());
                        return Some(ResolvedToolchain::new(path, Origin::WorkspaceLibGlob));
                    }
                }
            }
        }
        warn!("{ARTIFACT_NAME} not found in any candidate location");
        None
    }
}

/// Existence probe. Errors other than "not found" are logged and count as a miss.
async fn is_file(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            debug!("probe of {} failed: {e}", path.display());
            false
        }
    }
}

/// Lexicographically first regular file matching `<root>/lib/DhrLang-*.jar`.
async fn first_lib_match(root: &Path) -> Option<PathBuf> {
    let Some(root_str) = root.to_str() else {
        debug!("skipping non-UTF-8 workspace root {}", root.display());
        return None;
    };
    let pattern = format!(
        "{}/{LIB_GLOB}",
        glob::Pattern::escape(root_str.trim_end_matches(['/', '\\']))
    );
    let mut matches: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(e) => {
            debug!("bad lib glob {pattern}: {e}");
            return None;
        }
    };
    matches.sort();
    for path in matches {
        if is_file(&path).await {
            return Some(path);
        }
    }
    debug!("no match for {pattern}");
    None
}

/// Session-wide resolution state.
///
/// The mutex is held for the whole probe sequence, so a second request
/// that arrives mid-resolution waits and then reads the cached result
/// instead of probing again. Only successful resolutions are reused; an
/// `Unresolved` state is re-probed on the next request.
#[derive(Debug, Default)]
pub struct ToolchainCache {
    state: Mutex<ToolchainStatus>,
    probe_cycles: AtomicUsize,
}

impl ToolchainCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached toolchain, resolving with `locator` when there is none.
    pub async fn resolve(&self, locator: &Locator) -> Option<ResolvedToolchain> {
        let mut state = self.state.lock().await;
        if let ToolchainStatus::Ready(tc) = &*state {
            return Some(tc.clone());
        }

        self.probe_cycles.fetch_add(1, Ordering::Relaxed);
        let found = locator.resolve().await;
        *state = match &found {
            Some(tc) => ToolchainStatus::Ready(tc.clone()),
            None => ToolchainStatus::Unresolved,
        };
        found
    }

    /// Forget the cached toolchain; the next `resolve` probes again.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        debug!("toolchain cache invalidated");
        *state = ToolchainStatus::Unknown;
    }

    pub async fn status(&self) -> ToolchainStatus {
        self.state.lock().await.clone()
    }

    /// How many times the locator has actually been run.
    pub fn probe_cycles(&self) -> usize {
        self.probe_cycles.load(Ordering::Relaxed)
    }
}
