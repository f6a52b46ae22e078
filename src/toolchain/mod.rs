//! The DhrLang toolchain: an external `DhrLang.jar` this crate finds and
//! shells out to. Its language semantics are opaque here.

pub mod locator;
pub mod process;

use std::fmt;
use std::path::{Path, PathBuf};

pub use locator::{Locator, ProbeRoots, ToolchainCache};
pub use process::{Invocation, InvocationResult, Mode, Orchestrator, RunningProcess};

/// Canonical artifact file name.
pub const ARTIFACT_NAME: &str = "DhrLang.jar";
/// Versioned jars under a workspace's `lib/`, e.g. `lib/DhrLang-1.2.0.jar`.
pub const LIB_GLOB: &str = "lib/DhrLang-*.jar";
/// Location of the jar shipped with this tool, relative to its install root.
pub const BUNDLED_PATH: &str = "compiler/DhrLang.jar";
/// Source file extension, without the dot.
pub const SOURCE_EXTENSION: &str = "dhr";

/// Which candidate location produced a resolved jar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    ExplicitOverride,
    WorkspaceRoot,
    WorkspaceLibGlob,
    Bundled,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::ExplicitOverride => "jarPath setting",
            Origin::WorkspaceRoot => "workspace root",
            Origin::WorkspaceLibGlob => "workspace lib/",
            Origin::Bundled => "bundled",
        })
    }
}

/// A located toolchain jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToolchain {
    pub artifact_path: PathBuf,
    pub origin: Origin,
}

impl ResolvedToolchain {
    pub fn new(artifact_path: impl Into<PathBuf>, origin: Origin) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            origin,
        }
    }

    pub fn path(&self) -> &Path {
        &self.artifact_path
    }
}

/// Persistent indicator of whether run/compile can work right now.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolchainStatus {
    /// Nothing has asked for the toolchain since startup or the last
    /// settings change.
    #[default]
    Unknown,
    Ready(ResolvedToolchain),
    /// The last search found nothing.
    Unresolved,
}

impl ToolchainStatus {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ToolchainStatus::Unresolved)
    }

    /// Short text for a status bar item.
    pub fn indicator_text(&self) -> String {
        match self {
            ToolchainStatus::Unknown => "DhrLang".to_string(),
            ToolchainStatus::Ready(tc) => format!("DhrLang ({})", tc.origin),
            ToolchainStatus::Unresolved => format!("DhrLang: {ARTIFACT_NAME} not found"),
        }
    }
}

/// Whether `path` names a DhrLang source file.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}
