//! Editor settings for DhrLang, the `dhrlang.*` configuration keys.
//!
//! User-level settings: `~/.dhrlang/settings.yaml`
//! Project-level settings: `.dhrlang/settings.yaml` (keys present here win)
//!
//! Resolution: defaults → user file → project file → env var overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Env var that overrides `javaPath`.
pub const JAVA_ENV: &str = "DHRLANG_JAVA";
/// Env var that overrides `jarPath`.
pub const JAR_ENV: &str = "DHRLANG_JAR";

const SETTINGS_DIR: &str = ".dhrlang";
const SETTINGS_FILE: &str = "settings.yaml";

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DhrLangSettings {
    /// Java launcher; a bare name is looked up on `PATH`.
    pub java_path: String,
    /// Explicit toolchain jar. Empty means "search for it".
    pub jar_path: String,
    /// Search the workspace and install root when `jar_path` is empty.
    pub auto_detect_jar: bool,
    /// Kill a compile-only check that runs longer than this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_timeout_secs: Option<u64>,
}

impl Default for DhrLangSettings {
    fn default() -> Self {
        Self {
            java_path: "java".into(),
            jar_path: String::new(),
            auto_detect_jar: true,
            check_timeout_secs: None,
        }
    }
}

/// A settings file as written on disk; absent keys leave the lower layer alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsLayer {
    java_path: Option<String>,
    jar_path: Option<String>,
    auto_detect_jar: Option<bool>,
    check_timeout_secs: Option<u64>,
}

/// Path to `~/.dhrlang/`.
fn dirs_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|p| PathBuf::from(p).join(SETTINGS_DIR))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(SETTINGS_DIR))
    }
}

impl DhrLangSettings {
    /// Load settings for a workspace, merging user file, project file and env.
    pub fn load(workspace_root: &Path) -> Self {
        let mut settings = Self::default();

        if let Some(dir) = dirs_path() {
            settings.apply(read_layer(&dir.join(SETTINGS_FILE)));
        }
        settings.apply(read_layer(
            &workspace_root.join(SETTINGS_DIR).join(SETTINGS_FILE),
        ));
        settings.apply_env(|key| std::env::var(key).ok());

        settings
    }

    /// Parse a single settings document on top of the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let layer: SettingsLayer = serde_yaml::from_str(content)?;
        let mut settings = Self::default();
        settings.apply(layer);
        Ok(settings)
    }

    fn apply(&mut self, layer: SettingsLayer) {
        if let Some(java) = layer.java_path {
            self.java_path = java;
        }
        if let Some(jar) = layer.jar_path {
            self.jar_path = jar;
        }
        if let Some(auto) = layer.auto_detect_jar {
            self.auto_detect_jar = auto;
        }
        if layer.check_timeout_secs.is_some() {
            self.check_timeout_secs = layer.check_timeout_secs;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(java) = lookup(JAVA_ENV).filter(|v| !v.trim().is_empty()) {
            self.java_path = java;
        }
        if let Some(jar) = lookup(JAR_ENV) {
            self.jar_path = jar;
        }
    }

    /// The explicit jar override, if one is set after trimming whitespace.
    pub fn override_path(&self) -> Option<&str> {
        let trimmed = self.jar_path.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Whether moving from `self` to `next` can change which jar resolves.
    pub fn affects_toolchain(&self, next: &Self) -> bool {
        self.override_path() != next.override_path() || self.auto_detect_jar != next.auto_detect_jar
    }
}

fn read_layer(path: &Path) -> SettingsLayer {
    let Ok(content) = std::fs::read_to_string(path) else {
        return SettingsLayer::default();
    };
    match serde_yaml::from_str(&content) {
        Ok(layer) => layer,
        Err(e) => {
            warn!("ignoring malformed settings file {}: {e}", path.display());
            SettingsLayer::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let s = DhrLangSettings::default();
        assert_eq!(s.java_path, "java");
        assert_eq!(s.jar_path, "");
        assert!(s.auto_detect_jar);
        assert!(s.override_path().is_none());
        assert!(s.check_timeout().is_none());
    }

    #[test]
    fn load_from_yaml_string() {
        let yaml = r#"
javaPath: /opt/jdk/bin/java
jarPath: ./build/DhrLang.jar
autoDetectJar: false
checkTimeoutSecs: 20
"#;
        let s = DhrLangSettings::from_yaml(yaml).unwrap();
        assert_eq!(s.java_path, "/opt/jdk/bin/java");
        assert_eq!(s.override_path(), Some("./build/DhrLang.jar"));
        assert!(!s.auto_detect_jar);
        assert_eq!(s.check_timeout(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let s = DhrLangSettings::from_yaml("autoDetectJar: false\n").unwrap();
        assert_eq!(s.java_path, "java");
        assert!(!s.auto_detect_jar);
    }

    #[test]
    fn zero_timeout_means_no_limit() {
        let s = DhrLangSettings::from_yaml("checkTimeoutSecs: 0\n").unwrap();
        assert_eq!(s.check_timeout_secs, Some(0));
        assert!(s.check_timeout().is_none());
    }

    #[test]
    fn whitespace_override_is_empty() {
        let s = DhrLangSettings {
            jar_path: "   \t".into(),
            ..Default::default()
        };
        assert!(s.override_path().is_none());

        let s = DhrLangSettings {
            jar_path: "  /tmp/DhrLang.jar ".into(),
            ..Default::default()
        };
        assert_eq!(s.override_path(), Some("/tmp/DhrLang.jar"));
    }

    #[test]
    fn project_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(SETTINGS_DIR)).unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_DIR).join(SETTINGS_FILE),
            "jarPath: lib/custom.jar\n",
        )
        .unwrap();

        let mut s = DhrLangSettings::default();
        s.apply(read_layer(&dir.path().join(SETTINGS_DIR).join(SETTINGS_FILE)));
        assert_eq!(s.jar_path, "lib/custom.jar");
        assert!(s.auto_detect_jar);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "jarPath: [unclosed\n").unwrap();
        let layer = read_layer(&path);
        assert!(layer.jar_path.is_none());
    }

    #[test]
    fn env_overrides_win() {
        let mut s = DhrLangSettings::from_yaml("jarPath: a.jar\n").unwrap();
        s.apply_env(|key| match key {
            JAR_ENV => Some("b.jar".into()),
            JAVA_ENV => Some("   ".into()),
            _ => None,
        });
        assert_eq!(s.jar_path, "b.jar");
        // Blank java override is ignored.
        assert_eq!(s.java_path, "java");
    }

    #[test]
    fn toolchain_relevant_changes() {
        let base = DhrLangSettings::default();

        let java_only = DhrLangSettings {
            java_path: "/usr/bin/java".into(),
            ..Default::default()
        };
        assert!(!base.affects_toolchain(&java_only));

        let whitespace = DhrLangSettings {
            jar_path: "  ".into(),
            ..Default::default()
        };
        assert!(!base.affects_toolchain(&whitespace));

        let jar = DhrLangSettings {
            jar_path: "x.jar".into(),
            ..Default::default()
        };
        assert!(base.affects_toolchain(&jar));
        assert!(jar.affects_toolchain(&base));

        let no_auto = DhrLangSettings {
            auto_detect_jar: false,
            ..Default::default()
        };
        assert!(base.affects_toolchain(&no_auto));
    }
}
