//! End-to-end flows through the public API: settings, toolchain discovery,
//! run/check actions and the editor-facing language service.
//!
//! Process tests stand a shell script in for `java`, so they are unix-only.

use std::path::{Path, PathBuf};

use dhrlang_editor::actions::{ActionError, FileDocument, Level, Notification, Session};
use dhrlang_editor::config::DhrLangSettings;
use dhrlang_editor::lsp::{DhrLangService, LanguageService, QueryContext};
use dhrlang_editor::toolchain::{Origin, ProbeRoots, ToolchainStatus};
use tempfile::TempDir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"PK").unwrap();
}

#[cfg(unix)]
fn fake_java(dir: &Path, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("java");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_str().unwrap().to_string()
}

fn session(ws: &Path, settings: DhrLangSettings) -> Session {
    Session::new(settings, ProbeRoots::new(vec![ws.to_path_buf()], None))
}

fn demo(ws: &Path) -> (PathBuf, FileDocument) {
    let path = ws.join("demo.dhr");
    let mut doc = FileDocument::new(&path);
    doc.edit("मुख्य() {\n\tप्रिंट(\"नमस्ते\");\n}\n");
    (path, doc)
}

#[tokio::test]
async fn override_wins_over_workspace_jar() {
    let ws = TempDir::new().unwrap();
    let custom = TempDir::new().unwrap();
    touch(&ws.path().join("DhrLang.jar"));
    touch(&custom.path().join("DhrLang.jar"));

    let settings = DhrLangSettings {
        jar_path: custom.path().join("DhrLang.jar").to_string_lossy().into_owned(),
        ..Default::default()
    };
    let tc = session(ws.path(), settings).resolve_toolchain().await.unwrap();
    assert_eq!(tc.origin, Origin::ExplicitOverride);
    assert_eq!(tc.artifact_path, custom.path().join("DhrLang.jar"));
}

#[tokio::test]
async fn auto_detect_off_ignores_workspace_jar() {
    let ws = TempDir::new().unwrap();
    touch(&ws.path().join("DhrLang.jar"));

    let settings = DhrLangSettings {
        auto_detect_jar: false,
        ..Default::default()
    };
    let s = session(ws.path(), settings);
    assert_eq!(s.resolve_toolchain().await.unwrap_err(), ActionError::ToolchainUnresolved);
    assert_eq!(s.status().await, ToolchainStatus::Unresolved);
}

#[tokio::test]
async fn versioned_lib_jar_is_found() {
    let ws = TempDir::new().unwrap();
    touch(&ws.path().join("lib/DhrLang-2.0.jar"));
    touch(&ws.path().join("lib/DhrLang-1.0.jar"));

    let tc = session(ws.path(), DhrLangSettings::default())
        .resolve_toolchain()
        .await
        .unwrap();
    assert_eq!(tc.origin, Origin::WorkspaceLibGlob);
    assert_eq!(tc.artifact_path, ws.path().join("lib/DhrLang-1.0.jar"));
}

#[cfg(unix)]
#[tokio::test]
async fn missing_toolchain_never_launches() {
    let ws = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let marker = bin.path().join("launched");
    let java = fake_java(bin.path(), &format!("touch '{}'", marker.display()));

    let settings = DhrLangSettings {
        java_path: java,
        ..Default::default()
    };
    let (_, mut doc) = demo(ws.path());
    let err = session(ws.path(), settings)
        .compile_file(Some(&mut doc))
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::ToolchainUnresolved);
    assert_eq!(Notification::from_error(&err).level, Level::Warning);
    assert!(!marker.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn missing_toolchain_never_runs() {
    let ws = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    let marker = bin.path().join("launched");
    let java = fake_java(bin.path(), &format!("touch '{}'", marker.display()));

    let settings = DhrLangSettings {
        java_path: java,
        ..Default::default()
    };
    let (_, mut doc) = demo(ws.path());
    let s = session(ws.path(), settings);
    let err = s.run_file(Some(&mut doc)).await.unwrap_err();

    assert_eq!(err, ActionError::ToolchainUnresolved);
    assert_eq!(s.status().await, ToolchainStatus::Unresolved);
    assert!(!marker.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn check_reports_compiler_stderr_verbatim() {
    let ws = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    touch(&ws.path().join("DhrLang.jar"));
    let java = fake_java(bin.path(), "printf 'error: unexpected token' >&2; exit 1");

    let settings = DhrLangSettings {
        java_path: java,
        ..Default::default()
    };
    let (path, mut doc) = demo(ws.path());
    let err = session(ws.path(), settings)
        .compile_file(Some(&mut doc))
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::ToolError("error: unexpected token".into()));
    assert_eq!(
        Notification::from_error(&err).message,
        "Compilation Error: error: unexpected token"
    );
    // The buffer was saved before the check ran.
    assert!(std::fs::read_to_string(path).unwrap().contains("प्रिंट"));
}

#[cfg(unix)]
#[tokio::test]
async fn check_success_shows_output_panel() {
    let ws = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    touch(&ws.path().join("DhrLang.jar"));
    let java = fake_java(bin.path(), "printf 'OK'");

    let settings = DhrLangSettings {
        java_path: java,
        ..Default::default()
    };
    let (_, mut doc) = demo(ws.path());
    let result = session(ws.path(), settings)
        .compile_file(Some(&mut doc))
        .await
        .unwrap();

    assert_eq!(result.stdout, "OK");
    let note = Notification::compiled(&result);
    assert_eq!(note.level, Level::Info);
    assert_eq!(note.output.as_deref(), Some("=== DhrLang Compilation Output ===\nOK"));
}

#[cfg(unix)]
#[tokio::test]
async fn check_uses_the_resolved_jar() {
    let ws = TempDir::new().unwrap();
    let bin = TempDir::new().unwrap();
    touch(&ws.path().join("DhrLang.jar"));
    // Echo the jar argument back: java -jar <jar> --check <file>
    let java = fake_java(bin.path(), "printf '%s' \"$2\"");

    let settings = DhrLangSettings {
        java_path: java,
        ..Default::default()
    };
    let (_, mut doc) = demo(ws.path());
    let result = session(ws.path(), settings)
        .compile_file(Some(&mut doc))
        .await
        .unwrap();
    assert_eq!(PathBuf::from(result.stdout), ws.path().join("DhrLang.jar"));
}

#[tokio::test]
async fn clearing_override_reprobes() {
    let ws = TempDir::new().unwrap();
    let custom = TempDir::new().unwrap();
    touch(&ws.path().join("DhrLang.jar"));
    touch(&custom.path().join("DhrLang.jar"));

    let with_override = DhrLangSettings {
        jar_path: custom.path().join("DhrLang.jar").to_string_lossy().into_owned(),
        ..Default::default()
    };
    let mut s = session(ws.path(), with_override);
    assert_eq!(s.resolve_toolchain().await.unwrap().origin, Origin::ExplicitOverride);

    assert!(s.update_settings(DhrLangSettings::default()).await);
    assert_eq!(s.status().await, ToolchainStatus::Unknown);
    assert_eq!(s.resolve_toolchain().await.unwrap().origin, Origin::WorkspaceRoot);
}

#[tokio::test]
async fn workspace_change_reprobes() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    touch(&second.path().join("DhrLang.jar"));

    let mut s = session(first.path(), DhrLangSettings::default());
    assert!(s.resolve_toolchain().await.is_err());

    s.set_workspace_roots(vec![second.path().to_path_buf()]).await;
    let tc = s.resolve_toolchain().await.unwrap();
    assert_eq!(tc.artifact_path, second.path().join("DhrLang.jar"));
}

#[test]
fn editor_surface_over_builtin_catalog() {
    let service = DhrLangService::default();

    let items = service.completions(&QueryContext::at("प्रि", "प्रि".len()));
    assert_eq!(items.len(), 20);
    assert!(items.iter().any(|i| i.label == "प्रिंट"));

    let hover = service.hover("जबकि").unwrap();
    assert!(hover.content.starts_with("**जबकि**"));
    assert!(service.hover("जबकि_").is_none());
}
