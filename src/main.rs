use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use dhrlang_editor::actions::{FileDocument, Notification, Session};
use dhrlang_editor::catalog;
use dhrlang_editor::config::DhrLangSettings;
use dhrlang_editor::lsp::{self, DhrLangService, LanguageService, QueryContext};
use dhrlang_editor::toolchain::{ProbeRoots, ToolchainStatus};

#[derive(Parser)]
#[command(name = "dhrlang-editor", about = "DhrLang completion, hover and toolchain runner.")]
struct Cli {
    /// Workspace folder to search for DhrLang.jar (repeatable, defaults to current)
    #[arg(short, long = "workspace", global = true)]
    workspace: Vec<PathBuf>,

    /// Install root holding compiler/DhrLang.jar (defaults to the parent of this binary's directory)
    #[arg(long, global = true)]
    install_root: Option<PathBuf>,

    /// Java launcher (overrides dhrlang.javaPath)
    #[arg(long, global = true)]
    java: Option<String>,

    /// Explicit toolchain jar (overrides dhrlang.jarPath)
    #[arg(long, global = true)]
    jar: Option<String>,

    /// Only use an explicit jar, never search for one
    #[arg(long, global = true)]
    no_auto_detect: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print completion items as JSON
    Complete {
        /// Document text before the cursor
        #[arg(long, default_value = "")]
        prefix: String,
        /// Cursor byte offset (defaults to the end of the prefix)
        #[arg(long)]
        offset: Option<usize>,
        /// Trigger character
        #[arg(long)]
        trigger: Option<char>,
    },
    /// Print hover documentation for a word
    Hover {
        /// The word to look up
        word: Option<String>,
        /// Take the word under --column in this line instead
        #[arg(long)]
        line: Option<String>,
        #[arg(long, default_value_t = 0)]
        column: usize,
    },
    /// Print the language quick reference
    Help,
    /// Locate the toolchain and report its status
    Status,
    /// Run a .dhr file
    Run { file: PathBuf },
    /// Compile-check a .dhr file
    Check { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dhrlang_editor=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let service = DhrLangService::default();

    match &cli.command {
        Command::Complete {
            prefix,
            offset,
            trigger,
        } => {
            let mut ctx = QueryContext::at(prefix, offset.unwrap_or(prefix.len()));
            ctx.trigger_char = *trigger;
            let items = service.completions(&ctx);
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Command::Hover { word, line, column } => {
            let word = match (word, line) {
                (Some(w), _) => Some(w.as_str()),
                (None, Some(l)) => lsp::word_at(l, *column),
                (None, None) => bail!("give a WORD or --line"),
            };
            if let Some(info) = word.and_then(|w| service.hover(w)) {
                println!("{}", info.content);
            }
        }
        Command::Help => {
            print!("{}", lsp::help::render_help(catalog::builtin()));
        }
        Command::Status => {
            let session = build_session(&cli)?;
            let report = session.status_report().await;
            println!("{}", report.status.indicator_text());
            match &report.status {
                ToolchainStatus::Ready(tc) => {
                    println!("jar:     {}", tc.artifact_path.display());
                    println!("origin:  {}", tc.origin);
                }
                _ => println!("jar:     (not found)"),
            }
            println!("java:    {}", report.java_path);
            if let Some(version) = report.version {
                println!("version: {version}");
            }
        }
        Command::Run { file } => {
            let session = build_session(&cli)?;
            let mut doc = FileDocument::new(file);
            match session.run_file(Some(&mut doc)).await {
                Ok(mut process) => {
                    info!("{}", Notification::launched(file).message);
                    let status = process.wait().await.context("waiting for DhrLang")?;
                    if !status.success() {
                        std::process::exit(status.code().unwrap_or(1));
                    }
                }
                Err(e) => bail!(Notification::from_error(&e).message),
            }
        }
        Command::Check { file } => {
            let session = build_session(&cli)?;
            let mut doc = FileDocument::new(file);
            match session.compile_file(Some(&mut doc)).await {
                Ok(result) => {
                    let note = Notification::compiled(&result);
                    eprintln!("{}", note.message);
                    if let Some(output) = note.output {
                        println!("{output}");
                    }
                }
                Err(e) => bail!(Notification::from_error(&e).message),
            }
        }
    }

    Ok(())
}

fn build_session(cli: &Cli) -> Result<Session> {
    let roots: Vec<PathBuf> = if cli.workspace.is_empty() {
        vec![std::env::current_dir().context("reading current directory")?]
    } else {
        cli.workspace
            .iter()
            .map(|p| std::fs::canonicalize(p).unwrap_or_else(|_| p.clone()))
            .collect()
    };

    let mut settings = DhrLangSettings::load(&roots[0]);
    if let Some(java) = &cli.java {
        settings.java_path = java.clone();
    }
    if let Some(jar) = &cli.jar {
        settings.jar_path = jar.clone();
    }
    if cli.no_auto_detect {
        settings.auto_detect_jar = false;
    }

    let install_root = cli.install_root.clone().or_else(|| {
        std::env::current_exe()
            .ok()
            .and_then(|exe| ProbeRoots::install_root_from_exe(&exe))
    });

    info!("workspace roots: {roots:?}");
    Ok(Session::new(settings, ProbeRoots::new(roots, install_root)))
}
