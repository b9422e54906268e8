//! Command-line interface.

use crate::error::{AppError, AppResult};
use crate::script::{ScriptStep, parse_script};
use crate::session::{SessionHandle, drive, run_session};
use crate::svg::SvgSink;
use clap::{Parser, Subcommand};
use inkboard_core::storage::{FileStore, create_default_store};
use inkboard_core::{
    DEFAULT_DOCUMENT_KEY, DEFAULT_RECONCILE_INTERVAL_MS, PersistenceAdapter, RenderDispatcher,
    Whiteboard, WhiteboardConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "inkboard", version, about = "Shared freehand whiteboard history")]
pub struct Cli {
    /// Directory of the shared store (defaults to the platform data directory).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Key the document is stored under.
    #[arg(long, global = true, default_value = DEFAULT_DOCUMENT_KEY)]
    pub key: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a pointer script into the shared document.
    Draw {
        /// JSON-lines script of pointer and history steps.
        #[arg(long)]
        script: PathBuf,
        /// Write the final drawing here.
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Reconciliation interval in milliseconds.
        #[arg(long, default_value_t = DEFAULT_RECONCILE_INTERVAL_MS)]
        interval_ms: u64,
    },
    /// Follow the shared document, rewriting an SVG on every remote change.
    Watch {
        #[arg(long)]
        svg: PathBuf,
        /// Reconciliation interval in milliseconds.
        #[arg(long, default_value_t = DEFAULT_RECONCILE_INTERVAL_MS)]
        interval_ms: u64,
    },
    /// Print the stored snapshot.
    Show {
        /// Also write the visible strokes here.
        #[arg(long)]
        svg: Option<PathBuf>,
    },
}

pub async fn run(cli: Cli) -> AppResult<()> {
    let store = Arc::new(match &cli.store {
        Some(path) => FileStore::new(path.clone())?,
        None => create_default_store()?,
    });
    log::info!("Using store at {}", store.base_path().display());

    match cli.command {
        Command::Draw {
            script,
            svg,
            interval_ms,
        } => {
            let text = std::fs::read_to_string(&script).map_err(|source| AppError::Io {
                path: script.clone(),
                source,
            })?;
            let steps = parse_script(&text)?;
            let config = config(&cli.key, interval_ms);
            let whiteboard = draw(store, config, steps).await?;

            let history = whiteboard.history();
            println!(
                "{} strokes, {} visible, version {}",
                history.len(),
                history.cursor(),
                history.version()
            );
            if let Some(path) = svg {
                whiteboard.sink().write_to(&path)?;
            }
            Ok(())
        }
        Command::Watch { svg, interval_ms } => {
            watch(store, config(&cli.key, interval_ms), &svg).await
        }
        Command::Show { svg } => show(store, &cli.key, svg.as_deref()).await,
    }
}

fn config(key: &str, interval_ms: u64) -> WhiteboardConfig {
    WhiteboardConfig::default()
        .with_document_key(key)
        .with_reconcile_interval(Duration::from_millis(interval_ms))
}

/// Open the document, replay `steps` through a live session and return the
/// whiteboard once everything is saved.
pub async fn draw(
    store: Arc<FileStore>,
    config: WhiteboardConfig,
    steps: Vec<ScriptStep>,
) -> AppResult<Whiteboard<FileStore, SvgSink>> {
    let whiteboard = Whiteboard::open(store, SvgSink::new(), config).await;
    let (handle, rx) = SessionHandle::start(whiteboard.reconciler().interval());

    let session = run_session(whiteboard, rx, |_| {});
    let driver = async {
        let mut result = Ok(());
        for step in steps {
            if let Some(delay) = step.delay() {
                tokio::time::sleep(delay).await;
            }
            if let Some(command) = step.command() {
                if let Err(e) = handle.send(command).await {
                    result = Err(e);
                    break;
                }
            }
        }
        handle.shutdown().await;
        result
    };

    let (whiteboard, result) = tokio::join!(session, driver);
    result.map(|()| whiteboard)
}

async fn watch(store: Arc<FileStore>, config: WhiteboardConfig, svg: &Path) -> AppResult<()> {
    let whiteboard = Whiteboard::open(store, SvgSink::new(), config).await;
    whiteboard.sink().write_to(svg)?;

    let (handle, rx) = SessionHandle::start(whiteboard.reconciler().interval());
    let session = run_session(whiteboard, rx, |whiteboard| {
        match whiteboard.sink().write_to(svg) {
            Ok(()) => log::info!(
                "Wrote v{} to {}",
                whiteboard.history().version(),
                svg.display()
            ),
            Err(e) => log::error!("{}", e),
        }
    });
    let driver = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
        }
        handle.shutdown().await;
    };

    drive(session, driver).await;
    Ok(())
}

async fn show(store: Arc<FileStore>, key: &str, svg: Option<&Path>) -> AppResult<()> {
    let persistence = PersistenceAdapter::new(store, key);
    let snapshot = match persistence.try_load().await {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            println!("Nothing stored under '{}'", key);
            return Ok(());
        }
        Err(e) => {
            println!("Stored document is unusable: {}", e);
            return Ok(());
        }
    };

    println!(
        "{} strokes, {} visible, version {}, schema {}",
        snapshot.entries.len(),
        snapshot.cursor,
        snapshot.version,
        snapshot.schema
    );
    for (i, stroke) in snapshot.entries.iter().enumerate() {
        let marker = if i < snapshot.cursor { ' ' } else { '~' };
        println!(
            "{} {:>3}  {:<10} width {:<4} {} points",
            marker,
            i,
            stroke.style.color,
            stroke.style.width,
            stroke.len()
        );
    }

    if let Some(path) = svg {
        let mut sink = SvgSink::new();
        RenderDispatcher::new().redraw_from(snapshot.active_strokes(), &mut sink);
        sink.write_to(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCRIPT: &str = r#"
{"op": "pen", "color": "red", "width": 3}
{"op": "down", "x": 0, "y": 0}
{"op": "move", "x": 10, "y": 0}
{"op": "up"}
{"op": "down", "x": 0, "y": 5}
{"op": "move", "x": 10, "y": 5}
{"op": "up"}
{"op": "undo"}
"#;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "inkboard", "--store", "/tmp/x", "draw", "--script", "s.jsonl", "--interval-ms", "250",
        ])
        .unwrap();
        assert_eq!(cli.key, DEFAULT_DOCUMENT_KEY);
        assert!(matches!(
            cli.command,
            Command::Draw {
                interval_ms: 250,
                svg: None,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_draw_persists_and_second_run_continues() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path().to_path_buf()).unwrap());
        let config = WhiteboardConfig::default();

        let first = draw(Arc::clone(&store), config.clone(), parse_script(SCRIPT).unwrap())
            .await
            .unwrap();
        assert_eq!(first.history().len(), 2);
        assert_eq!(first.history().cursor(), 1);
        assert_eq!(first.history().version(), 3);
        assert_eq!(first.sink().strokes().len(), 1);

        // A second participant picks the document up and redoes the stroke.
        let redo = parse_script(r#"{"op": "redo"}"#).unwrap();
        let second = draw(Arc::clone(&store), config, redo).await.unwrap();
        assert_eq!(second.history().cursor(), 2);
        assert_eq!(second.history().version(), 4);

        let stored = PersistenceAdapter::new(store, DEFAULT_DOCUMENT_KEY)
            .load()
            .await
            .unwrap();
        assert_eq!(stored, second.history().snapshot());
    }

    #[tokio::test]
    async fn test_show_svg_export() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path().to_path_buf()).unwrap());
        draw(
            Arc::clone(&store),
            WhiteboardConfig::default(),
            parse_script(SCRIPT).unwrap(),
        )
        .await
        .unwrap();

        let svg_path = dir.path().join("out.svg");
        show(store, DEFAULT_DOCUMENT_KEY, Some(svg_path.as_path())).await.unwrap();

        let svg = std::fs::read_to_string(&svg_path).unwrap();
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains(r#"stroke="red""#));
    }
}
