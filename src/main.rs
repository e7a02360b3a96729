use std::env;
use std::future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

mod clipboard;
mod completion;
mod config;
mod document;
mod editor;
mod error;
mod input;
mod render;
mod scripting;
mod storage;
mod theme;

use clipboard::{ClipboardWriter, CopyStatus, SystemClipboard};
use completion::{Completion, CompletionEvent, HttpCompletionClient, bridge};
use editor::{Editor, ToastKind};
use input::Request;
use render::Renderer;
use scripting::ScriptEngine;
use storage::LocalStore;
use theme::Theme;

/// Log to a file under the data dir; the terminal belongs to the editor
fn init_logging() -> Option<WorkerGuard> {
    let log_dir = LocalStore::data_dir()?;
    std::fs::create_dir_all(&log_dir).ok()?;
    let appender = tracing_appender::rolling::never(log_dir, "quill.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

fn install_panic_hook() {
    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = Renderer::teardown();
        tracing::error!(target: "runtime", %info, "panic");
        prev(info);
    }));
}

/// Resolves at `deadline`, or never when there is nothing scheduled
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at.into()).await,
        None => future::pending().await,
    }
}

struct Channels {
    events_rx: mpsc::UnboundedReceiver<CompletionEvent>,
    copy_tx: mpsc::UnboundedSender<CopyStatus>,
    copy_rx: mpsc::UnboundedReceiver<CopyStatus>,
}

async fn event_loop(
    editor: &mut Editor,
    store: &mut LocalStore,
    theme: &Theme,
    clipboard: Arc<dyn ClipboardWriter>,
    mut channels: Channels,
) -> io::Result<()> {
    let mut renderer = Renderer::new()?;
    editor.adjust_scroll(renderer.text_height());
    renderer.render(editor, theme)?;

    let mut event_stream = EventStream::new();

    while editor.running {
        let deadline = editor.next_deadline();
        tokio::select! {
            maybe_event = event_stream.next() => match maybe_event {
                Some(Ok(Event::Resize(..))) => {
                    renderer = Renderer::new()?;
                }
                Some(Ok(event)) => {
                    if let Some(Request::CopyDocument) =
                        input::handle_event(editor, event, Instant::now())
                    {
                        let html = editor.doc.get_html();
                        let writer = Arc::clone(&clipboard);
                        let copy_tx = channels.copy_tx.clone();
                        tokio::spawn(async move {
                            let status = clipboard::copy_text(writer.as_ref(), html).await;
                            let _ = copy_tx.send(status);
                        });
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(target: "runtime", error = %e, "terminal event error");
                }
                None => break,
            },
            Some(event) = channels.events_rx.recv() => {
                bridge::apply_event(editor, event, Instant::now());
            }
            Some(status) = channels.copy_rx.recv() => {
                editor.show_copy_status(status, Instant::now());
            }
            _ = sleep_until(deadline) => {}
        }

        editor.poll_timers(Instant::now(), store);
        editor.adjust_scroll(renderer.text_height());
        renderer.render(editor, theme)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging();
    tracing::info!(target: "runtime", version = env!("CARGO_PKG_VERSION"), "starting");

    // Config script, then environment overrides
    let mut script_engine = ScriptEngine::new();
    let config_error = script_engine.load_default().err();
    if let Some(e) = &config_error {
        tracing::warn!(target: "config", error = %e, "config script failed, using defaults");
    }
    let mut settings = script_engine.settings();
    settings.apply_env();
    let theme = theme::get_builtin_theme(&settings.theme).unwrap_or_else(|| {
        tracing::warn!(target: "config", theme = %settings.theme, "unknown theme");
        Theme::default()
    });

    let args: Vec<String> = env::args().collect();
    let store_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => LocalStore::default_path().context("no data directory for the document store")?,
    };
    let mut store = LocalStore::open(store_path);
    tracing::info!(target: "storage", path = %store.path().display(), "document store opened");

    let client =
        HttpCompletionClient::new(&settings.endpoint).context("failed to build HTTP client")?;
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (copy_tx, copy_rx) = mpsc::unbounded_channel();
    let completion = Completion::new(Box::new(client), events_tx, &settings.completion_id);

    let mut editor = Editor::new(&settings, completion);
    editor.hydrate(&store);
    if let Some(e) = config_error {
        editor.show_toast(ToastKind::Error, format!("Config error: {e}"), Instant::now());
    }

    let clipboard: Arc<dyn ClipboardWriter> = Arc::new(SystemClipboard::new());
    let channels = Channels {
        events_rx,
        copy_tx,
        copy_rx,
    };

    install_panic_hook();
    Renderer::setup().context("failed to set up terminal")?;
    let result = event_loop(&mut editor, &mut store, &theme, clipboard, channels).await;
    Renderer::teardown()?;

    // Keep what was streamed so far, like the undo chord
    if editor.completion.is_loading() {
        bridge::cancel(&mut editor, false, Instant::now());
    }
    editor.flush_pending(&mut store, Instant::now());
    tracing::info!(target: "runtime", "exiting");

    result.context("terminal I/O failed")
}
