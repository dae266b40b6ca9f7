use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use parley_core::{BackendClient, Config, CredentialStore, FileStore};

/// Terminal chat client for a completions backend
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
struct Args {
    /// Chat backend endpoint
    #[arg(long, env = "PARLEY_ENDPOINT")]
    endpoint: Option<String>,

    /// Where the API key is persisted
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Config file to read instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let storage_path = match args.storage.clone().or_else(|| config.storage_path.clone()) {
        Some(path) => path,
        None => FileStore::default_path()?,
    };
    init_logging(&Config::get_log_path()?, args.debug)?;

    let endpoint = config.resolve_endpoint(args.endpoint.as_deref());
    tracing::info!(%endpoint, storage = ?storage_path, "starting parley");

    let credentials = CredentialStore::load(Box::new(FileStore::new(storage_path)));
    let backend = Arc::new(BackendClient::new(&endpoint));
    let mut app = App::new(credentials, backend, &endpoint);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

/// Log to a file; the terminal belongs to the UI
fn init_logging(log_path: &Path, debug: bool) -> Result<()> {
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir)?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let filter = if debug {
        EnvFilter::new("parley=debug,parley_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    Ok(())
}
