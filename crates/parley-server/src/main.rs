use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod history;
mod openai;
mod routes;

use history::SessionHistory;
use openai::OpenAIClient;
use routes::AppState;

/// Chat relay: keeps per-session history and forwards each turn to OpenAI
#[derive(Parser, Debug)]
#[command(name = "parley-server", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "PARLEY_BIND", default_value = "127.0.0.1:5328")]
    bind: SocketAddr,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = openai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// Chat model to request
    #[arg(long, default_value = openai::DEFAULT_MODEL)]
    model: String,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let state = Arc::new(AppState {
        openai: OpenAIClient::new(&args.openai_base_url, &args.model),
        history: SessionHistory::new(),
    });

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!(addr = %args.bind, model = %args.model, "parley-server listening");

    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
