use anyhow::Context;
use clap::{Parser, Subcommand};
use lobby_config::load as load_config;
use lobby_gateway::{create_router, GatewayState};
use lobby_runtime::{telemetry, LobbyServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "lobby-server")]
#[command(about = "Lobby chat backend (serves by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve,
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Config => print_config(),
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Lobby backend");

    let config = load_config().context("failed to load configuration")?;

    let services =
        LobbyServices::initialise(&config).context("failed to initialise lobby services")?;

    let state = GatewayState::new(
        services.broker.clone(),
        services.notifier.clone(),
        services.controller.clone(),
        &config.broker,
    );
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(lobby_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

fn print_config() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    let rendered =
        serde_json::to_string_pretty(&config).context("failed to render configuration")?;
    println!("{rendered}");
    Ok(())
}
