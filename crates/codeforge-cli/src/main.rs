//! codeforge CLI — serve, onboarding, and status commands.
//!
//! Usage:
//!   codeforge serve         — Run the code generation gateway
//!   codeforge onboard       — Create a default configuration
//!   codeforge status        — Show current configuration and health
//!   codeforge models        — Print the aggregated model catalog

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use codeforge_core::config::Config;
use codeforge_core::registry::ProviderRegistry;
use codeforge_core::server::{self, AppState};
use codeforge_core::workspace::WorkspaceStore;

/// Timeout for outbound provider calls. Generation can be slow, so this is
/// generous; it exists only to bound a hung backend connection.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Parser)]
#[command(
    name = "codeforge",
    version,
    about = "A multi-provider AI code generation gateway",
    long_about = "codeforge — routes code generation requests to OpenAI, Mistral, \
or HuggingFace by model id, over HTTP and WebSocket."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway server
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create or reset the default configuration
    Onboard,

    /// Show configuration status and health
    Status,

    /// Print the aggregated model catalog
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(host.as_deref(), port).await?,
        Some(Commands::Onboard) => cmd_onboard()?,
        Some(Commands::Status) => cmd_status()?,
        Some(Commands::Models) => cmd_models()?,
        None => cmd_serve(None, None).await?,
    }

    Ok(())
}

// ── Serve Command ───────────────────────────────────────────────────

async fn cmd_serve(host: Option<&str>, port: Option<u16>) -> Result<()> {
    let config = Config::load()?;

    let client = reqwest::Client::builder()
        .timeout(PROVIDER_TIMEOUT)
        .build()?;

    let registry = ProviderRegistry::from_config(&config, client);
    let workspace = WorkspaceStore::new(config.workspace_path())?;

    let host = host.unwrap_or(&config.server.host).to_string();
    let port = port.unwrap_or(config.server.port);

    println!();
    println!("  codeforge v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Providers: {}",
        if registry.is_empty() {
            "none (no models available)".to_string()
        } else {
            registry.provider_names().join(", ")
        }
    );
    println!("  Workspace: {}", workspace.root().display());
    println!("  Listening: http://{}:{}", host, port);
    println!("  Press Ctrl+C for graceful shutdown.");
    println!();

    let state = Arc::new(AppState {
        registry: Arc::new(registry),
        workspace: Arc::new(workspace),
    });

    server::serve(state, &host, port).await
}

// ── Onboard Command ─────────────────────────────────────────────────

fn cmd_onboard() -> Result<()> {
    let path = Config::write_default_template()?;
    println!();
    println!("  Configuration created at:");
    println!("     {}", path.display());
    println!();
    println!("  Next steps:");
    println!("  1. Edit the config file and add at least one API key");
    println!("     (or export OPENAI_API_KEY / MISTRAL_API_KEY / HUGGINGFACE_API_KEY)");
    println!("  2. Run `codeforge serve` to start the gateway");
    println!();
    Ok(())
}

// ── Status Command ──────────────────────────────────────────────────

fn cmd_status() -> Result<()> {
    let config_path = Config::default_path();
    let config = Config::load()?;

    println!();
    println!("  codeforge status");
    println!("  ─────────────────────────────────────");

    if config_path.exists() {
        println!("  Config:    {}", config_path.display());
    } else {
        println!("  Config:    not found (using defaults; run `codeforge onboard`)");
    }

    let configured = config.providers.configured();
    if configured.is_empty() {
        println!("  Providers: none configured");
    } else {
        println!("  Providers: {}", configured.join(", "));
    }

    let ws = config.workspace_path();
    println!(
        "  Workspace: {} {}",
        ws.display(),
        if ws.exists() { "" } else { "(will be created)" }
    );
    println!("  Server:    {}:{}", config.server.host, config.server.port);
    println!();
    Ok(())
}

// ── Models Command ──────────────────────────────────────────────────

fn cmd_models() -> Result<()> {
    let config = Config::load()?;
    let registry = ProviderRegistry::from_config(&config, reqwest::Client::new());

    let models = registry.all_models();
    if models.is_empty() {
        println!("  No models available (no provider configured).");
        return Ok(());
    }

    println!();
    for model in models {
        println!("  {:40} {:20} [{}]", model.id, model.name, model.provider);
    }
    println!();
    Ok(())
}
