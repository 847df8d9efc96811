pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{bridge, catalog, ledger, stdio, tooling};
pub use cli::{Cli, RunMode};
pub use config::AppConfig;
pub use domain::types;
pub use infrastructure::{model, server};

use bridge::{Bridge, ConnectRequest};
use cli::CliError;
use model::GeminiClient;
use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};
use types::LaunchSpec;

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing(cli.mode == RunMode::Stdio);
    info!("Starting gemini-mcp-bridge");
    debug!(
        mode = ?cli.mode,
        config = ?cli.config,
        server = ?cli.server,
        "CLI arguments parsed"
    );

    let config = AppConfig::load(cli.config.as_deref())?;
    match &cli.config {
        Some(path) => info!(path = %path.display(), "Loaded configuration from file"),
        None => info!("Loaded configuration from default path"),
    }

    let provider = GeminiClient::from_config(&config.model)?;
    let bridge = Arc::new(Bridge::from_config(provider, &config));

    match cli.mode {
        RunMode::Stdio => {
            let api_key = match cli.api_key.clone() {
                Some(key) => key,
                None => env::var(&config.model.api_key_env)
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| CliError::MissingApiKey(config.model.api_key_env.clone()))?,
            };
            let launch = match cli.server.as_deref() {
                Some(target) => cli::resolve_launch(target, &config)?,
                None => select_server_interactive(&config)?,
            };

            let outcome = bridge
                .connect(ConnectRequest::new(launch).with_api_key(api_key))
                .await?;
            println!("Connected to server with {} tools:", outcome.tools.len());
            for tool in &outcome.tools {
                println!("  - {}: {}", tool.name, tool.description);
            }

            info!("Launching STDIO interactive chat interface");
            let result = stdio::run(Arc::clone(&bridge)).await;
            bridge.shutdown().await;
            result?;
        }
        RunMode::Rest => {
            let mut rest = config.rest.clone();
            if let Some(addr) = cli.rest_addr {
                rest.bind = addr;
            }
            info!(addr = %rest.bind, "Starting REST server");
            server::serve(bridge, &rest).await?;
        }
    }
    info!("Bridge execution finished");
    Ok(())
}

fn select_server_interactive(config: &AppConfig) -> Result<LaunchSpec, Box<dyn Error>> {
    println!("Choose your MCP server:");
    println!("  1. Weather server (NPX)");
    println!("  2. Custom Python server");
    println!("  3. Custom Node.js server");
    for (index, server) in config.servers.iter().enumerate() {
        println!("  {}. {} (configured)", index + 4, server.name);
    }
    print!("Enter choice: ");
    io::stdout().flush()?;

    match read_trimmed_line()?.as_str() {
        "1" => Ok(cli::weather_preset()),
        "2" => {
            print!("Enter path to Python server script: ");
            io::stdout().flush()?;
            Ok(LaunchSpec::new("python").with_args([read_trimmed_line()?]))
        }
        "3" => {
            print!("Enter path to Node.js server script: ");
            io::stdout().flush()?;
            Ok(LaunchSpec::new("node").with_args([read_trimmed_line()?]))
        }
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|choice| choice.checked_sub(4))
            .and_then(|index| config.servers.get(index))
            .map(|server| server.launch())
            .ok_or_else(|| CliError::UnsupportedServer(other.to_string()).into()),
    }
}

fn read_trimmed_line() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Installs the global subscriber once. Quiet mode keeps the terminal clean
/// for the chat unless `RUST_LOG` asks for output.
fn init_tracing(quiet: bool) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let fallback = if quiet { "off" } else { "info" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
