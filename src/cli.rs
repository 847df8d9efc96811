use crate::config::AppConfig;
use crate::types::LaunchSpec;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(
    name = "gemini-mcp-bridge",
    version,
    about = "Chat with Gemini using the tools of an MCP server"
)]
pub struct Cli {
    /// Configuration file (defaults to config/bridge.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, short, value_enum, default_value_t = RunMode::Stdio)]
    pub mode: RunMode,
    /// Overrides `[rest] bind`
    #[arg(long)]
    pub rest_addr: Option<SocketAddr>,
    /// `weather`, a `.py`/`.js` server script, or a `[[servers]]` name
    #[arg(long)]
    pub server: Option<String>,
    /// Gemini API key; falls back to the environment variable named in `[model]`
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RunMode {
    /// Interactive chat on this terminal
    Stdio,
    /// REST API server
    Rest,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unsupported server '{0}': use 'weather', a .py/.js file path, or a configured server name")]
    UnsupportedServer(String),
    #[error("{0} environment variable not set")]
    MissingApiKey(String),
}

/// Turns a `--server` value into a launch spec. Configured `[[servers]]`
/// entries take precedence over the built-in presets.
pub fn resolve_launch(target: &str, config: &AppConfig) -> Result<LaunchSpec, CliError> {
    let target = target.trim();
    if let Some(server) = config.server(target) {
        return Ok(server.launch());
    }
    if target.eq_ignore_ascii_case("weather") {
        return Ok(weather_preset());
    }
    match Path::new(target).extension().and_then(|ext| ext.to_str()) {
        Some("py") => Ok(LaunchSpec::new("python").with_args([target])),
        Some("js") => Ok(LaunchSpec::new("node").with_args([target])),
        _ => Err(CliError::UnsupportedServer(target.to_string())),
    }
}

pub fn weather_preset() -> LaunchSpec {
    LaunchSpec::new("npx").with_args(["-y", "@philschmid/weather-mcp"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn presets_follow_the_target_shape() {
        let config = AppConfig::default();
        assert_eq!(
            resolve_launch("weather", &config).ok(),
            Some(weather_preset())
        );
        let python = resolve_launch("servers/shop.py", &config).expect("python preset");
        assert_eq!(python.command, "python");
        assert_eq!(python.args, vec!["servers/shop.py"]);
        let node = resolve_launch("shop.js", &config).expect("node preset");
        assert_eq!(node.command, "node");
        assert!(matches!(
            resolve_launch("shop.rb", &config),
            Err(CliError::UnsupportedServer(_))
        ));
    }

    #[test]
    fn configured_servers_shadow_presets() {
        let config = parse_config(
            r#"
            [[servers]]
            name = "weather"
            command = "uvx"
            args = ["weather-server"]
            "#,
            Path::new("inline.toml"),
        )
        .expect("config parses");
        let launch = resolve_launch("weather", &config).expect("configured server");
        assert_eq!(launch.command, "uvx");
        assert_eq!(launch.args, vec!["weather-server"]);
    }

    #[test]
    fn parses_rest_mode_flags() {
        let cli = Cli::parse_from([
            "gemini-mcp-bridge",
            "--mode",
            "rest",
            "--rest-addr",
            "127.0.0.1:9000",
        ]);
        assert_eq!(cli.mode, RunMode::Rest);
        assert_eq!(cli.rest_addr, Some("127.0.0.1:9000".parse().expect("addr")));
        assert!(cli.server.is_none());
    }
}
