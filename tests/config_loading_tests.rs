// Config loading tests - testing AppConfig::load error handling
//
// Tests focused on configuration file loading and validation errors.

use gemini_mcp_bridge::config::{AppConfig, ConfigError};
use gemini_mcp_bridge::constants::DEFAULT_MODEL;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("bridge.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/bridge.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn returns_error_when_toml_is_malformed() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[model\ndefault_model = ");

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn empty_file_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "");

    let config = AppConfig::load(Some(&path)).expect("empty config is valid");
    assert_eq!(config.model.default_model, DEFAULT_MODEL);
    assert_eq!(config.model.default_temperature, 0.0);
    assert_eq!(config.model.api_key_env, "GEMINI_API_KEY");
    assert_eq!(config.ledger.prompt_window, None);
    assert!(config.servers.is_empty());
    assert_eq!(config.fallback_table().names(), vec!["get_products", "login"]);
}

#[test]
fn returns_error_when_temperature_out_of_range() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
default_temperature = 3.5
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidTemperature { value }) if value == 3.5
    ));
}

#[test]
fn returns_error_when_handshake_timeout_is_zero() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[session]
handshake_timeout_secs = 0
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(
        result,
        Err(ConfigError::ZeroValue {
            field: "session.handshake_timeout_secs"
        })
    ));
}

#[test]
fn returns_error_when_prompt_window_is_zero() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[ledger]
prompt_window = 0
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(
        result,
        Err(ConfigError::ZeroValue {
            field: "ledger.prompt_window"
        })
    ));
}

#[test]
fn returns_error_when_bind_address_is_invalid() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[rest]
bind = "localhost-without-port"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::InvalidBind { .. })));
}

#[test]
fn returns_error_when_server_has_no_command() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[[servers]]
name = "broken"
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(
        result,
        Err(ConfigError::MissingCommand { ref server }) if server == "broken"
    ));
}

#[test]
fn returns_error_when_fallback_entry_is_unnamed() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[[fallback_schemas]]
parameters = [{ name = "id", type = "string" }]
"#,
    );

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::UnnamedFallback)));
}

#[test]
fn loads_full_configuration() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
default_model = "gemini-1.5-pro"
default_temperature = 0.4
api_key_env = "BRIDGE_TEST_KEY"
request_timeout_secs = 15

[session]
handshake_timeout_secs = 5

[ledger]
prompt_window = 12

[rest]
bind = "127.0.0.1:9100"
cors_origins = ["http://localhost:3000"]

[[fallback_schemas]]
name = "search_students"
parameters = [
    { name = "query", type = "string", description = "Name fragment", required = true },
    { name = "limit", type = "integer" },
]

[[servers]]
name = "shop"
command = "python"
args = ["shop_server.py"]
env = { SHOP_MODE = "demo" }
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("config loads");

    assert_eq!(config.model.default_model, "gemini-1.5-pro");
    assert_eq!(config.model.default_temperature, 0.4);
    assert_eq!(config.model.api_key_env, "BRIDGE_TEST_KEY");
    assert_eq!(config.model.request_timeout(), Duration::from_secs(15));
    assert_eq!(config.session.handshake_timeout(), Duration::from_secs(5));
    assert_eq!(config.ledger.prompt_window, Some(12));
    assert_eq!(config.rest.bind, "127.0.0.1:9100".parse().expect("addr"));
    assert_eq!(config.rest.cors_origins, vec!["http://localhost:3000"]);

    let table = config.fallback_table();
    assert_eq!(
        table.names(),
        vec!["get_products", "login", "search_students"]
    );
    let schema = table.shape_for("search_students").to_schema();
    assert_eq!(schema["properties"]["query"]["type"], "string");
    assert_eq!(schema["properties"]["limit"]["type"], "integer");
    assert_eq!(schema["required"], serde_json::json!(["query"]));

    let launch = config.server("shop").expect("shop preset").launch();
    assert_eq!(launch.command, "python");
    assert_eq!(launch.args, vec!["shop_server.py"]);
    assert_eq!(launch.env.get("SHOP_MODE").map(String::as_str), Some("demo"));
}

#[test]
fn fallback_entries_override_builtin_shapes() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[[fallback_schemas]]
name = "login"
parameters = [{ name = "token", type = "string", required = true }]
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("config loads");
    let schema = config.fallback_table().shape_for("login").to_schema();

    assert_eq!(schema["required"], serde_json::json!(["token"]));
    assert!(schema["properties"].get("username").is_none());
}
