use crate::types::LaunchSpec;
use serde::Deserialize;
use std::collections::HashMap;

/// A named tool-provider launch preset from `[[servers]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl ServerConfig {
    pub fn launch(&self) -> LaunchSpec {
        LaunchSpec::new(self.command.clone())
            .with_args(self.args.clone())
            .with_env(self.env.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawServer {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) command: String,
    #[serde(default)]
    pub(crate) args: Vec<String>,
    #[serde(default)]
    pub(crate) env: HashMap<String, String>,
}

impl From<RawServer> for ServerConfig {
    fn from(raw: RawServer) -> Self {
        Self {
            name: raw.name,
            command: expand(&raw.command),
            args: raw.args.iter().map(|arg| expand(arg)).collect(),
            env: raw
                .env
                .into_iter()
                .map(|(key, value)| (key, expand(&value)))
                .collect(),
        }
    }
}

/// Expands `~` and `${VAR}`, keeping the input untouched when a variable is unset.
pub(crate) fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn expands_env_vars_in_command_args_and_env() {
        unsafe {
            env::set_var("BRIDGE_TEST_ROOT", "/opt/providers");
            env::set_var("BRIDGE_TEST_TOKEN", "secret");
        }

        let raw = RawServer {
            name: "store".to_string(),
            command: "${BRIDGE_TEST_ROOT}/bin/store".to_string(),
            args: vec!["--data".to_string(), "${BRIDGE_TEST_ROOT}/data".to_string()],
            env: HashMap::from([("TOKEN".to_string(), "${BRIDGE_TEST_TOKEN}".to_string())]),
        };

        let config = ServerConfig::from(raw);
        assert_eq!(config.command, "/opt/providers/bin/store");
        assert_eq!(config.args[1], "/opt/providers/data");
        assert_eq!(config.env.get("TOKEN").map(String::as_str), Some("secret"));

        let launch = config.launch();
        assert_eq!(launch.command, config.command);
        assert_eq!(launch.args.len(), 2);

        unsafe {
            env::remove_var("BRIDGE_TEST_ROOT");
            env::remove_var("BRIDGE_TEST_TOKEN");
        }
    }

    #[test]
    fn unknown_variables_are_left_verbatim() {
        assert_eq!(
            expand("${BRIDGE_SURELY_UNSET_VARIABLE}/x"),
            "${BRIDGE_SURELY_UNSET_VARIABLE}/x"
        );
    }
}
