//! Daemon configuration
//!
//! Layered: built-in defaults, then the TOML file, then `DASHPANEL_*`
//! environment variables. Nested keys use a double underscore
//! (`DASHPANEL_RPC__PORT=9600`), `DASHPANEL_WIDGETS` is a comma list.

use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use dashpanel_api_rpc::RpcServerConfig;
use dashpanel_core::application::catalog::DEFAULT_LAYOUT;
use dashpanel_core::application::DashboardOptions;
use dashpanel_core::domain::WidgetSpec;

const ENV_PREFIX: &str = "DASHPANEL";
const CONFIG_PATH_ENV: &str = "DASHPANEL_CONFIG";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_SHELL: &str = "bash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub rate_limit_burst: u32,
    pub rate_limit_rate: u32,
}

impl Default for RpcSettings {
    fn default() -> Self {
        let server = RpcServerConfig::default();
        Self {
            enabled: true,
            host: server.host,
            port: server.port,
            rate_limit_burst: server.rate_limit_burst,
            rate_limit_rate: server.rate_limit_rate,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Interpreter for snippets and actions (needs `pipefail`)
    pub shell: String,
    pub poll_timeout_ms: u64,
    pub dispatch_timeout_ms: u64,
    pub rpc: RpcSettings,
    pub log_format: LogFormat,
    /// Daily rolling JSON log files are written here when set
    pub log_dir: Option<String>,
    /// Print one JSON snapshot per line to stdout on every change
    pub stream_stdout: bool,
    /// Composition, top to bottom
    pub widgets: Vec<String>,
    /// User widgets; shadow built-ins of the same name
    pub custom_widgets: Vec<WidgetSpec>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let options = DashboardOptions::default();
        Self {
            shell: DEFAULT_SHELL.to_string(),
            poll_timeout_ms: options.poll_timeout.as_millis() as u64,
            dispatch_timeout_ms: options.dispatch_timeout.as_millis() as u64,
            rpc: RpcSettings::default(),
            log_format: LogFormat::Pretty,
            log_dir: None,
            stream_stdout: false,
            widgets: DEFAULT_LAYOUT.iter().map(|w| w.to_string()).collect(),
            custom_widgets: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Load from the default file location and the process environment
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        let path = config_path();
        let config = Self::from_sources(path.clone(), None)?;
        Ok((config, path))
    }

    /// Load from an optional file and an environment map
    ///
    /// `env: None` reads the process environment. A missing file is not an error.
    pub fn from_sources(path: Option<PathBuf>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = &path {
            builder = builder.add_source(File::from(path.clone()).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("widgets")
                .source(env),
        );

        let mut config: DaemonConfig = builder
            .build()
            .and_then(|c| c.try_deserialize::<DaemonConfig>())
            .with_context(|| match &path {
                Some(p) => format!("Invalid configuration ({})", p.display()),
                None => "Invalid configuration".to_string(),
            })?;

        config.log_dir = config
            .log_dir
            .map(|dir| shellexpand::tilde(&dir).into_owned());
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.shell.trim().is_empty(), "shell must not be empty");
        ensure!(self.poll_timeout_ms > 0, "poll_timeout_ms must be > 0");
        ensure!(self.dispatch_timeout_ms > 0, "dispatch_timeout_ms must be > 0");
        ensure!(
            self.rpc.rate_limit_burst > 0,
            "rpc.rate_limit_burst must be > 0"
        );
        Ok(())
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            dispatch_timeout: Duration::from_millis(self.dispatch_timeout_ms),
        }
    }

    pub fn rpc_server_config(&self) -> RpcServerConfig {
        RpcServerConfig {
            host: self.rpc.host.clone(),
            port: self.rpc.port,
            rate_limit_burst: self.rpc.rate_limit_burst,
            rate_limit_rate: self.rpc.rate_limit_rate,
        }
    }
}

/// `$DASHPANEL_CONFIG`, else `<config dir>/dashpanel/config.toml`
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(shellexpand::tilde(&path).into_owned()));
    }

    directories::ProjectDirs::from("", "", "dashpanel")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashpanel_core::domain::WidgetRow;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "dashpanel-config-{}-{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = DaemonConfig::from_sources(None, env(&[])).unwrap();

        assert_eq!(config.shell, "bash");
        assert_eq!(config.poll_timeout_ms, 10_000);
        assert_eq!(config.rpc.host, "127.0.0.1");
        assert_eq!(config.rpc.port, 9531);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.widgets, DEFAULT_LAYOUT);
        assert!(config.custom_widgets.is_empty());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("dashpanel-definitely-missing.toml");
        assert!(DaemonConfig::from_sources(Some(path), env(&[])).is_ok());
    }

    #[test]
    fn test_file_then_env_override() {
        let path = write_config(
            "override",
            r#"
shell = "zsh"
poll_timeout_ms = 2500
widgets = ["clock", "volume"]

[rpc]
port = 9600
"#,
        );

        let config = DaemonConfig::from_sources(
            Some(path.clone()),
            env(&[
                ("DASHPANEL_SHELL", "bash"),
                ("DASHPANEL_RPC__PORT", "9700"),
                ("DASHPANEL_LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(config.shell, "bash");
        assert_eq!(config.poll_timeout_ms, 2500);
        assert_eq!(config.rpc.port, 9700);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.widgets, vec!["clock", "volume"]);
        assert_eq!(
            config.dashboard_options().poll_timeout,
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_widget_list_from_env() {
        let config =
            DaemonConfig::from_sources(None, env(&[("DASHPANEL_WIDGETS", "clock,network")]))
                .unwrap();
        assert_eq!(config.widgets, vec!["clock", "network"]);
    }

    #[test]
    fn test_custom_widget_from_file() {
        let path = write_config(
            "custom",
            r#"
widgets = ["uptime"]

[[custom_widgets]]
name = "uptime"
title = "Uptime"

[custom_widgets.polls.since]
fallback = "?"
interval_ms = 60000
script = "uptime -p"

[[custom_widgets.rows]]
kind = "field"
label = "Up:"
poll = "since"
"#,
        );

        let config = DaemonConfig::from_sources(Some(path.clone()), env(&[])).unwrap();
        std::fs::remove_file(path).ok();

        let widget = &config.custom_widgets[0];
        assert_eq!(widget.name, "uptime");
        assert_eq!(widget.polls["since"].interval_ms, 60000);
        assert_eq!(
            widget.rows[0],
            WidgetRow::Field {
                label: Some("Up:".to_string()),
                poll: "since".to_string(),
            }
        );
        assert!(widget.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = DaemonConfig::from_sources(None, env(&[("DASHPANEL_POLL_TIMEOUT_MS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("poll_timeout_ms"));
    }

    #[test]
    fn test_log_dir_is_tilde_expanded() {
        let config =
            DaemonConfig::from_sources(None, env(&[("DASHPANEL_LOG_DIR", "~/dashpanel-logs")]))
                .unwrap();
        let dir = config.log_dir.unwrap();
        assert!(!dir.starts_with('~'));
        assert!(dir.ends_with("dashpanel-logs"));
    }
}
