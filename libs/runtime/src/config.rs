use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use jsonapi_core::JsonApiConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use crate::paths::home_dir::resolve_home_dir;

/// Directory created under the user's home when `server.home_dir` is empty.
pub const DEFAULT_SUBDIR: &str = ".jsonapi-server";

/// Environment prefix; `APP__JSONAPI__MAX_PAGE_SIZE=50` sets `jsonapi.max_page_size`.
const ENV_PREFIX: &str = "APP__";

/// Process configuration for the JSON:API server.
///
/// `jsonapi` and `logging` stay `None` unless a file or the environment
/// provides them; use [`AppConfig::jsonapi_or_default`] to read the former.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub jsonapi: Option<JsonApiConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Absolute after loading. Relative log file paths resolve against it.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// Per-request timeout; 0 disables it.
    #[serde(default)]
    pub timeout_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8087,
            timeout_sec: 0,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .with_context(|| format!("Invalid bind address '{raw}'"))
    }
}

/// Subsystem name → logging section. `"default"` catches every target that
/// no other section claims.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String,
    pub file: String,
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/jsonapi-server.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            jsonapi: Some(JsonApiConfig::default()),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file, then `APP__*` environment variables.
    /// `server.home_dir` comes back absolute and exists on disk.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        // figment treats a missing file as an empty layer
        if !config_path.is_file() {
            bail!("Config file not found: {}", config_path.display());
        }

        let mut config: AppConfig = Self::figment(config_path)
            .extract()
            .with_context(|| format!("Failed to parse config file '{}'", config_path.display()))?;
        config.normalize_home_dir()?;
        Ok(config)
    }

    /// Like [`AppConfig::load_layered`], or plain defaults when no path is given.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        let Some(path) = config_path else {
            let mut config = Self::default();
            config.normalize_home_dir()?;
            return Ok(config);
        };
        Self::load_layered(path)
    }

    fn figment(config_path: &Path) -> Figment {
        let base = AppConfig {
            server: ServerConfig::default(),
            jsonapi: None,
            logging: None,
        };
        Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn normalize_home_dir(&mut self) -> Result<()> {
        let raw = self.server.home_dir.trim();
        let given = (!raw.is_empty()).then(|| raw.to_string());
        let resolved =
            resolve_home_dir(given, DEFAULT_SUBDIR, true).context("Failed to resolve server.home_dir")?;
        self.server.home_dir = resolved.to_string_lossy().to_string();
        Ok(())
    }

    pub fn jsonapi_or_default(&self) -> JsonApiConfig {
        self.jsonapi.clone().unwrap_or_default()
    }

    /// Checks that cannot be expressed in the serde schema.
    pub fn validate(&self) -> Result<()> {
        self.server.bind_addr()?;

        let jsonapi = self.jsonapi_or_default();
        if jsonapi.default_page_size == 0 {
            bail!("jsonapi.default_page_size must be greater than zero");
        }
        if jsonapi.default_page_size > jsonapi.max_page_size {
            bail!(
                "jsonapi.default_page_size ({}) exceeds jsonapi.max_page_size ({})",
                jsonapi.default_page_size,
                jsonapi.max_page_size
            );
        }
        if jsonapi.version.trim().is_empty() {
            bail!("jsonapi.version must not be empty");
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// `--port` replaces the configured port; each `-v` raises the default
    /// console level one step (debug, then trace).
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        let level = match args.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(section) = logging.get_mut("default") {
            section.console_level = level.to_string();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
}
