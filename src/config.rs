use std::path::{Path, PathBuf};
use std::time::Duration;

use axum_extra::extract::cookie::Key;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::SecretError;

/// Minimum decoded length of a configured signing secret.
pub const MIN_SECRET_LEN: usize = 64;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Response shape of the sessions route
    #[arg(long, env = "SESSION_SHAPE", value_enum)]
    pub shape: Option<ResponseShape>,

    /// Increment `count` when it is the requested key
    #[arg(long, env = "SESSION_INCREMENT")]
    pub increment: Option<bool>,

    /// File holding the base64 cookie signing secret
    #[arg(long, env = "SESSION_SECRET_FILE")]
    pub secret_file: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub route: RouteConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Base64 signing secret. Prefer `secret_file` outside development.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub secret_file: Option<PathBuf>,
    pub secure_cookie: bool,
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

/// JSON layout produced by `GET /sessions/{key}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// Message naming the key plus every session field.
    Summary,
    /// Like `Summary` with different wording; does not count by default.
    Snapshot,
    /// The requested field alone, plus the request's cookies.
    Field,
}

impl ResponseShape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Snapshot => "snapshot",
            Self::Field => "field",
        }
    }

    /// Whether requesting `count` increments it when not configured explicitly.
    #[must_use]
    pub const fn increments_by_default(self) -> bool {
        !matches!(self, Self::Snapshot)
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RouteConfig {
    pub shape: ResponseShape,
    #[serde(default)]
    pub increment: Option<bool>,
}

impl RouteConfig {
    #[must_use]
    pub fn increments(&self) -> bool {
        self.increment
            .unwrap_or_else(|| self.shape.increments_by_default())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json_logs: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Layer defaults, config file, `SESSIONS_*` environment and CLI flags,
    /// lowest to highest priority.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 5555)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("session.cookie_name", "session")?
            .set_default("session.secure_cookie", false)?
            .set_default("session.idle_timeout_secs", 30 * 60)?
            .set_default("session.sweep_interval_secs", 60)?
            .set_default("route.shape", ResponseShape::Summary.as_str())?
            .set_default("telemetry.log_level", "info")?
            .set_default("telemetry.json_logs", false)?;

        // An explicit file must exist; ./config.* is picked up when present.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. SESSIONS_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("SESSIONS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Overrides outrank every source regardless of insertion order.
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(shape) = cli.shape {
            builder = builder.set_override("route.shape", shape.as_str())?;
        }
        if let Some(increment) = cli.increment {
            builder = builder.set_override("route.increment", increment)?;
        }
        if let Some(path) = cli.secret_file {
            builder = builder.set_override("session.secret_file", path)?;
        }
        if let Some(json) = cli.json_logs {
            builder = builder.set_override("telemetry.json_logs", json)?;
        }

        builder.build()?.try_deserialize()
    }
}

impl SessionConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        // A zero period would make the sweeper spin.
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Resolve the cookie signing key: `secret_file` first, then `secret`.
    ///
    /// Returns `Ok(None)` when neither is configured.
    pub fn signing_key(&self) -> Result<Option<Key>, SecretError> {
        if let Some(path) = &self.secret_file {
            return read_secret_file(path).map(Some);
        }
        self.secret.as_deref().map(decode_secret).transpose()
    }
}

fn read_secret_file(path: &Path) -> Result<Key, SecretError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SecretError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    decode_secret(&contents)
}

/// Decode a base64 secret into a signing key.
pub fn decode_secret(encoded: &str) -> Result<Key, SecretError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    if bytes.len() < MIN_SECRET_LEN {
        return Err(SecretError::TooShort {
            len: bytes.len(),
            min: MIN_SECRET_LEN,
        });
    }
    Ok(Key::from(bytes.as_slice()))
}
