use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use typegraph_reflect::ARRAY_INTERFACES;

static TRACING_INIT: Once = Once::new();

/// Tunables of a [`TypeFactory`](crate::TypeFactory).
///
/// The defaults describe the Java platform; a universe with a different
/// layout (renamed array interfaces, extra unchecked roots) can override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSystemConfig {
    /// Interfaces every array type implements, in lattice order.
    #[serde(default = "TypeSystemConfig::default_array_interfaces")]
    pub array_interfaces: Vec<String>,

    /// Exception roots left out of effective exception lists.
    #[serde(default = "TypeSystemConfig::default_unchecked_exceptions")]
    pub unchecked_exceptions: Vec<String>,

    /// Primitive name to wrapper class.
    #[serde(default = "TypeSystemConfig::default_primitive_wrappers")]
    pub primitive_wrappers: BTreeMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TypeSystemConfig {
    fn default_array_interfaces() -> Vec<String> {
        ARRAY_INTERFACES.iter().map(|name| name.to_string()).collect()
    }

    fn default_unchecked_exceptions() -> Vec<String> {
        vec![
            "java.lang.RuntimeException".to_owned(),
            "java.lang.Error".to_owned(),
        ]
    }

    fn default_primitive_wrappers() -> BTreeMap<String, String> {
        [
            ("boolean", "java.lang.Boolean"),
            ("byte", "java.lang.Byte"),
            ("char", "java.lang.Character"),
            ("double", "java.lang.Double"),
            ("float", "java.lang.Float"),
            ("int", "java.lang.Integer"),
            ("long", "java.lang.Long"),
            ("short", "java.lang.Short"),
            ("void", "java.lang.Void"),
        ]
        .into_iter()
        .map(|(primitive, wrapper)| (primitive.to_owned(), wrapper.to_owned()))
        .collect()
    }

    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

impl Default for TypeSystemConfig {
    fn default() -> Self {
        Self {
            array_interfaces: Self::default_array_interfaces(),
            unchecked_exceptions: Self::default_unchecked_exceptions(),
            primitive_wrappers: Self::default_primitive_wrappers(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Either a simple level (`info`, `debug`, ...) or a full `EnvFilter`
    /// directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Append logs to the given file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_owned()
    }

    /// The effective filter: the configured level, then `RUST_LOG` when set.
    pub fn env_filter(&self) -> EnvFilter {
        let env = std::env::var("RUST_LOG").ok();
        merged_filter(&level_directives(&self.level), env.as_deref())
    }
}

/// Accepts a bare level in any case (`Warning`, `none`) or full `EnvFilter`
/// directives, which pass through untouched.
fn level_directives(level: &str) -> String {
    let level = level.trim();
    match level.to_ascii_lowercase().as_str() {
        "" => LoggingConfig::default_level(),
        "warning" => "warn".to_owned(),
        "none" => "off".to_owned(),
        known @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => known.to_owned(),
        _ => level.to_owned(),
    }
}

/// Unparsable `RUST_LOG` is ignored; unparsable config falls back to `warn`.
fn merged_filter(config: &str, env: Option<&str>) -> EnvFilter {
    let env = env.map(str::trim).filter(|env| !env.is_empty());
    env.and_then(|env| EnvFilter::try_new(format!("{config},{env}")).ok())
        .or_else(|| EnvFilter::try_new(config).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            file: None,
        }
    }
}

/// Installs the global subscriber once per process; later calls are no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let file = config.file.as_ref().and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        let make_writer = match file {
            Some(file) => {
                let file = Arc::new(Mutex::new(file));
                BoxMakeWriter::new(move || SharedFile(file.clone()))
            }
            None => BoxMakeWriter::new(std::io::stderr),
        };

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(make_writer)
                        .with_ansi(false),
                )
                .try_init()
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(make_writer)
                        .with_ansi(false),
                )
                .try_init()
        };
        // Another subscriber may already be installed (tests, embedding hosts).
        let _ = result;
    });
}

struct SharedFile(Arc<Mutex<std::fs::File>>);

impl std::io::Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut file) => file.write(buf),
            Err(poisoned) => poisoned.into_inner().write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut file) => file.flush(),
            Err(poisoned) => poisoned.into_inner().flush(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}
