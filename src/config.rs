use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_CHAT_PATH;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the chat backend
    #[arg(long, env = "CHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Write the final transcript as HTML to this file
    #[arg(long)]
    pub html_out: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub endpoint: EndpointConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointConfig {
    pub base_url: String,
    pub chat_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Default `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl AppConfig {
    /// Parse `args` and layer the configuration.
    ///
    /// Priority: CLI flag (or its env var) > `CHAT_WIDGET__*` env > config
    /// file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<(Self, Cli), config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        let config = Self::from_cli(&cli)?;
        Ok((config, cli))
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("endpoint.base_url", "http://127.0.0.1:3000")?
            .set_default("endpoint.chat_path", DEFAULT_CHAT_PATH)?
            .set_default("logging.format", LogFormat::Compact.as_str())?
            .set_default("logging.filter", "info,chat_widget=debug")?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(path.as_path()).required(true)),
            None => builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false)),
        };

        // E.g. CHAT_WIDGET__ENDPOINT__CHAT_PATH=/v2/chat
        builder = builder.add_source(
            Environment::with_prefix("CHAT_WIDGET")
                .prefix_separator("__")
                .separator("__"),
        );

        if let Some(base_url) = &cli.base_url {
            builder = builder.set_override("endpoint.base_url", base_url.as_str())?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("logging.format", format.as_str())?;
        }

        builder.build()?.try_deserialize()
    }
}
