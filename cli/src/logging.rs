// ethcompat/cli/src/logging.rs
//
// Logging setup for the ethcompat binary. Logs go to stderr so stdout stays
// machine-readable.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format for log aggregation
    Json,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level
    pub level: LogLevel,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Enable ANSI colors (for terminal output)
    pub ansi_colors: bool,
    /// Module-specific log levels
    pub module_levels: Vec<(String, LogLevel)>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            ansi_colors: true,
            module_levels: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Apply environment overrides
    ///
    /// - LOG_FORMAT: Output format (json, pretty, compact)
    /// - LOG_ANSI: Enable ANSI colors (true/false)
    pub fn with_env(mut self) -> Self {
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.format = LogFormat::parse(&format);
        }
        if let Ok(ansi) = std::env::var("LOG_ANSI") {
            self.ansi_colors = ansi.to_lowercase() == "true";
        }
        self
    }

    /// Build the env filter string
    fn build_filter(&self) -> String {
        let mut filter = self.level.as_str().to_string();

        for (module, level) in &self.module_levels {
            filter.push_str(&format!(",{}={}", module, level.as_str()));
        }

        filter
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    // RUST_LOG wins over the configured levels
    let filter = match std::env::var("RUST_LOG") {
        Ok(rust_log) => EnvFilter::new(rust_log),
        Err(_) => EnvFilter::new(config.build_filter()),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => registry.with(layer.json().with_ansi(false)).try_init(),
        LogFormat::Pretty => registry
            .with(layer.pretty().with_ansi(config.ansi_colors))
            .try_init(),
        LogFormat::Compact => registry
            .with(layer.compact().with_ansi(config.ansi_colors))
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))
}
