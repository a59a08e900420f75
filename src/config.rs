use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "source-data.json";

/// Top-level configuration for the report binary. Command-line flags take
/// precedence over anything loaded here.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let input = env::var("UTILISATION_INPUT").unwrap_or_else(|_| DEFAULT_INPUT.to_string());
        let output_dir = env::var("UTILISATION_OUTPUT_DIR").unwrap_or_else(|_| ".".to_string());

        let preview_raw = env::var("UTILISATION_PREVIEW_ROWS").unwrap_or_else(|_| "10".to_string());
        let preview_rows = preview_raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidPreviewRows(preview_raw))?;

        let log_level = env::var("UTILISATION_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            input: PathBuf::from(input),
            output_dir: PathBuf::from(output_dir),
            preview_rows,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}
