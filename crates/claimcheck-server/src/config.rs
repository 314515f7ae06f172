//! Deployment configuration, read once at startup from flags or the environment.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use claimcheck_ai::Device;
use serde::{Deserialize, Serialize};

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    /// Verbose error bodies and debug logging.
    Development,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Production => "info",
            Self::Development => "debug",
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "claimcheck", version, about = "Serve a fine-tuned claim classifier over HTTP")]
pub struct ServerConfig {
    /// Deployment mode.
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Environment::Production)]
    pub environment: Environment,

    /// Directory holding model.onnx, tokenizer.json and config.json.
    #[arg(long, env = "MODEL_PATH", default_value = "./finetuned_model")]
    pub model_path: PathBuf,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Tokens per encoded input; longer text is truncated.
    #[arg(
        long,
        env = "MAX_LENGTH",
        default_value_t = 128,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_length: u32,

    /// Compute device: auto, cpu or cuda.
    #[arg(long, env = "DEVICE", default_value = "auto")]
    pub device: Device,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "claimcheck",
            "--environment",
            "development",
            "--model-path",
            "/models/bert",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--max-length",
            "64",
            "--device",
            "cpu",
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.model_path, PathBuf::from("/models/bert"));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_length, 64);
        assert_eq!(config.device, Device::Cpu);
    }

    #[test]
    fn rejects_unknown_environment() {
        let result = ServerConfig::try_parse_from(["claimcheck", "--environment", "staging"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_max_length() {
        let result = ServerConfig::try_parse_from(["claimcheck", "--max-length", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_device() {
        let result = ServerConfig::try_parse_from(["claimcheck", "--device", "tpu"]);
        assert!(result.is_err());
    }

    #[test]
    fn environment_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Environment::Development).unwrap(),
            "\"development\""
        );
        assert_eq!(Environment::Production.default_log_filter(), "info");
    }
}
