use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MODEL_ID: &str = "nlptown/bert-base-multilingual-uncased-sentiment";

/// Tokio's own default ceiling for the blocking pool.
const DEFAULT_MAX_BLOCKING_THREADS: usize = 512;

#[derive(Debug, Clone)]
pub struct RatingConfig {
    pub common: core_config::Config,
    pub model: ModelConfig,
    pub runtime: RuntimeConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    /// BERT sequence classifier run with candle.
    Bert,
    /// Deterministic lexicon classifier, no weights required.
    Mock,
}

impl FromStr for ModelBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bert" => Ok(ModelBackend::Bert),
            "mock" => Ok(ModelBackend::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown MODEL_BACKEND '{}', expected 'bert' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub backend: ModelBackend,
    /// Hub repository id.
    pub model_id: String,
    pub revision: String,
    /// Local directory holding config.json, tokenizer and weights. Skips the hub.
    pub local_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub max_blocking_threads: usize,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl RatingConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        Ok(RatingConfig {
            common: common_config,
            model: ModelConfig {
                backend: get_env("MODEL_BACKEND", "bert").parse()?,
                model_id: get_env("MODEL_ID", DEFAULT_MODEL_ID),
                revision: get_env("MODEL_REVISION", "main"),
                local_path: get_optional_env("MODEL_PATH").map(PathBuf::from),
                cache_dir: get_optional_env("HF_CACHE_DIR").map(PathBuf::from),
            },
            runtime: RuntimeConfig {
                worker_threads: parse_env("RUNTIME_WORKER_THREADS", 4)?,
                max_blocking_threads: parse_env(
                    "RUNTIME_MAX_BLOCKING_THREADS",
                    DEFAULT_MAX_BLOCKING_THREADS,
                )?,
            },
            telemetry: TelemetryConfig {
                log_level: get_env("LOG_LEVEL", "info"),
                otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
            },
        })
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env(key: &str, default: usize) -> Result<usize, AppError> {
    match get_optional_env(key) {
        None => Ok(default),
        Some(raw) => parse_thread_count(key, &raw),
    }
}

fn parse_thread_count(key: &str, raw: &str) -> Result<usize, AppError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be a positive integer, got '{}'",
            key,
            raw
        ))),
    }
}
