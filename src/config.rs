//! Runtime settings, each overridable from the environment.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub model_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:reports.db?mode=rwc".to_string()),
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "luad_tme_pipeline.json".to_string())
                .into(),
        }
    }
}
