use clap::{Args, ValueEnum};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Settings for the language-model delimiter detector
#[derive(Args, Debug, Clone)]
pub struct LlmConfig {
    /// API key for the model endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used to locate delimiter pages
    #[arg(long, env = "PDFSPLIT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the generateContent API
    #[arg(long, env = "PDFSPLIT_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Request timeout in seconds
    #[arg(long, env = "PDFSPLIT_TIMEOUT_SECS", default_value = "120")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 120,
        }
    }
}

/// How delimiter pages are found
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetectorKind {
    /// Ask the language model
    #[default]
    Llm,
    /// Match the regex against each page's extracted text
    Text,
}
