//! Inference provider configuration

use std::time::Duration;

use serde::Deserialize;

use crate::ports::text_generator::GenerationParams;

use super::error::ValidationError;

const MAX_RETRIES_LIMIT: u32 = 3;

/// Hugging Face Inference API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// API key (`PHYSIO_TRIAGE__INFERENCE__API_KEY`). Required.
    pub api_key: Option<String>,

    /// Base URL of the inference API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model repository id
    #[serde(default = "default_model")]
    pub model: String,

    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Additional attempts after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Token budget per response
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Repetition penalty
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the generation parameters used for every triage exchange.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
            ..GenerationParams::default()
        }
    }

    /// Validate inference configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(ValidationError::MissingRequired(
                "PHYSIO_TRIAGE__INFERENCE__API_KEY",
            ));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ValidationError::InvalidRetries {
                max: MAX_RETRIES_LIMIT,
                got: self.max_retries,
            });
        }
        Ok(())
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
        }
    }
}

fn default_api_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_model() -> String {
    "HuggingFaceH4/zephyr-7b-beta".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    1
}

fn default_max_new_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.95
}

fn default_repetition_penalty() -> f32 {
    1.2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key() -> InferenceConfig {
        InferenceConfig {
            api_key: Some("hf_test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_consultation_tuning() {
        let config = InferenceConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_retries, 1);
        let params = config.generation_params();
        assert_eq!(params.max_new_tokens, 150);
        assert_eq!(params.stop_sequences.len(), 3);
    }

    #[test]
    fn validation_requires_api_key() {
        assert!(matches!(
            InferenceConfig::default().validate(),
            Err(ValidationError::MissingRequired(_))
        ));
        assert!(with_key().validate().is_ok());
    }

    #[test]
    fn validation_rejects_blank_api_key() {
        let config = InferenceConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_bounds_retries() {
        let config = InferenceConfig {
            max_retries: 10,
            ..with_key()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidRetries { max: 3, got: 10 })
        );
    }
}
