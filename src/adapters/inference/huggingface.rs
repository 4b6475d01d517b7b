//! Hugging Face Inference API text generator.
//!
//! Speaks the hosted inference protocol: `POST {base}/models/{model}`
//! with `{ "inputs": ..., "parameters": ... }`, answered by
//! `[ { "generated_text": ... } ]`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::text_generator::{
    GenerationError, GenerationRequest, ProviderInfo, TextGenerator,
};

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_MODEL: &str = "HuggingFaceH4/zephyr-7b-beta";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the Hugging Face generator.
#[derive(Clone)]
pub struct HuggingFaceConfig {
    api_key: Secret<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl HuggingFaceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
}

#[derive(Serialize)]
struct InferenceParameters<'a> {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    do_sample: bool,
    return_full_text: bool,
    repetition_penalty: f32,
    stop: &'a [String],
}

#[derive(Deserialize)]
struct InferenceResponse {
    generated_text: String,
}

/// Text generator backed by the Hugging Face Inference API.
pub struct HuggingFaceGenerator {
    config: HuggingFaceConfig,
    client: Client,
}

impl HuggingFaceGenerator {
    pub fn new(config: HuggingFaceConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    // Server-side `stop` handling varies per model backend, so the stop
    // sequences are enforced here as well.
    fn truncate_at_stop(text: &str, stop_sequences: &[String]) -> String {
        let cut = stop_sequences
            .iter()
            .filter_map(|stop| text.find(stop.as_str()))
            .min()
            .unwrap_or(text.len());
        text[..cut].to_string()
    }

    fn map_status(status: StatusCode, body: String) -> GenerationError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                GenerationError::AuthenticationFailed
            }
            StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited {
                retry_after_secs: 30,
            },
            _ => GenerationError::upstream(status.as_u16(), body),
        }
    }

    fn map_transport(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else {
            GenerationError::network(err.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let payload = InferenceRequest {
            inputs: &request.prompt,
            parameters: InferenceParameters {
                max_new_tokens: request.params.max_new_tokens,
                temperature: request.params.temperature,
                top_p: request.params.top_p,
                do_sample: true,
                return_full_text: false,
                repetition_penalty: request.params.repetition_penalty,
                stop: &request.params.stop_sequences,
            },
        };

        debug!(model = %self.config.model, prompt_len = request.prompt.len(), "calling inference API");

        let response = self
            .client
            .post(self.model_url())
            .bearer_auth(self.config.api_key())
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, body));
        }

        let completions: Vec<InferenceResponse> = response
            .json()
            .await
            .map_err(|e| GenerationError::parse(e.to_string()))?;

        let text = completions
            .into_iter()
            .next()
            .map(|c| Self::truncate_at_stop(&c.generated_text, &request.params.stop_sequences))
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        Ok(text)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "huggingface".to_string(),
            model: self.config.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::text_generator::GenerationParams;

    fn generator() -> HuggingFaceGenerator {
        HuggingFaceGenerator::new(HuggingFaceConfig::new("test-key"))
    }

    mod configuration {
        use super::*;

        #[test]
        fn defaults_target_the_public_api() {
            let config = HuggingFaceConfig::new("k");
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.model, DEFAULT_MODEL);
            assert_eq!(config.timeout, Duration::from_secs(60));
        }

        #[test]
        fn model_url_joins_without_double_slash() {
            let config = HuggingFaceConfig::new("k")
                .with_base_url("http://localhost:9000/")
                .with_model("my/model");
            let gen = HuggingFaceGenerator::new(config);
            assert_eq!(gen.model_url(), "http://localhost:9000/models/my/model");
        }

        #[test]
        fn provider_info_names_the_model() {
            let info = generator().provider_info();
            assert_eq!(info.name, "huggingface");
            assert_eq!(info.model, DEFAULT_MODEL);
        }
    }

    mod payload {
        use super::*;

        #[test]
        fn serializes_inputs_and_parameters() {
            let params = GenerationParams::default();
            let payload = InferenceRequest {
                inputs: "hello",
                parameters: InferenceParameters {
                    max_new_tokens: params.max_new_tokens,
                    temperature: params.temperature,
                    top_p: params.top_p,
                    do_sample: true,
                    return_full_text: false,
                    repetition_penalty: params.repetition_penalty,
                    stop: &params.stop_sequences,
                },
            };
            let json = serde_json::to_value(&payload).unwrap();
            assert_eq!(json["inputs"], "hello");
            assert_eq!(json["parameters"]["max_new_tokens"], 150);
            assert_eq!(json["parameters"]["return_full_text"], false);
            assert_eq!(json["parameters"]["stop"][0], "Patient:");
        }
    }

    mod stop_sequences {
        use super::*;

        #[test]
        fn truncates_at_earliest_stop() {
            let stops = vec!["Patient:".to_string(), "\n\n".to_string()];
            let text = "Does it hurt at night?\n\nPatient: yes";
            assert_eq!(
                HuggingFaceGenerator::truncate_at_stop(text, &stops),
                "Does it hurt at night?"
            );
        }

        #[test]
        fn leaves_text_without_stops_alone() {
            let stops = vec!["Patient:".to_string()];
            assert_eq!(
                HuggingFaceGenerator::truncate_at_stop("all good", &stops),
                "all good"
            );
        }
    }

    mod error_mapping {
        use super::*;

        #[test]
        fn unauthorized_maps_to_authentication_failed() {
            let err = HuggingFaceGenerator::map_status(StatusCode::UNAUTHORIZED, String::new());
            assert_eq!(err, GenerationError::AuthenticationFailed);
        }

        #[test]
        fn too_many_requests_maps_to_rate_limited() {
            let err = HuggingFaceGenerator::map_status(StatusCode::TOO_MANY_REQUESTS, String::new());
            assert!(matches!(err, GenerationError::RateLimited { .. }));
        }

        #[test]
        fn server_errors_are_retryable_upstream_errors() {
            let err = HuggingFaceGenerator::map_status(
                StatusCode::SERVICE_UNAVAILABLE,
                "model loading".to_string(),
            );
            assert!(err.is_retryable());
            assert!(matches!(err, GenerationError::Upstream { status: 503, .. }));
        }
    }
}
