//! Service entry point: configuration, wiring, and the axum server.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use physio_triage::adapters::circuit_breaker::InMemoryCircuitBreaker;
use physio_triage::adapters::http::chat::{self, ChatAppState};
use physio_triage::adapters::inference::{
    HuggingFaceConfig, HuggingFaceGenerator, ResilientGenerator, RetryPolicy,
};
use physio_triage::adapters::storage::InMemorySessionStore;
use physio_triage::config::AppConfig;
use physio_triage::ports::circuit_breaker::CircuitBreakerConfig;
use physio_triage::ports::text_generator::TextGenerator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.server.log_level)?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_key = config
        .inference
        .api_key
        .clone()
        .ok_or("PHYSIO_TRIAGE__INFERENCE__API_KEY is required")?;

    let hf_config = HuggingFaceConfig::new(api_key)
        .with_base_url(config.inference.api_url.clone())
        .with_model(config.inference.model.clone())
        .with_timeout(config.inference.timeout());
    let upstream = Arc::new(HuggingFaceGenerator::new(hf_config));
    info!(
        provider = %upstream.provider_info().name,
        model = %upstream.provider_info().model,
        "inference backend configured"
    );

    let breaker = Arc::new(InMemoryCircuitBreaker::new(
        CircuitBreakerConfig::for_inference_provider(),
    ));
    let generator = Arc::new(
        ResilientGenerator::new(upstream, breaker).with_retry(RetryPolicy {
            max_retries: config.inference.max_retries,
            ..RetryPolicy::default()
        }),
    );

    let store = Arc::new(InMemorySessionStore::new());
    let app_state = ChatAppState::new(store, generator)
        .with_params(config.inference.generation_params());

    let app = chat::routes()
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "physio-triage listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn cors_layer(config: &AppConfig) -> Result<CorsLayer, Box<dyn Error>> {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let mut values = Vec::with_capacity(origins.len());
    for origin in origins {
        values.push(origin.parse::<HeaderValue>()?);
    }
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install shutdown handler");
    }
    info!("shutdown signal received");
}
