//! CKD Screening Service - Main Entry Point
//!
//! Loads the pre-trained classifier and feature manifest once at startup,
//! then serves the screening form and prediction endpoints over HTTP.

use anyhow::{Context, Result};
use ckd_screening::{
    config::AppConfig,
    metrics::{MetricsReporter, ScreeningMetrics},
    model::{inference::InferenceEngine, manifest::FeatureManifest},
    row_builder::RowBuilder,
    server::{self, AppState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ckd_screening=info".parse()?),
        )
        .init();

    info!("Starting CKD Screening Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(ScreeningMetrics::new());

    // Load the feature manifest; the model is sequence-sensitive, so the
    // manifest alone defines the input column order
    let manifest = FeatureManifest::load(&config.model.manifest_path)?;
    let builder = RowBuilder::new(manifest);
    info!(
        "Inference request builder initialized ({} features)",
        builder.feature_count()
    );

    // Load the classifier; missing artifacts are fatal
    let engine = InferenceEngine::new(&config)?;
    info!("Inference engine initialized");

    // Start metrics reporter (prints summary every 60 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 60);
        reporter.start().await;
    });

    let state = Arc::new(AppState {
        engine,
        builder,
        metrics,
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind server address")?;

    info!("Screening form available at http://{}", addr);
    axum::serve(listener, server::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
