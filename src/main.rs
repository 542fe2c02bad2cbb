// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carbon-Tracker API Server
//!
//! Records activities with their CO2e emissions, serves weekly statistics
//! and generates reduction tips.

use carbon_tracker::{
    config::Config,
    db::{ActivityStore, FirestoreDb, InMemoryStore},
    services::{FactorProvider, GeminiTipsClient, StaticFactorProvider, TipsProvider, TipsService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Carbon-Tracker API");

    let store: Arc<dyn ActivityStore>;
    let factors: Arc<dyn FactorProvider>;
    if config.use_in_memory_store {
        tracing::warn!("Using in-memory activity store; data is lost on restart");
        store = Arc::new(InMemoryStore::new());
        factors = Arc::new(StaticFactorProvider::default());
    } else {
        let db = Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);
        store = db.clone();
        factors = db;
    }

    let provider: Option<Arc<dyn TipsProvider>> = match &config.ai_api_key {
        Some(key) => {
            tracing::info!(model = %config.ai_model, "AI tips enabled");
            Some(Arc::new(GeminiTipsClient::new(
                &config.ai_base_url,
                &config.ai_model,
                key.clone(),
            )))
        }
        None => {
            tracing::warn!("No AI API key configured; serving general tips only");
            None
        }
    };
    let tips_service = TipsService::new(provider, config.ai_timeout, config.tip_count);

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, factors, tips_service));

    // Build router
    let app = carbon_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carbon_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
