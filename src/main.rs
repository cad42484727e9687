mod config;
mod handlers;
mod models;
mod server;
mod services;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::RecipeHandler;
use server::{create_router, AppState};
use services::{
    CohereService, IngredientDetector, NutritionAggregator, RecipeGenerator, SpoonacularClient,
    UploadStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting SmartChef AI backend...");

    let config = Config::from_env()?;

    if config.cohere_api_key.is_none() {
        log::warn!("⚠️ COHERE_API_KEY not set, recipe generation and detection will return errors");
    }
    if config.spoonacular_api_key.is_none() {
        log::warn!("⚠️ SPOONACULAR_API_KEY not set, nutrition lookups will return errors");
    }

    let cohere = Arc::new(CohereService::new(
        config.cohere_api_key.clone(),
        config.chat_model.clone(),
        config.vision_model.clone(),
        config.upstream_timeout,
    )?);
    log::info!(
        "✅ Cohere service initialized (chat: {}, vision: {})",
        config.chat_model,
        config.vision_model
    );

    let spoonacular = Arc::new(SpoonacularClient::new(
        config.spoonacular_api_key.clone(),
        config.upstream_timeout,
    )?);
    log::info!("✅ Spoonacular client initialized");

    let uploads = Arc::new(UploadStore::new(&config.upload_dir)?);
    log::info!("📁 Upload directory: {}", uploads.dir().display());

    let recipe_handler = Arc::new(RecipeHandler::new(
        RecipeGenerator::new(cohere.clone()),
        IngredientDetector::new(cohere),
        NutritionAggregator::new(spoonacular),
        uploads,
    ));
    log::info!("✅ Recipe handler initialized");

    let state = Arc::new(AppState {
        recipe_handler,
        frontend_dir: config.frontend_dir.clone(),
    });
    let app = create_router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("🌐 Server listening on {}", config.bind_addr);
    log::info!("🖥️ Serving frontend from {}", config.frontend_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("🛑 Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("🛑 Shutting down...");
}
