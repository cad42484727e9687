use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::handlers::RecipeHandler;
use crate::models::{ErrorRecord, IngredientRequest};

/// Multipart field carrying the uploaded photo.
const UPLOAD_FIELD: &str = "file";

pub struct AppState {
    pub recipe_handler: Arc<RecipeHandler>,
    pub frontend_dir: PathBuf,
}

pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let assets = ServeDir::new(state.frontend_dir.join("assets"));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/generate-recipe", post(generate_recipe))
        .route(
            "/detect-ingredients",
            post(detect_ingredients).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .nest_service("/static", assets)
        .fallback(get(serve_frontend))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorRecord::new(message))).into_response()
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "SmartChef AI backend is live!" }))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn generate_recipe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IngredientRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            log::error!("❌ Invalid recipe request: {}", rejection.body_text());
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let response = state.recipe_handler.generate_from_text(&request.ingredients).await;
    if response.is_ok() {
        log::info!("✅ Recipes generated");
    }

    Json(response).into_response()
}

async fn detect_ingredients(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                log::error!("❌ Multipart parsing error: {}", e);
                return error_response(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("Failed to read multipart field: {}", e),
                );
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((filename, bytes.to_vec())),
            Err(e) => {
                log::error!("❌ Failed to read upload bytes: {}", e);
                return error_response(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("Failed to read uploaded file: {}", e),
                );
            }
        }
    }

    let Some((filename, bytes)) = upload else {
        log::warn!("⚠️ Upload request without a '{}' field", UPLOAD_FIELD);
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Missing '{}' upload", UPLOAD_FIELD),
        );
    };

    log::info!("📸 Image upload received: '{}' ({} bytes)", filename, bytes.len());

    let response = state.recipe_handler.generate_from_image(&filename, &bytes).await;
    if response.is_ok() {
        log::info!("✅ Recipes generated from image");
    }

    Json(response).into_response()
}

/// Serves the bundled frontend's entry document for any other path.
async fn serve_frontend(State(state): State<Arc<AppState>>) -> Response {
    let index_path = state.frontend_dir.join("index.html");

    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => axum::response::Html(html).into_response(),
        Err(e) => {
            log::debug!("index.html not available at {}: {}", index_path.display(), e);
            Json(ErrorRecord::new("index.html not found")).into_response()
        }
    }
}
