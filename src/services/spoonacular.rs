use anyhow::{Context, Result};
use std::time::Duration;

use super::nutrition::NutritionSource;

const BASE_URL: &str = "https://api.spoonacular.com";

/// Spoonacular `parseIngredients` client.
pub struct SpoonacularClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl SpoonacularClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Spoonacular HTTP client")?;

        Ok(Self {
            api_key,
            base_url: BASE_URL.to_string(),
            client,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

fn query_params(api_key: &str) -> [(&'static str, &str); 2] {
    [("apiKey", api_key), ("includeNutrition", "true")]
}

/// One ingredient per line, nutrition for a single serving.
fn form_fields(ingredients: &[String]) -> [(&'static str, String); 2] {
    [
        ("ingredientList", ingredients.join("\n")),
        ("servings", "1".to_string()),
    ]
}

#[async_trait::async_trait]
impl NutritionSource for SpoonacularClient {
    async fn parse_ingredients(&self, ingredients: &[String]) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("SPOONACULAR_API_KEY is not configured")?;

        log::debug!("🥗 Parsing {} ingredients with Spoonacular", ingredients.len());

        let response = self
            .client
            .post(format!("{}/recipes/parseIngredients", self.base_url))
            .query(&query_params(api_key))
            .form(&form_fields(ingredients))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            log::error!("❌ Spoonacular API error response: {}", response_text);
            anyhow::bail!("Spoonacular API error ({}): {}", status, response_text);
        }

        Ok(response_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Form, Query, State},
        http::StatusCode,
        routing::post,
        Router,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Option<(HashMap<String, String>, HashMap<String, String>)>>>;

    /// Local stand-in answering `parseIngredients` with a fixed status and body.
    async fn serve(status: StatusCode, body: &'static str) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(None));

        let app = Router::new()
            .route(
                "/recipes/parseIngredients",
                post(
                    move |State(captured): State<Captured>,
                          Query(query): Query<HashMap<String, String>>,
                          Form(form): Form<HashMap<String, String>>| async move {
                        *captured.lock().unwrap() = Some((query, form));
                        (status, body)
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    fn client(api_key: Option<&str>, base_url: String) -> SpoonacularClient {
        SpoonacularClient::new(api_key.map(str::to_string), Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[test]
    fn test_request_fields() {
        assert_eq!(
            query_params("secret"),
            [("apiKey", "secret"), ("includeNutrition", "true")]
        );

        let fields = form_fields(&["1 cup rice".to_string(), "2 eggs".to_string()]);
        assert_eq!(fields[0], ("ingredientList", "1 cup rice\n2 eggs".to_string()));
        assert_eq!(fields[1], ("servings", "1".to_string()));
    }

    #[tokio::test]
    async fn test_sends_query_and_form() {
        let (base_url, captured) = serve(StatusCode::OK, "[]").await;

        let body = client(Some("secret"), base_url)
            .parse_ingredients(&["1 cup rice".to_string(), "2 eggs".to_string()])
            .await
            .unwrap();
        assert_eq!(body, "[]");

        let (query, form) = captured.lock().unwrap().take().unwrap();
        assert_eq!(query["apiKey"], "secret");
        assert_eq!(query["includeNutrition"], "true");
        assert_eq!(form["ingredientList"], "1 cup rice\n2 eggs");
        assert_eq!(form["servings"], "1");
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let (base_url, _captured) =
            serve(StatusCode::PAYMENT_REQUIRED, r#"{"status":"failure"}"#).await;

        let err = client(Some("secret"), base_url)
            .parse_ingredients(&["salt".to_string()])
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("402"));
        assert!(message.contains("failure"));
    }

    #[tokio::test]
    async fn test_missing_key_is_an_error() {
        let err = client(None, "http://127.0.0.1:9".to_string())
            .parse_ingredients(&["salt".to_string()])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("SPOONACULAR_API_KEY"));
    }
}
