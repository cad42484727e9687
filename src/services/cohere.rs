use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ai_service::{RecipeModel, VisionModel};

const CHAT_V1_URL: &str = "https://api.cohere.ai/v1/chat";
const CHAT_V2_URL: &str = "https://api.cohere.com/v2/chat";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1500;

// v1 chat: single message in, `text` out

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    model: &'a str,
    chat_history: Vec<serde_json::Value>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    text: Option<String>,
}

impl ChatResponse {
    /// Whitespace-only text counts as no text.
    fn into_text(self) -> Option<String> {
        self.text.filter(|t| !t.trim().is_empty())
    }
}

// v2 chat: structured messages with image parts

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct VisionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Cohere chat client covering both the text and the vision model.
pub struct CohereService {
    api_key: Option<String>,
    chat_model: String,
    vision_model: String,
    client: reqwest::Client,
}

impl CohereService {
    pub fn new(
        api_key: Option<String>,
        chat_model: String,
        vision_model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Cohere HTTP client")?;

        Ok(Self {
            api_key,
            chat_model,
            vision_model,
            client,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("COHERE_API_KEY is not configured")
    }

    async fn post<T: Serialize>(&self, url: &str, body: &T) -> Result<String> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.api_key()?)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Cohere response status: {}", status);

        let response_text = response.text().await?;
        if !status.is_success() {
            log::error!("❌ Cohere API error response: {}", response_text);
            anyhow::bail!("Cohere API error ({}): {}", status, response_text);
        }

        Ok(response_text)
    }
}

#[async_trait::async_trait]
impl RecipeModel for CohereService {
    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        let request = ChatRequest {
            message: prompt,
            model: &self.chat_model,
            chat_history: Vec::new(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        log::info!("🤖 Sending recipe request to Cohere with model: {}", self.chat_model);
        let body = self.post(CHAT_V1_URL, &request).await?;

        let response: ChatResponse = serde_json::from_str(&body)?;
        Ok(response.into_text())
    }
}

#[async_trait::async_trait]
impl VisionModel for CohereService {
    async fn describe(&self, image_data_url: &str, prompt: &str) -> Result<Option<String>> {
        let request = VisionRequest {
            model: &self.vision_model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::ImageUrl {
                        content_type: "image_url".to_string(),
                        image_url: ImageData {
                            url: image_data_url.to_string(),
                        },
                    },
                    ContentPart::Text {
                        content_type: "text".to_string(),
                        text: prompt.to_string(),
                    },
                ],
            }],
        };

        log::info!("🤖 Sending vision request to Cohere with model: {}", self.vision_model);
        log::debug!("📤 Request payload size: {} bytes", serde_json::to_string(&request)?.len());

        let body = self.post(CHAT_V2_URL, &request).await?;
        let response: VisionResponse = serde_json::from_str(&body)?;

        Ok(response
            .message
            .content
            .into_iter()
            .next()
            .and_then(|part| part.text))
    }
}
