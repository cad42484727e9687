//! In-process stand-ins for the upstream services.

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::ai_service::{RecipeModel, VisionModel};
use super::nutrition::NutritionSource;

enum Reply {
    Text(String),
    Empty,
    Fail(String),
}

impl Reply {
    fn to_result(&self) -> Result<Option<String>> {
        match self {
            Reply::Text(text) => Ok(Some(text.clone())),
            Reply::Empty => Ok(None),
            Reply::Fail(msg) => Err(anyhow::anyhow!(msg.clone())),
        }
    }
}

pub struct FakeRecipeModel {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl FakeRecipeModel {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(Reply::Text(text.into()))
    }

    pub fn empty() -> Self {
        Self::new(Reply::Empty)
    }

    pub fn failing(msg: &str) -> Self {
        Self::new(Reply::Fail(msg.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl RecipeModel for FakeRecipeModel {
    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.to_result()
    }
}

pub struct FakeVision {
    reply: Reply,
    requests: Mutex<Vec<(String, String)>>,
}

impl FakeVision {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn empty() -> Self {
        Self::new(Reply::Empty)
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<(String, String)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl VisionModel for FakeVision {
    async fn describe(&self, image_data_url: &str, prompt: &str) -> Result<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .push((image_data_url.to_string(), prompt.to_string()));
        self.reply.to_result()
    }
}

/// Returns a fixed body, or fails for ingredient lists containing `fail_on`.
pub struct FakeNutrition {
    body: Result<String, String>,
    fail_on: Option<String>,
    calls: AtomicUsize,
}

impl FakeNutrition {
    pub fn with_body(body: String) -> Self {
        Self {
            body: Ok(body),
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            body: Err(msg.to_string()),
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, ingredient: &str) -> Self {
        self.fail_on = Some(ingredient.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl NutritionSource for FakeNutrition {
    async fn parse_ingredients(&self, ingredients: &[String]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(marker) = &self.fail_on {
            if ingredients.iter().any(|i| i == marker) {
                anyhow::bail!("nutrition lookup failed for {}", marker);
            }
        }

        self.body.clone().map_err(|msg| anyhow::anyhow!(msg))
    }
}
