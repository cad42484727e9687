use anyhow::Result;

/// Text completion used for recipe generation.
#[async_trait::async_trait]
pub trait RecipeModel: Send + Sync {
    /// Returns the model's text, or `None` when the response carried no text.
    async fn complete(&self, prompt: &str) -> Result<Option<String>>;
}

/// Vision-capable chat used for ingredient detection.
#[async_trait::async_trait]
pub trait VisionModel: Send + Sync {
    /// Sends one image (as a data URL) plus a prompt and returns the text of the
    /// first content segment, if any.
    async fn describe(&self, image_data_url: &str, prompt: &str) -> Result<Option<String>>;
}
