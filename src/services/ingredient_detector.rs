use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use std::path::Path;
use std::sync::Arc;

use super::ai_service::VisionModel;
use crate::models::split_ingredients;

const DETECTION_PROMPT: &str = "Return ONLY the ingredient names as a comma-separated list. \
     No headings, no sentences, no numbering, no extra words. \
     Example: cilantro, garlic, lime, ginger";

pub struct IngredientDetector {
    vision: Arc<dyn VisionModel>,
}

impl IngredientDetector {
    pub fn new(vision: Arc<dyn VisionModel>) -> Self {
        Self { vision }
    }

    pub async fn detect_file(&self, image_path: &Path) -> Result<Vec<String>> {
        log::debug!("📸 Starting ingredient detection for: {}", image_path.display());

        let image_data = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("Failed to read upload {}", image_path.display()))?;

        self.detect(&image_data).await
    }

    /// Lists the ingredients visible in an image, lowercased.
    ///
    /// The image is always sent as JPEG. A response without any text segment is
    /// an error.
    pub async fn detect(&self, image_data: &[u8]) -> Result<Vec<String>> {
        let base64_image = general_purpose::STANDARD.encode(image_data);
        log::debug!("📊 Image size: {} bytes", image_data.len());
        log::debug!("🔄 Base64 encoded size: {} bytes", base64_image.len());

        let data_url = format!("data:image/jpeg;base64,{}", base64_image);

        let raw_text = self
            .vision
            .describe(&data_url, DETECTION_PROMPT)
            .await?
            .context("Vision response contained no text")?;

        let raw_text = raw_text.trim();
        log::info!("💬 Raw vision response: {}", raw_text);

        let ingredients = normalize_detected(raw_text);
        log::info!("🥕 Final ingredients: {:?}", ingredients);

        Ok(ingredients)
    }
}

/// Keeps letters, commas and whitespace, lowercases, then splits on commas.
pub fn normalize_detected(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ',' || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    split_ingredients(&cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakeVision;

    #[test]
    fn test_normalize_detected() {
        assert_eq!(
            normalize_detected("Garlic, Onion123!, lime"),
            vec!["garlic", "onion", "lime"]
        );
    }

    #[test]
    fn test_normalize_drops_numbering_and_blanks() {
        assert_eq!(
            normalize_detected("1. Tomato,\n2. Red Pepper, 3., "),
            vec!["tomato", "red pepper"]
        );
        assert!(normalize_detected("42!").is_empty());
    }

    #[tokio::test]
    async fn test_detect_sends_jpeg_data_url() {
        let vision = Arc::new(FakeVision::replying("Cilantro, GARLIC"));
        let detector = IngredientDetector::new(vision.clone());

        let ingredients = detector.detect(b"\x89PNG fake").await.unwrap();
        assert_eq!(ingredients, vec!["cilantro", "garlic"]);

        let (url, prompt) = vision.last_request().unwrap();
        let expected = format!(
            "data:image/jpeg;base64,{}",
            general_purpose::STANDARD.encode(b"\x89PNG fake")
        );
        assert_eq!(url, expected);
        assert!(prompt.starts_with("Return ONLY the ingredient names"));
    }

    #[tokio::test]
    async fn test_missing_text_is_error() {
        let detector = IngredientDetector::new(Arc::new(FakeVision::empty()));
        let err = detector.detect(b"img").await.unwrap_err();
        assert!(err.to_string().contains("no text"));
    }
}
