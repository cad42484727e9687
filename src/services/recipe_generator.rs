use std::sync::Arc;

use super::ai_service::RecipeModel;
use super::json_extract::extract_json;
use crate::models::{split_ingredients, ErrorRecord, Recipe};

/// Number of recipes requested per call.
pub const RECIPE_COUNT: usize = 4;

pub struct RecipeGenerator {
    model: Arc<dyn RecipeModel>,
}

impl RecipeGenerator {
    pub fn new(model: Arc<dyn RecipeModel>) -> Self {
        Self { model }
    }

    /// Asks the model for recipes built from a comma-separated ingredient list.
    ///
    /// Upstream failures, empty responses and unparseable output all come back
    /// as an `ErrorRecord`. The returned recipes have no `nutrition` yet.
    pub async fn generate(&self, ingredients: &str) -> Result<Vec<Recipe>, ErrorRecord> {
        let prompt = build_prompt(&split_ingredients(ingredients));

        let raw_text = match self.model.complete(&prompt).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                log::error!("❌ Recipe model returned no text");
                return Err(ErrorRecord::new("Empty response"));
            }
            Err(e) => {
                log::error!("❌ Error fetching recipes: {:#}", e);
                return Err(e.into());
            }
        };

        let raw_text = raw_text.trim();
        log::info!("🧾 Raw recipe response: {}", raw_text);

        serde_json::from_str::<Vec<Recipe>>(extract_json(raw_text)).map_err(|e| {
            log::error!("❌ Error parsing recipes: {}", e);
            ErrorRecord::new(e.to_string())
        })
    }
}

fn build_prompt(ingredients: &[String]) -> String {
    format!(
        "From the following ingredients: {ingredients}\n\
         \n\
         Generate exactly {count} structured recipes.\n\
         \n\
         Each recipe should include:\n\
         - title: string\n\
         - ingredients: list of strings (with quantities)\n\
         - steps: list of strings (numbered)\n\
         - tips: list of 2-3 short strings\n\
         - estimated_time: string\n\
         \n\
         Respond only with a valid JSON array of {count} recipe objects. \
         Do not include markdown, explanations, or extra text.",
        ingredients = ingredients.join(", "),
        count = RECIPE_COUNT,
    )
}
