use anyhow::Result;
use futures::future::{join_all, FutureExt};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::models::{ApiResponse, ErrorRecord, Nutrition, Recipe, RecipeResponse};
use crate::services::{IngredientDetector, NutritionAggregator, RecipeGenerator, UploadStore};

/// Runs the text and image flows: detect, generate, then attach nutrition.
pub struct RecipeHandler {
    generator: RecipeGenerator,
    detector: IngredientDetector,
    nutrition: NutritionAggregator,
    uploads: Arc<UploadStore>,
}

impl RecipeHandler {
    pub fn new(
        generator: RecipeGenerator,
        detector: IngredientDetector,
        nutrition: NutritionAggregator,
        uploads: Arc<UploadStore>,
    ) -> Self {
        Self {
            generator,
            detector,
            nutrition,
            uploads,
        }
    }

    /// Text flow. Returns `{input, recipes}` or an ErrorRecord.
    pub async fn generate_from_text(&self, ingredients: &str) -> ApiResponse<RecipeResponse> {
        guarded("Failed to generate recipe", self.text_flow(ingredients)).await
    }

    /// Image flow. Returns the bare recipe list or an ErrorRecord.
    pub async fn generate_from_image(&self, filename: &str, bytes: &[u8]) -> ApiResponse<Vec<Recipe>> {
        guarded("Failed to process image", self.image_flow(filename, bytes)).await
    }

    async fn text_flow(&self, ingredients: &str) -> Result<Result<RecipeResponse, ErrorRecord>> {
        let input = ingredients.trim();
        if input.is_empty() {
            return Ok(Err(ErrorRecord::new("Ingredients input cannot be empty.")));
        }

        log::info!("📨 Generating recipes for: '{}'", input);

        let recipes = match self.generator.generate(input).await {
            Ok(recipes) => recipes,
            Err(err) => return Ok(Err(err)),
        };

        Ok(Ok(RecipeResponse {
            input: input.to_string(),
            recipes: self.attach_nutrition(recipes).await,
        }))
    }

    async fn image_flow(&self, filename: &str, bytes: &[u8]) -> Result<Result<Vec<Recipe>, ErrorRecord>> {
        let image_path = self.uploads.save(filename, bytes).await?;

        let ingredients = self.detector.detect_file(&image_path).await?.join(", ");
        log::info!("📸 Detected ingredients: '{}'", ingredients);

        let recipes = match self.generator.generate(&ingredients).await {
            Ok(recipes) => recipes,
            Err(err) => return Ok(Err(err)),
        };

        Ok(Ok(self.attach_nutrition(recipes).await))
    }

    /// Looks up nutrition for every recipe concurrently. A failed lookup only
    /// affects its own recipe.
    async fn attach_nutrition(&self, mut recipes: Vec<Recipe>) -> Vec<Recipe> {
        // each lookup owns its ingredient list so the flow futures stay `Send`
        let lookups: Vec<_> = recipes
            .iter()
            .map(|recipe| recipe.ingredients.clone())
            .map(|ingredients| async move {
                AssertUnwindSafe(self.nutrition.aggregate(&ingredients))
                    .catch_unwind()
                    .map(|outcome| match outcome {
                        Ok(Ok(summary)) => Ok(summary),
                        Ok(Err(e)) => Err(ErrorRecord::from(e)),
                        Err(panic) => Err(ErrorRecord::new(panic_message(panic))),
                    })
                    .await
            })
            .collect();
        let results = join_all(lookups).await;

        for (recipe, result) in recipes.iter_mut().zip(results) {
            if let Err(err) = &result {
                log::error!("❌ Nutrition lookup failed for '{}': {}", recipe.title, err);
            }
            recipe.nutrition = Some(Nutrition::from(result));
        }

        recipes
    }
}

/// Outermost boundary of a flow: errors and panics become
/// `ErrorRecord{"<context>: <message>"}`.
async fn guarded<T, F>(context: &str, flow: F) -> ApiResponse<T>
where
    F: Future<Output = Result<Result<T, ErrorRecord>>>,
{
    let message = match AssertUnwindSafe(flow).catch_unwind().await {
        Ok(Ok(outcome)) => return outcome.into(),
        Ok(Err(e)) => format!("{:#}", e),
        Err(panic) => panic_message(panic),
    };

    log::error!("❌ {}: {}", context, message);
    ApiResponse::Err(ErrorRecord::new(format!("{}: {}", context, message)))
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}
