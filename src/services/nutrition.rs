use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;

use crate::models::NutritionSummary;

/// Nutrition-parsing upstream.
#[async_trait::async_trait]
pub trait NutritionSource: Send + Sync {
    /// Submits the ingredient lines and returns the raw response body.
    async fn parse_ingredients(&self, ingredients: &[String]) -> Result<String>;
}

/// Sums calories, protein, fat and carbs over a recipe's ingredients.
pub struct NutritionAggregator {
    source: Arc<dyn NutritionSource>,
}

impl NutritionAggregator {
    pub fn new(source: Arc<dyn NutritionSource>) -> Self {
        Self { source }
    }

    /// Fails only when the upstream call itself fails. Anything wrong with the
    /// returned body is logged and the totals gathered so far are returned.
    pub async fn aggregate(&self, ingredients: &[String]) -> Result<NutritionSummary> {
        let body = self.source.parse_ingredients(ingredients).await?;

        let mut total = NutritionSummary::default();
        if let Err(e) = accumulate(&body, &mut total) {
            log::error!("❌ Nutrition API error: {:#}", e);
            log::error!("📦 Raw response: {}", body);
        }

        Ok(total.rounded())
    }
}

fn accumulate(body: &str, total: &mut NutritionSummary) -> Result<()> {
    let data: Value = serde_json::from_str(body)?;
    let items = data.as_array().context("expected an array of ingredients")?;

    for item in items {
        let item = item.as_object().context("ingredient entry is not an object")?;

        let Some(nutrition) = item.get("nutrition") else {
            let original = item
                .get("original")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            log::warn!("⚠️ No nutrition data for ingredient: {}", original);
            continue;
        };

        let nutrients = nutrition
            .get("nutrients")
            .and_then(Value::as_array)
            .context("nutrition has no nutrients list")?;

        for nutrient in nutrients {
            let name = nutrient
                .get("name")
                .and_then(Value::as_str)
                .context("nutrient without a name")?
                .to_lowercase();

            let slot = match name.as_str() {
                "calories" => &mut total.calories,
                "protein" => &mut total.protein,
                "fat" => &mut total.fat,
                "carbs" => &mut total.carbs,
                _ => continue,
            };

            *slot += nutrient
                .get("amount")
                .and_then(Value::as_f64)
                .with_context(|| format!("nutrient '{}' without a numeric amount", name))?;
        }
    }

    Ok(())
}
