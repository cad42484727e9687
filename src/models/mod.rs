use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Uniform `{ "error": "..." }` body used for top-level and per-recipe failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
}

impl ErrorRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl From<anyhow::Error> for ErrorRecord {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the whole context chain on one line
        Self::new(format!("{:#}", err))
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Either the success payload or an ErrorRecord, serialised without a tag.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Ok(T),
    Err(ErrorRecord),
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiResponse::Ok(_))
    }
}

impl<T> From<Result<T, ErrorRecord>> for ApiResponse<T> {
    fn from(result: Result<T, ErrorRecord>) -> Self {
        match result {
            Ok(value) => ApiResponse::Ok(value),
            Err(err) => ApiResponse::Err(err),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionSummary {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl NutritionSummary {
    /// Rounds every total to 2 decimal places.
    pub fn rounded(self) -> Self {
        fn round2(v: f64) -> f64 {
            (v * 100.0).round() / 100.0
        }

        Self {
            calories: round2(self.calories),
            protein: round2(self.protein),
            fat: round2(self.fat),
            carbs: round2(self.carbs),
        }
    }
}

/// What ends up in `recipe.nutrition` once orchestration is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nutrition {
    Summary(NutritionSummary),
    Error(ErrorRecord),
}

impl From<Result<NutritionSummary, ErrorRecord>> for Nutrition {
    fn from(result: Result<NutritionSummary, ErrorRecord>) -> Self {
        match result {
            Ok(summary) => Nutrition::Summary(summary),
            Err(err) => Nutrition::Error(err),
        }
    }
}

/// One generated recipe. The named fields accept whatever value shape the
/// model produced and coerce it, so only malformed JSON fails to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub steps: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub tips: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub estimated_time: String,
    #[serde(
        default,
        deserialize_with = "lenient_nutrition",
        skip_serializing_if = "Option::is_none"
    )]
    pub nutrition: Option<Nutrition>,
    /// Anything else the model put in the object, passed through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// Keys read, in order, when an ingredient comes back as an object.
const INGREDIENT_KEYS: [&str; 7] = ["quantity", "amount", "unit", "name", "ingredient", "item", "notes"];

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Object(map) => {
            let parts: Vec<String> = INGREDIENT_KEYS
                .iter()
                .filter_map(|key| match map.get(*key) {
                    Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                })
                .collect();

            if parts.is_empty() {
                Value::Object(map).to_string()
            } else {
                parts.join(" ")
            }
        }
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(value_to_string)
            .collect(),
        single => vec![value_to_string(single)],
    })
}

/// Anything in `nutrition` that is not a summary or error record is dropped;
/// orchestration overwrites the field anyway.
fn lenient_nutrition<'de, D>(deserializer: D) -> Result<Option<Nutrition>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).ok())
}

/// Body of `POST /generate-recipe`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientRequest {
    pub ingredients: String,
}

/// Success body of `POST /generate-recipe`.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub input: String,
    pub recipes: Vec<Recipe>,
}

/// Splits a comma-separated ingredient string, trimming and dropping blanks.
pub fn split_ingredients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
