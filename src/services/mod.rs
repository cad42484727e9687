pub mod ai_service;
pub mod cohere; // Cohere chat (text + vision)
pub mod ingredient_detector;
pub mod json_extract;
pub mod nutrition;
pub mod recipe_generator;
pub mod spoonacular; // Spoonacular ingredient parsing
pub mod uploads;

#[cfg(test)]
pub mod testing;

pub use cohere::CohereService;
pub use ingredient_detector::IngredientDetector;
pub use nutrition::NutritionAggregator;
pub use recipe_generator::RecipeGenerator;
pub use spoonacular::SpoonacularClient;
pub use uploads::UploadStore;
