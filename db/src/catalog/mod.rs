pub mod comments;
pub mod filter;
pub mod ingredients;
pub mod recipe;
pub mod salad;
pub mod steps;
pub mod types;

pub use comments::Comment;
pub use filter::{AvailabilityFilter, Page, RecipeFilter, PAGE_SIZE};
pub use ingredients::{Ingredient, IngredientType, Measurement, RecipeIngredient};
pub use recipe::{Actor, NewRecipe, Recipe, RecipeStatus};
pub use salad::Salad;
pub use steps::{RecipeStep, StepEdit, StepSequencer};
pub use types::{SaladType, SaladTypeMembership};
