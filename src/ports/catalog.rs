use crate::domain::{Cocktail, Ingredient, Unit};

/// Read-only cocktail reference data
#[mockall::automock]
#[async_trait::async_trait]
pub trait CatalogPort {
    async fn get_cocktail(&self, cocktail_id: i64) -> Result<Cocktail, Error>;
    async fn get_ingredient(&self, ingredient_id: i64) -> Result<Ingredient, Error>;
    async fn get_unit(&self, unit_id: i64) -> Result<Unit, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cocktail {0} does not exist")]
    CocktailDoesNotExist(i64),
    #[error("ingredient {0} does not exist")]
    IngredientDoesNotExist(i64),
    #[error("unit {0} does not exist")]
    UnitDoesNotExist(i64),

    /// Concrete adapter errors
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
