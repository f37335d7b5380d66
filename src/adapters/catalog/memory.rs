use crate::{
    domain::{Cocktail, Ingredient, Unit},
    ports::catalog::{CatalogPort, Error},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

#[derive(Debug, Default)]
struct Entries {
    cocktails: HashMap<i64, Cocktail>,
    ingredients: HashMap<i64, Ingredient>,
    units: HashMap<i64, Unit>,
}

/// In-memory catalog of cocktails, ingredients and units
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    entries: Arc<Mutex<Entries>>,
}

impl MemoryCatalog {
    pub fn insert_cocktail(&self, cocktail: Cocktail) -> Result<(), Error> {
        self.entries.lock()?.cocktails.insert(cocktail.id, cocktail);
        Ok(())
    }

    pub fn insert_ingredient(&self, ingredient: Ingredient) -> Result<(), Error> {
        self.entries
            .lock()?
            .ingredients
            .insert(ingredient.id, ingredient);
        Ok(())
    }

    pub fn insert_unit(&self, unit: Unit) -> Result<(), Error> {
        self.entries.lock()?.units.insert(unit.id, unit);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogPort for MemoryCatalog {
    async fn get_cocktail(&self, cocktail_id: i64) -> Result<Cocktail, Error> {
        self.entries
            .lock()?
            .cocktails
            .get(&cocktail_id)
            .cloned()
            .ok_or(Error::CocktailDoesNotExist(cocktail_id))
    }

    async fn get_ingredient(&self, ingredient_id: i64) -> Result<Ingredient, Error> {
        self.entries
            .lock()?
            .ingredients
            .get(&ingredient_id)
            .cloned()
            .ok_or(Error::IngredientDoesNotExist(ingredient_id))
    }

    async fn get_unit(&self, unit_id: i64) -> Result<Unit, Error> {
        self.entries
            .lock()?
            .units
            .get(&unit_id)
            .cloned()
            .ok_or(Error::UnitDoesNotExist(unit_id))
    }
}
