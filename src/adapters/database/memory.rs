use crate::{
    domain::{
        CustomIngredient, CustomRecipe, CustomRecipePatch, NewCustomIngredient, NewCustomRecipe,
        Page, PageRequest,
    },
    ports::database::{DatabasePort, Error, Transaction},
};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Rows held by the store, in insertion order
#[derive(Clone, Debug, Default)]
struct Tables {
    customs: Vec<CustomRecipe>,
    ingredients: Vec<CustomIngredient>,
}

/// In-memory custom recipe store
///
/// A transaction holds the writer lock until its handle is completed or dropped, so writers
/// queue behind each other. The tables are snapshotted on `begin` and restored if the handle is
/// dropped or rolled back. Reads never wait for the writer lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl MemoryDatabase {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, Error> {
        Ok(self.tables.lock()?)
    }
}

#[async_trait::async_trait]
impl DatabasePort for MemoryDatabase {
    async fn begin(&self) -> Result<Transaction, Error> {
        let writer = self.writer.clone().lock_owned().await;
        let snapshot = self.tables()?.clone();
        let tables = self.tables.clone();
        Ok(Transaction::new(move || {
            *tables.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
            drop(writer);
        }))
    }

    async fn commit(&self, transaction: Transaction) -> Result<(), Error> {
        transaction.complete();
        Ok(())
    }

    async fn rollback(&self, transaction: Transaction) -> Result<(), Error> {
        transaction.abort();
        Ok(())
    }

    async fn save_custom(&self, custom: NewCustomRecipe) -> Result<Uuid, Error> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.tables()?.customs.push(CustomRecipe {
            id,
            member_id: custom.member_id,
            cocktail_id: custom.cocktail_id,
            name: custom.name,
            comment: custom.comment,
            recipe: custom.recipe,
            summary: custom.summary,
            open: custom.open,
            image: custom.image,
            created_at: now,
            modified_at: now,
        });
        Ok(id)
    }

    async fn find_custom_by_id(&self, custom_id: Uuid) -> Result<Option<CustomRecipe>, Error> {
        Ok(self
            .tables()?
            .customs
            .iter()
            .find(|custom| custom.id == custom_id)
            .cloned())
    }

    async fn modify_custom(&self, custom_id: Uuid, patch: CustomRecipePatch) -> Result<(), Error> {
        let mut tables = self.tables()?;
        let custom = tables
            .customs
            .iter_mut()
            .find(|custom| custom.id == custom_id)
            .ok_or(Error::CustomDoesNotExist(custom_id))?;

        custom.name = patch.name;
        custom.summary = patch.summary;
        custom.comment = patch.comment;
        custom.recipe = patch.recipe;
        custom.image = patch.image;
        custom.open = patch.open;
        custom.modified_at = Utc::now();
        Ok(())
    }

    async fn delete_custom_by_id(&self, custom_id: Uuid) -> Result<(), Error> {
        let mut tables = self.tables()?;
        let customs = &mut tables.customs;
        let before = customs.len();
        customs.retain(|custom| custom.id != custom_id);
        if customs.len() == before {
            return Err(Error::CustomDoesNotExist(custom_id));
        }
        Ok(())
    }

    async fn find_all_custom(
        &self,
        viewer: Uuid,
        cocktail_id: i64,
        page: PageRequest,
    ) -> Result<Page<CustomRecipe>, Error> {
        let tables = self.tables()?;
        let visible: Vec<&CustomRecipe> = tables
            .customs
            .iter()
            .filter(|custom| custom.cocktail_id == cocktail_id && custom.is_visible_to(viewer))
            .collect();

        let content = visible
            .iter()
            .skip(page.offset())
            .take(page.size as usize)
            .map(|custom| (*custom).clone())
            .collect();

        Ok(Page {
            content,
            request: page,
            total_elements: visible.len() as u64,
        })
    }

    async fn find_all_custom_ids(&self) -> Result<Vec<Uuid>, Error> {
        Ok(self
            .tables()?
            .customs
            .iter()
            .map(|custom| custom.id)
            .collect())
    }

    async fn save_custom_ingredient(
        &self,
        ingredient: NewCustomIngredient,
    ) -> Result<Uuid, Error> {
        let mut tables = self.tables()?;
        // Ingredient lines always hang off an existing recipe
        if !tables
            .customs
            .iter()
            .any(|custom| custom.id == ingredient.custom_id)
        {
            return Err(Error::CustomDoesNotExist(ingredient.custom_id));
        }

        let id = Uuid::new_v4();
        tables.ingredients.push(CustomIngredient {
            id,
            custom_id: ingredient.custom_id,
            ingredient_id: ingredient.ingredient_id,
            unit_id: ingredient.unit_id,
            amount: ingredient.amount,
        });
        Ok(id)
    }

    async fn find_custom_ingredients(
        &self,
        custom_id: Uuid,
    ) -> Result<Vec<CustomIngredient>, Error> {
        Ok(self
            .tables()?
            .ingredients
            .iter()
            .filter(|ingredient| ingredient.custom_id == custom_id)
            .cloned()
            .collect())
    }

    async fn delete_custom_ingredients(&self, custom_id: Uuid) -> Result<u64, Error> {
        let mut tables = self.tables()?;
        let ingredients = &mut tables.ingredients;
        let before = ingredients.len();
        ingredients.retain(|ingredient| ingredient.custom_id != custom_id);
        Ok((before - ingredients.len()) as u64)
    }
}
