use std::fmt;

use uuid::Uuid;

use crate::domain::{
    CustomIngredient, CustomRecipe, CustomRecipePatch, NewCustomIngredient, NewCustomRecipe, Page,
    PageRequest,
};

/// Storage for custom recipes and their ingredient lines
///
/// The store never cascades on its own: removing a recipe's ingredients is always an explicit
/// call.
#[mockall::automock]
#[async_trait::async_trait]
pub trait DatabasePort {
    /// Start a transaction covering every write until the handle is committed or rolled back
    ///
    /// Waits while another transaction is open.
    async fn begin(&self) -> Result<Transaction, Error>;
    async fn commit(&self, transaction: Transaction) -> Result<(), Error>;
    /// Discard every write made since `begin`
    async fn rollback(&self, transaction: Transaction) -> Result<(), Error>;

    async fn save_custom(&self, custom: NewCustomRecipe) -> Result<Uuid, Error>;
    async fn find_custom_by_id(&self, custom_id: Uuid) -> Result<Option<CustomRecipe>, Error>;
    async fn modify_custom(&self, custom_id: Uuid, patch: CustomRecipePatch) -> Result<(), Error>;
    async fn delete_custom_by_id(&self, custom_id: Uuid) -> Result<(), Error>;
    /// Page of the recipes based on `cocktail_id` that `viewer` is allowed to see
    ///
    /// A recipe is visible if it is open or owned by `viewer`.
    async fn find_all_custom(
        &self,
        viewer: Uuid,
        cocktail_id: i64,
        page: PageRequest,
    ) -> Result<Page<CustomRecipe>, Error>;
    async fn find_all_custom_ids(&self) -> Result<Vec<Uuid>, Error>;

    async fn save_custom_ingredient(&self, ingredient: NewCustomIngredient)
        -> Result<Uuid, Error>;
    /// Ingredient lines of a recipe, in insertion order
    async fn find_custom_ingredients(&self, custom_id: Uuid)
        -> Result<Vec<CustomIngredient>, Error>;
    /// Remove every ingredient line of a recipe, returning how many were removed
    async fn delete_custom_ingredients(&self, custom_id: Uuid) -> Result<u64, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when a custom recipe does not exist
    #[error("custom recipe {0} does not exist")]
    CustomDoesNotExist(Uuid),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}

/// Handle on an open transaction
///
/// Dropping the handle without committing it undoes the transaction.
pub struct Transaction {
    abort: Option<Box<dyn FnOnce() + Send>>,
}

impl Transaction {
    /// Handle running `abort` unless it is completed
    pub fn new(abort: impl FnOnce() + Send + 'static) -> Self {
        Self {
            abort: Some(Box::new(abort)),
        }
    }

    /// Handle with nothing to undo locally
    pub fn detached() -> Self {
        Self { abort: None }
    }

    /// Keep the writes and release the transaction
    pub fn complete(mut self) {
        self.abort = None;
    }

    /// Undo the writes and release the transaction
    pub fn abort(mut self) {
        if let Some(abort) = self.abort.take() {
            abort();
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if let Some(abort) = self.abort.take() {
            abort();
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("open", &self.abort.is_some())
            .finish()
    }
}
