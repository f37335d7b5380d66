use std::{borrow::Cow, future::Future, sync::Arc};

use tracing::warn;

use crate::ports::{
    catalog::{self, CatalogPort},
    database::{self, DatabasePort},
    image::{self, ImagePort},
    member::{self, MemberPort},
};

pub mod create_custom;
pub mod delete_custom;
pub mod find_custom;
pub mod guard;
pub mod list_custom;
pub mod list_custom_ids;
pub mod modify_custom;

#[cfg(test)]
mod fixtures;

/// Custom recipe service
///
/// Every operation is exposed as a [`tower::Service`] implementation for its request type.
pub struct DomainLogic<D, C, M, I> {
    database: Arc<D>,
    catalog: Arc<C>,
    member: Arc<M>,
    image: Arc<I>,
}

impl<D, C, M, I> DomainLogic<D, C, M, I>
where
    D: DatabasePort,
    C: CatalogPort,
    M: MemberPort,
    I: ImagePort,
{
    pub fn new(database: Arc<D>, catalog: Arc<C>, member: Arc<M>, image: Arc<I>) -> Self {
        Self {
            database,
            catalog,
            member,
            image,
        }
    }
}

impl<D, C, M, I> Clone for DomainLogic<D, C, M, I> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            catalog: self.catalog.clone(),
            member: self.member.clone(),
            image: self.image.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("database port error: {0:?}")]
    Database(#[from] database::Error),
    #[error("catalog port error: {0:?}")]
    Catalog(#[from] catalog::Error),
    #[error("member port error: {0:?}")]
    Member(#[from] member::Error),
    #[error("image port error: {0:?}")]
    Image(#[from] image::Error),

    /// The acting member may not touch this custom recipe
    #[error("forbidden")]
    Forbidden,
    /// The custom recipe is private and the viewer is not its owner
    #[error("custom recipe is not available")]
    NotAvailable,
    #[error("invalid request: {0}")]
    Validation(Cow<'static, str>),
}

/// Coarse classification of an [`Error`], for callers mapping errors to responses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    NotAvailable,
    Validation,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Database(database::Error::CustomDoesNotExist(_))
            | Error::Catalog(
                catalog::Error::CocktailDoesNotExist(_)
                | catalog::Error::IngredientDoesNotExist(_)
                | catalog::Error::UnitDoesNotExist(_),
            )
            | Error::Member(member::Error::MemberDoesNotExist(_)) => ErrorKind::NotFound,
            Error::Image(image::Error::EmptyImage | image::Error::TooLarge { .. }) => {
                ErrorKind::Validation
            }
            Error::Forbidden => ErrorKind::Forbidden,
            Error::NotAvailable => ErrorKind::NotAvailable,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Database(_) | Error::Catalog(_) | Error::Member(_) | Error::Image(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Run `work` inside a store transaction
///
/// The transaction is committed if `work` succeeds and rolled back otherwise. A failing rollback
/// is logged and the error from `work` is returned. If the returned future is dropped early, the
/// transaction handle rolls back on drop.
async fn transactional<D, T, F>(database: &D, work: F) -> Result<T, Error>
where
    D: DatabasePort + ?Sized,
    F: Future<Output = Result<T, Error>>,
{
    let transaction = database.begin().await?;
    match work.await {
        Ok(value) => {
            database.commit(transaction).await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = database.rollback(transaction).await {
                warn!(error = %rollback_err, "failed to roll back transaction");
            }
            Err(err)
        }
    }
}

/// Delete the image of a recipe
///
/// An image that is already gone counts as deleted.
async fn remove_image<I>(image: &I, url: String) -> Result<(), Error>
where
    I: ImagePort + ?Sized,
{
    match image.delete(url).await {
        Err(image::Error::ImageDoesNotExist(url)) => {
            warn!(url = %url, "image was already deleted");
            Ok(())
        }
        res => Ok(res?),
    }
}

/// Delete an image uploaded during a call that later failed
async fn discard_image<I>(image: &I, url: String)
where
    I: ImagePort + ?Sized,
{
    if let Err(err) = image.delete(url.clone()).await {
        warn!(url = %url, error = %err, "failed to clean up uploaded image");
    }
}
