use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::{discard_image, transactional, DomainLogic, Error};
use crate::{
    domain::{NewCustomIngredient, NewCustomRecipe},
    ports::{
        catalog::CatalogPort, database::DatabasePort, image::ImagePort, member::MemberPort,
    },
};

pub struct CreateCustomRequest {
    /// Member authoring the recipe
    pub member_id: Uuid,
    pub image: Option<Vec<u8>>,
    pub cocktail_id: i64,
    pub name: String,
    pub comment: String,
    pub recipe: String,
    pub summary: String,
    pub open: bool,
    pub ingredients: Vec<CustomIngredientInput>,
}

/// Ingredient line as submitted by a member
#[derive(Clone, Debug, PartialEq)]
pub struct CustomIngredientInput {
    pub ingredient_id: i64,
    pub unit_id: i64,
    pub amount: f64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CreateCustomResponse {
    pub custom_id: Uuid,
}

impl<D, C, M, I> Service<CreateCustomRequest> for DomainLogic<D, C, M, I>
where
    D: DatabasePort + 'static,
    C: CatalogPort + 'static,
    M: MemberPort + 'static,
    I: ImagePort + 'static,
{
    type Response = CreateCustomResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut req: CreateCustomRequest) -> Self::Future {
        let database = self.database.clone();
        let catalog = self.catalog.clone();
        let member = self.member.clone();
        let image = self.image.clone();
        let span = info_span!(
            "create_custom",
            member_id = %req.member_id,
            cocktail_id = req.cocktail_id
        );
        Box::pin(
            async move {
                validate(&req.name, &req.ingredients)?;
                let Some(picture) = req.image.take().filter(|picture| !picture.is_empty()) else {
                    return Err(Error::Validation("an image is required".into()));
                };

                // The upload cannot take part in the store transaction, so it is undone by hand
                // if anything after it fails.
                let image_url = image.upload(picture).await?;

                let res = transactional(&*database, async {
                    let cocktail = catalog.get_cocktail(req.cocktail_id).await?;
                    let author = member.get_member(req.member_id).await?;
                    let custom_id = database
                        .save_custom(NewCustomRecipe {
                            member_id: author.member_id,
                            cocktail_id: cocktail.id,
                            name: req.name.clone(),
                            comment: req.comment.clone(),
                            recipe: req.recipe.clone(),
                            summary: req.summary.clone(),
                            open: req.open,
                            image: image_url.clone(),
                        })
                        .await?;
                    insert_ingredients(&*database, &*catalog, custom_id, &req.ingredients).await?;
                    Ok::<_, Error>(custom_id)
                })
                .await;

                match res {
                    Ok(custom_id) => {
                        info!(
                            custom_id = %custom_id,
                            ingredients = req.ingredients.len(),
                            "custom recipe created"
                        );
                        Ok(CreateCustomResponse { custom_id })
                    }
                    Err(err) => {
                        discard_image(&*image, image_url).await;
                        Err(err)
                    }
                }
            }
            .instrument(span),
        )
    }
}

/// Check the member-provided fields shared by creation and modification
pub(super) fn validate(name: &str, ingredients: &[CustomIngredientInput]) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Validation("name must not be empty".into()));
    }
    if ingredients.is_empty() {
        return Err(Error::Validation("at least one ingredient is required".into()));
    }
    if let Some(input) = ingredients
        .iter()
        .find(|input| !input.amount.is_finite() || input.amount <= 0.0)
    {
        return Err(Error::Validation(
            format!(
                "amount of ingredient {} must be positive, got {}",
                input.ingredient_id, input.amount
            )
            .into(),
        ));
    }
    Ok(())
}

/// Store one ingredient line per input, resolving units and ingredients from the catalog
pub(super) async fn insert_ingredients<D, C>(
    database: &D,
    catalog: &C,
    custom_id: Uuid,
    ingredients: &[CustomIngredientInput],
) -> Result<(), Error>
where
    D: DatabasePort + ?Sized,
    C: CatalogPort + ?Sized,
{
    for input in ingredients {
        let unit = catalog.get_unit(input.unit_id).await?;
        let ingredient = catalog.get_ingredient(input.ingredient_id).await?;
        database
            .save_custom_ingredient(NewCustomIngredient {
                custom_id,
                ingredient_id: ingredient.id,
                unit_id: unit.id,
                amount: input.amount,
            })
            .await?;
    }
    Ok(())
}
