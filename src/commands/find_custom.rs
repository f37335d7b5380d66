use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use chrono::{DateTime, Utc};
use tower::Service;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::{list_custom::UserSummary, DomainLogic, Error};
use crate::{
    domain::Unit,
    ports::{
        catalog::CatalogPort,
        database::{self, DatabasePort},
        image::ImagePort,
        member::MemberPort,
    },
};

pub struct FindCustomRequest {
    /// Member viewing the recipe
    pub member_id: Uuid,
    pub custom_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CocktailSummary {
    pub id: i64,
    pub name: String,
    pub kr_name: String,
    pub image: String,
    pub heart_count: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CustomIngredientDetail {
    /// Identifier of the catalog ingredient
    pub id: i64,
    pub name: String,
    pub image: String,
    pub amount: f64,
    pub unit: Unit,
}

#[derive(Debug, PartialEq)]
pub struct CustomDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub comment: String,
    pub recipe: String,
    pub summary: String,
    pub open: bool,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub user: UserSummary,
    pub cocktail: CocktailSummary,
    pub ingredients: Vec<CustomIngredientDetail>,
}

impl<D, C, M, I> Service<FindCustomRequest> for DomainLogic<D, C, M, I>
where
    D: DatabasePort + 'static,
    C: CatalogPort + 'static,
    M: MemberPort + 'static,
    I: ImagePort + 'static,
{
    type Response = CustomDetailResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindCustomRequest) -> Self::Future {
        let database = self.database.clone();
        let catalog = self.catalog.clone();
        let member = self.member.clone();
        let span = info_span!(
            "find_custom",
            member_id = %req.member_id,
            custom_id = %req.custom_id
        );
        Box::pin(
            async move {
                let custom = database
                    .find_custom_by_id(req.custom_id)
                    .await?
                    .ok_or(database::Error::CustomDoesNotExist(req.custom_id))?;

                // Private recipes look the same as hidden ones to everyone but their owner
                if !custom.is_visible_to(req.member_id) {
                    return Err(Error::NotAvailable);
                }

                let author = member.get_member(custom.member_id).await?;
                let cocktail = catalog.get_cocktail(custom.cocktail_id).await?;

                let lines = database.find_custom_ingredients(custom.id).await?;
                let mut ingredients = Vec::with_capacity(lines.len());
                for line in lines {
                    let ingredient = catalog.get_ingredient(line.ingredient_id).await?;
                    let unit = catalog.get_unit(line.unit_id).await?;
                    ingredients.push(CustomIngredientDetail {
                        id: ingredient.id,
                        name: ingredient.name,
                        image: ingredient.image,
                        amount: line.amount,
                        unit,
                    });
                }

                Ok(CustomDetailResponse {
                    id: custom.id,
                    name: custom.name,
                    comment: custom.comment,
                    recipe: custom.recipe,
                    summary: custom.summary,
                    open: custom.open,
                    image: custom.image,
                    created_at: custom.created_at,
                    modified_at: custom.modified_at,
                    user: UserSummary {
                        id: author.member_id,
                        nickname: author.nickname,
                    },
                    cocktail: CocktailSummary {
                        id: cocktail.id,
                        name: cocktail.name,
                        kr_name: cocktail.kr_name,
                        image: cocktail.image,
                        heart_count: cocktail.heart_count,
                    },
                    ingredients,
                })
            }
            .instrument(span),
        )
    }
}
