use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::{
    create_custom::{insert_ingredients, validate, CustomIngredientInput},
    discard_image, guard, remove_image, transactional, DomainLogic, Error,
};
use crate::{
    domain::CustomRecipePatch,
    ports::{
        catalog::CatalogPort,
        database::{self, DatabasePort},
        image::ImagePort,
        member::MemberPort,
    },
};

/// Replace the editable fields and the whole ingredient list of a custom recipe
///
/// The owner and base cocktail of a recipe cannot be changed.
pub struct ModifyCustomRequest {
    /// Member asking for the modification
    pub user_id: Uuid,
    pub custom_id: Uuid,
    /// New picture, the current one is kept if `None`
    pub image: Option<Vec<u8>>,
    pub name: String,
    pub comment: String,
    pub recipe: String,
    pub summary: String,
    pub open: bool,
    pub ingredients: Vec<CustomIngredientInput>,
}

impl<D, C, M, I> Service<ModifyCustomRequest> for DomainLogic<D, C, M, I>
where
    D: DatabasePort + 'static,
    C: CatalogPort + 'static,
    M: MemberPort + 'static,
    I: ImagePort + 'static,
{
    type Response = ();
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut req: ModifyCustomRequest) -> Self::Future {
        let database = self.database.clone();
        let catalog = self.catalog.clone();
        let member = self.member.clone();
        let image = self.image.clone();
        let span = info_span!(
            "modify_custom",
            user_id = %req.user_id,
            custom_id = %req.custom_id
        );
        Box::pin(
            async move {
                let grant =
                    guard::authorize(&*database, &*member, req.user_id, req.custom_id).await?;

                validate(&req.name, &req.ingredients)?;
                let picture = req.image.take();
                if picture.as_ref().is_some_and(|picture| picture.is_empty()) {
                    return Err(Error::Validation("image must not be empty".into()));
                }

                let mut uploaded = None;
                let res = transactional(&*database, async {
                    database.delete_custom_ingredients(req.custom_id).await?;

                    let custom = database
                        .find_custom_by_id(req.custom_id)
                        .await?
                        .ok_or(database::Error::CustomDoesNotExist(req.custom_id))?;
                    grant.ensure(req.user_id, &custom)?;

                    insert_ingredients(&*database, &*catalog, req.custom_id, &req.ingredients)
                        .await?;

                    let image_url = match picture {
                        Some(picture) => {
                            remove_image(&*image, custom.image).await?;
                            let url = image.upload(picture).await?;
                            uploaded = Some(url.clone());
                            url
                        }
                        None => custom.image,
                    };

                    database
                        .modify_custom(
                            req.custom_id,
                            CustomRecipePatch {
                                name: req.name.clone(),
                                summary: req.summary.clone(),
                                comment: req.comment.clone(),
                                recipe: req.recipe.clone(),
                                image: image_url,
                                open: req.open,
                            },
                        )
                        .await?;
                    Ok::<_, Error>(())
                })
                .await;

                match res {
                    Ok(()) => {
                        info!(
                            ingredients = req.ingredients.len(),
                            new_image = uploaded.is_some(),
                            "custom recipe modified"
                        );
                        Ok(())
                    }
                    Err(err) => {
                        if let Some(url) = uploaded {
                            discard_image(&*image, url).await;
                        }
                        Err(err)
                    }
                }
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commands::{create_custom::CreateCustomResponse, fixtures::*, ErrorKind},
        domain::CustomRecipe,
        ports::{
            database::{MockDatabasePort, Transaction},
            image::MockImagePort,
        },
    };
    use chrono::Utc;
    use mockall::predicate::*;
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    async fn created(world: &World) -> Result<(Uuid, String), BoxError> {
        let domain = world.logic();
        let CreateCustomResponse { custom_id } = domain
            .clone()
            .oneshot(create_request(world.owner, true))
            .await?;
        let image_url = world
            .database
            .find_custom_by_id(custom_id)
            .await?
            .map(|custom| custom.image)
            .unwrap_or_default();
        Ok((custom_id, image_url))
    }

    fn modify_request(user_id: Uuid, custom_id: Uuid) -> ModifyCustomRequest {
        ModifyCustomRequest {
            user_id,
            custom_id,
            image: None,
            name: "Gibson".to_string(),
            comment: "Cocktail onion instead of olive".to_string(),
            recipe: "Stir, garnish with onion".to_string(),
            summary: "Onion martini".to_string(),
            open: false,
            ingredients: vec![ingredient(GIN, ML, 50.0), ingredient(VERMOUTH, ML, 15.0)],
        }
    }

    #[rstest]
    #[case::owner(true)]
    #[case::admin(false)]
    #[tokio::test]
    async fn test_call_replaces_ingredients(#[case] as_owner: bool) -> Result<(), BoxError> {
        // GIVEN a stored custom recipe with 3 ingredient lines
        let world = World::new();
        let (custom_id, image_url) = created(&world).await?;
        let user_id = if as_owner { world.owner } else { world.admin };

        // WHEN modifying it with 2 ingredient lines and no new image
        let domain = world.logic();
        let res = domain.clone().oneshot(modify_request(user_id, custom_id)).await;

        // THEN
        // * only the submitted ingredient lines remain
        // * fields are updated, the image, owner and cocktail are unchanged
        assert_that!(res).is_ok();
        let lines: Vec<_> = world
            .database
            .find_custom_ingredients(custom_id)
            .await?
            .iter()
            .map(|line| (line.ingredient_id, line.unit_id, line.amount))
            .collect();
        assert_that!(lines).is_equal_to(vec![(GIN, ML, 50.0), (VERMOUTH, ML, 15.0)]);
        let custom = world.database.find_custom_by_id(custom_id).await?;
        assert_that!(custom).is_some().matches(|custom| {
            custom.name == "Gibson"
                && custom.summary == "Onion martini"
                && !custom.open
                && custom.image == image_url
                && custom.member_id == world.owner
                && custom.cocktail_id == MARTINI
        });
        assert_that!(world.image.contains(&image_url)?).is_true();

        Ok(())
    }

    #[tokio::test]
    async fn test_call_new_image() -> Result<(), BoxError> {
        // GIVEN a stored custom recipe and an image store expecting a swap
        let world = World::new();
        let (custom_id, image_url) = created(&world).await?;
        let mut image = MockImagePort::new();
        image
            .expect_delete()
            .times(1)
            .with(eq(image_url))
            .returning(|_| Ok(()));
        image
            .expect_upload()
            .times(1)
            .with(eq(vec![1, 2, 3]))
            .returning(|_| Ok("memory://images/new".to_string()));

        // WHEN modifying it with a new image
        let domain = world.logic_with_image(image);
        let mut req = modify_request(world.owner, custom_id);
        req.image = Some(vec![1, 2, 3]);
        let res = domain.clone().oneshot(req).await;

        // THEN the old image is deleted and the new URL stored
        assert_that!(res).is_ok();
        assert_that!(world.database.find_custom_by_id(custom_id).await?)
            .is_some()
            .matches(|custom| custom.image == "memory://images/new");

        Ok(())
    }

    #[tokio::test]
    async fn test_forbidden() -> Result<(), BoxError> {
        let world = World::new();
        let (custom_id, image_url) = created(&world).await?;

        let domain = world.logic();
        let mut req = modify_request(world.other, custom_id);
        req.image = Some(vec![9]);
        let res = domain.clone().oneshot(req).await;

        assert_that!(res.map_err(|err| err.kind())).is_equal_to(Err(ErrorKind::Forbidden));
        assert_that!(world.database.find_custom_ingredients(custom_id).await?).has_length(3);
        assert_that!(world.database.find_custom_by_id(custom_id).await?)
            .is_some()
            .matches(|custom| custom.name == "Dirty Martini" && custom.image == image_url);
        assert_that!(world.image.len()?).is_equal_to(1);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_unit_keeps_previous_ingredients() -> Result<(), BoxError> {
        // GIVEN a stored custom recipe
        let world = World::new();
        let (custom_id, _) = created(&world).await?;

        // WHEN modifying it with an ingredient line using an unknown unit
        let domain = world.logic();
        let mut req = modify_request(world.owner, custom_id);
        req.ingredients.push(ingredient(OLIVE, 999, 1.0));
        let res = domain.clone().oneshot(req).await;

        // THEN it fails and no half-replaced ingredient list is left
        assert_that!(res.map_err(|err| err.kind())).is_equal_to(Err(ErrorKind::NotFound));
        let lines: Vec<_> = world
            .database
            .find_custom_ingredients(custom_id)
            .await?
            .iter()
            .map(|line| (line.ingredient_id, line.amount))
            .collect();
        assert_that!(lines).is_equal_to(vec![(GIN, 60.0), (VERMOUTH, 10.0), (OLIVE, 2.0)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_update_discards_new_image() -> Result<(), BoxError> {
        // GIVEN
        // * a store failing the final update
        // * an image store expecting the old image to be swapped, then the new one discarded
        let world = World::new();
        let custom_id = Uuid::new_v4();
        let stored = CustomRecipe {
            id: custom_id,
            member_id: world.owner,
            cocktail_id: MARTINI,
            name: "Dirty Martini".to_string(),
            comment: "".to_string(),
            recipe: "".to_string(),
            summary: "".to_string(),
            open: true,
            image: "memory://images/old".to_string(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
        };
        let mut database = MockDatabasePort::new();
        database
            .expect_begin()
            .times(1)
            .returning(|| Ok(Transaction::detached()));
        database
            .expect_find_custom_by_id()
            .with(eq(custom_id))
            .returning(move |_| Ok(Some(stored.clone())));
        database
            .expect_delete_custom_ingredients()
            .times(1)
            .returning(|_| Ok(3));
        database
            .expect_save_custom_ingredient()
            .times(2)
            .returning(|_| Ok(Uuid::new_v4()));
        database
            .expect_modify_custom()
            .times(1)
            .returning(|id, _| Err(database::Error::CustomDoesNotExist(id)));
        database.expect_rollback().times(1).returning(|_| Ok(()));
        database.expect_commit().never();
        let mut image = MockImagePort::new();
        image
            .expect_delete()
            .times(1)
            .with(eq("memory://images/old".to_string()))
            .returning(|_| Ok(()));
        image
            .expect_upload()
            .times(1)
            .returning(|_| Ok("memory://images/new".to_string()));
        image
            .expect_delete()
            .times(1)
            .with(eq("memory://images/new".to_string()))
            .returning(|_| Ok(()));

        // WHEN the owner modifies the recipe with a new image
        let domain = world.logic_with(database, image);
        let mut req = modify_request(world.owner, custom_id);
        req.image = Some(vec![1]);
        let res = domain.clone().oneshot(req).await;

        // THEN the update error is returned and all expectations are met
        assert_that!(res.map_err(|err| err.kind())).is_equal_to(Err(ErrorKind::NotFound));
        Arc::into_inner(domain.image).unwrap().checkpoint();
        Arc::into_inner(domain.database).unwrap().checkpoint();

        Ok(())
    }

    #[rstest]
    #[case::blank_name("  ", vec![ingredient(GIN, ML, 50.0)])]
    #[case::no_ingredients("Gibson", vec![])]
    #[case::negative_amount("Gibson", vec![ingredient(GIN, ML, -1.0)])]
    #[tokio::test]
    async fn test_forbidden_before_validation(
        #[case] name: &str,
        #[case] ingredients: Vec<CustomIngredientInput>,
    ) -> Result<(), BoxError> {
        // GIVEN a recipe owned by someone else
        let world = World::new();
        let (custom_id, _) = created(&world).await?;

        // WHEN a stranger sends an invalid modification
        let domain = world.logic();
        let mut req = modify_request(world.other, custom_id);
        req.name = name.to_string();
        req.ingredients = ingredients;
        req.image = Some(Vec::new());
        let res = domain.clone().oneshot(req).await;

        // THEN the call is forbidden rather than rejected as invalid
        assert_that!(res.map_err(|err| err.kind())).is_equal_to(Err(ErrorKind::Forbidden));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_old_image_is_replaced() -> Result<(), BoxError> {
        // GIVEN a recipe whose image is already gone from the image store
        let world = World::new();
        let (custom_id, image_url) = created(&world).await?;
        world.image.delete(image_url).await?;

        // WHEN the owner modifies it with a new image
        let domain = world.logic();
        let mut req = modify_request(world.owner, custom_id);
        req.image = Some(vec![4, 5, 6]);
        let res = domain.clone().oneshot(req).await;

        // THEN the new image is stored and referenced
        assert_that!(res).is_ok();
        let custom = world.database.find_custom_by_id(custom_id).await?;
        let new_url = custom.map(|custom| custom.image).unwrap_or_default();
        assert_that!(world.image.contains(&new_url)?).is_true();

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_image_rejected() -> Result<(), BoxError> {
        let world = World::new();
        let (custom_id, _) = created(&world).await?;
        let mut image = MockImagePort::new();
        image.expect_upload().never();
        image.expect_delete().never();

        let domain = world.logic_with_image(image);
        let mut req = modify_request(world.owner, custom_id);
        req.image = Some(Vec::new());
        let res = domain.clone().oneshot(req).await;

        assert_that!(res.map_err(|err| err.kind())).is_equal_to(Err(ErrorKind::Validation));

        Ok(())
    }
}
