use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::{guard, remove_image, transactional, DomainLogic, Error};
use crate::ports::{
    catalog::CatalogPort,
    database::{self, DatabasePort},
    image::ImagePort,
    member::MemberPort,
};

pub struct DeleteCustomRequest {
    /// Member asking for the deletion
    pub user_id: Uuid,
    pub custom_id: Uuid,
}

impl<D, C, M, I> Service<DeleteCustomRequest> for DomainLogic<D, C, M, I>
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

    fn call(&mut self, req: DeleteCustomRequest) -> Self::Future {
        let database = self.database.clone();
        let member = self.member.clone();
        let image = self.image.clone();
        let span = info_span!(
            "delete_custom",
            user_id = %req.user_id,
            custom_id = %req.custom_id
        );
        Box::pin(
            async move {
                let grant =
                    guard::authorize(&*database, &*member, req.user_id, req.custom_id).await?;

                transactional(&*database, async {
                    // Ingredient lines go first, the ownership check below relies on the
                    // transaction to restore them.
                    let removed = database.delete_custom_ingredients(req.custom_id).await?;

                    let custom = database
                        .find_custom_by_id(req.custom_id)
                        .await?
                        .ok_or(database::Error::CustomDoesNotExist(req.custom_id))?;
                    grant.ensure(req.user_id, &custom)?;

                    remove_image(&*image, custom.image).await?;
                    database.delete_custom_by_id(req.custom_id).await?;

                    info!(ingredients = removed, "custom recipe deleted");
                    Ok::<_, Error>(())
                })
                .await
            }
            .instrument(span),
        )
    }
}
