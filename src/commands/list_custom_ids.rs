use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use super::{DomainLogic, Error};
use crate::ports::{
    catalog::CatalogPort, database::DatabasePort, image::ImagePort, member::MemberPort,
};

/// Every custom recipe identifier, regardless of visibility
///
/// Meant for bulk consumers such as a search index rebuild.
pub struct ListCustomIdsRequest;

#[derive(Debug, PartialEq, Eq)]
pub struct CustomIdListResponse {
    pub ids: Vec<Uuid>,
}

impl<D, C, M, I> Service<ListCustomIdsRequest> for DomainLogic<D, C, M, I>
where
    D: DatabasePort + 'static,
    C: CatalogPort + 'static,
    M: MemberPort + 'static,
    I: ImagePort + 'static,
{
    type Response = CustomIdListResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: ListCustomIdsRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(
            async move {
                let ids = database.find_all_custom_ids().await?;
                debug!(count = ids.len(), "listed custom recipe ids");
                Ok(CustomIdListResponse { ids })
            }
            .instrument(info_span!("list_custom_ids")),
        )
    }
}
