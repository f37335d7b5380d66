use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use super::{DomainLogic, Error};
use crate::{
    domain::PageRequest,
    ports::{
        catalog::CatalogPort,
        database::DatabasePort,
        image::ImagePort,
        member::{self, MemberPort},
    },
};

/// Page of the custom recipes based on a cocktail, as seen by a member
pub struct ListCustomRequest {
    /// Member browsing the list, who also sees their own private recipes
    pub member_id: Uuid,
    pub cocktail_id: i64,
    pub page: PageRequest,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub nickname: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomSummary {
    pub id: Uuid,
    pub image: String,
    pub name: String,
    pub summary: String,
    pub user: UserSummary,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CustomListResponse {
    pub cocktail_name: String,
    pub customs: Vec<CustomSummary>,
    /// One-based page number
    pub current_page: u64,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl<D, C, M, I> Service<ListCustomRequest> for DomainLogic<D, C, M, I>
where
    D: DatabasePort + 'static,
    C: CatalogPort + 'static,
    M: MemberPort + 'static,
    I: ImagePort + 'static,
{
    type Response = CustomListResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ListCustomRequest) -> Self::Future {
        let database = self.database.clone();
        let catalog = self.catalog.clone();
        let member = self.member.clone();
        let span = info_span!(
            "list_custom",
            member_id = %req.member_id,
            cocktail_id = req.cocktail_id,
            page = req.page.page
        );
        Box::pin(
            async move {
                let cocktail = catalog.get_cocktail(req.cocktail_id).await?;
                let page = database
                    .find_all_custom(req.member_id, cocktail.id, req.page)
                    .await?;

                // Authors often appear several times on a page
                let mut nicknames: HashMap<Uuid, String> = HashMap::new();
                let mut customs = Vec::with_capacity(page.content.len());
                for custom in &page.content {
                    let nickname = match nicknames.get(&custom.member_id) {
                        Some(nickname) => nickname.clone(),
                        None => {
                            let nickname = match member.get_member(custom.member_id).await {
                                Ok(author) => author.nickname,
                                Err(member::Error::MemberDoesNotExist(member_id)) => {
                                    warn!(%member_id, "custom recipe author is unknown");
                                    String::new()
                                }
                                Err(err) => return Err(err.into()),
                            };
                            nicknames.insert(custom.member_id, nickname.clone());
                            nickname
                        }
                    };
                    customs.push(CustomSummary {
                        id: custom.id,
                        image: custom.image.clone(),
                        name: custom.name.clone(),
                        summary: custom.summary.clone(),
                        user: UserSummary {
                            id: custom.member_id,
                            nickname,
                        },
                    });
                }
                debug!(
                    returned = customs.len(),
                    total = page.total_elements,
                    "listed custom recipes"
                );

                Ok(CustomListResponse {
                    cocktail_name: cocktail.name,
                    customs,
                    current_page: page.current_page(),
                    total_pages: page.total_pages(),
                    total_elements: page.total_elements,
                })
            }
            .instrument(span),
        )
    }
}
