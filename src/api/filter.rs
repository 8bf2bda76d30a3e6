//! Remote filter port backed by the `filterX` endpoints

use super::client::SchoolClient;
use super::dto::{statuses_ok, RespSlice, SimpleStringFilter};
use super::error::ApiError;
use crate::entity::Entity;
use crate::paging::{FetchError, FilterPort, Page, PageRequest};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::marker::PhantomData;
use std::sync::Arc;

/// [`FilterPort`] for one entity kind over a shared [`SchoolClient`]
pub struct RemoteFilter<E> {
    client: Arc<SchoolClient>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> RemoteFilter<E> {
    pub fn new(client: Arc<SchoolClient>) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }
}

/// A non-OK status list turns an otherwise successful response into a failure
pub fn slice_into_page<E>(resp: RespSlice<E>) -> Result<Page<E>, ApiError> {
    if !statuses_ok(resp.status.as_deref()) {
        return Err(ApiError::Server {
            statuses: resp.status.unwrap_or_default(),
        });
    }
    Ok(match resp.slice {
        Some(slice) => {
            tracing::trace!(
                "slice number={:?} size={:?} elements={:?} has_next={:?} last={:?}",
                slice.number,
                slice.size,
                slice.number_of_elements,
                slice.has_next,
                slice.last
            );
            slice.into()
        }
        None => Page {
            items: Vec::new(),
            has_next: None,
            is_last: None,
        },
    })
}

impl<E: Entity> FilterPort<E> for RemoteFilter<E> {
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<'_, Result<Page<E>, FetchError>> {
        async move {
            let body = SimpleStringFilter::from(&request);
            self.client
                .filter::<E>(&body)
                .await
                .and_then(slice_into_page)
                .map_err(|e| {
                    tracing::error!(
                        "filter {} page {} failed: {}",
                        E::KIND.plural(),
                        request.page_index,
                        e
                    );
                    e.into_fetch_error(E::KIND)
                })
        }
        .boxed()
    }
}
