//! The remote filter port and helpers that drive the controller with it

use super::controller::{Completion, FetchTicket, PagedSearchController};
use super::page::{Page, PageRequest};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// A failed fetch, already phrased for the user
///
/// Transport failures and server rejections collapse into this one type;
/// the controller never retries, so it has no use for the distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

/// Anything that can return a filtered page of `E`
pub trait FilterPort<E>: Send + Sync {
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<'_, Result<Page<E>, FetchError>>;
}

impl<E, P> FilterPort<E> for Arc<P>
where
    P: FilterPort<E> + ?Sized,
{
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<'_, Result<Page<E>, FetchError>> {
        (**self).fetch_page(request)
    }
}

/// Run one ticket against the port and apply the result
///
/// For headless callers that await inline. Interactive callers spawn the
/// fetch and call `complete` when the result comes back instead.
pub async fn drive<E, P>(
    controller: &mut PagedSearchController<E>,
    port: &P,
    ticket: FetchTicket,
) -> Completion
where
    E: Clone,
    P: FilterPort<E> + ?Sized,
{
    let result = port.fetch_page(ticket.request.clone()).await;
    controller.complete(&ticket, result)
}

/// One large unfiltered page, for pickers that show everything at once
pub async fn fetch_all<E, P>(port: &P, page_size: u32) -> Result<Vec<E>, FetchError>
where
    P: FilterPort<E> + ?Sized,
{
    let page = port
        .fetch_page(PageRequest::new(0, page_size, None))
        .await?;
    Ok(page.items)
}
