//! The paged search controller
//!
//! One instance per list. It owns the query, the page cursor and the
//! accumulated items, and hands out [`FetchTicket`]s describing the next
//! request. The owner runs the ticket against a [`FilterPort`] (usually on a
//! spawned task) and feeds the result back through [`complete`].
//!
//! # Epochs
//!
//! Every reset (new query, forced load, refresh) starts a new epoch. A
//! completion is applied only if its ticket is the one currently in flight;
//! anything older is reported as [`Completion::Stale`] and dropped, so a slow
//! first page for an old query can never land in the new query's list.
//!
//! [`FilterPort`]: super::FilterPort
//! [`complete`]: PagedSearchController::complete

use super::page::{normalize_query, Page, PageRequest};
use super::port::FetchError;
use super::state::ControllerState;
use tokio::sync::watch;

/// Whether a fetch starts a fresh list or extends the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Initial,
    More,
}

/// A fetch the controller wants executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub epoch: u64,
    pub kind: FetchKind,
    pub request: PageRequest,
}

/// What `complete` did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

pub struct PagedSearchController<E> {
    /// Used in log lines ("teachers", "courses", ...)
    label: &'static str,
    page_size: u32,
    epoch: u64,
    in_flight: Option<FetchTicket>,
    state: ControllerState<E>,
    publisher: watch::Sender<ControllerState<E>>,
}

impl<E: Clone> PagedSearchController<E> {
    pub fn new(label: &'static str, page_size: u32) -> Self {
        let state = ControllerState::default();
        let (publisher, _) = watch::channel(state.clone());
        Self {
            label,
            page_size: page_size.max(1),
            epoch: 0,
            in_flight: None,
            state,
            publisher,
        }
    }

    pub fn state(&self) -> &ControllerState<E> {
        &self.state
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<ControllerState<E>> {
        self.publisher.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// Start a new search if `text` differs from the current query
    ///
    /// Resubmitting the same text is a no-op; use [`refresh`](Self::refresh)
    /// to reload deliberately. A controller that has never loaded treats
    /// any query as new.
    pub fn set_query(&mut self, text: &str) -> Option<FetchTicket> {
        let query = normalize_query(text);
        if self.epoch > 0 && query == self.state.query {
            tracing::debug!(
                "{}: query {:?} unchanged, search skipped",
                self.label,
                query
            );
            return None;
        }
        Some(self.reset_and_fetch(query))
    }

    /// Start a new search unconditionally (initial load)
    pub fn set_query_forced(&mut self, text: &str) -> FetchTicket {
        self.reset_and_fetch(normalize_query(text))
    }

    /// Reset and refetch page 0 of the current query
    ///
    /// Used after a create, edit or delete may have changed the results.
    pub fn refresh(&mut self) -> FetchTicket {
        tracing::debug!("{}: refresh (query {:?})", self.label, self.state.query);
        let query = self.state.query.clone();
        self.reset_and_fetch(query)
    }

    /// Request the next page, if the guard allows it
    ///
    /// A controller with no search yet has no query to continue.
    pub fn load_more(&mut self) -> Option<FetchTicket> {
        if self.epoch == 0 {
            tracing::debug!("{}: load more before first search ignored", self.label);
            return None;
        }
        if !self.state.accepts_load_more() {
            tracing::debug!(
                "{}: load more declined (can_load_more={}, loading={}, loading_more={})",
                self.label,
                self.state.can_load_more,
                self.state.is_loading,
                self.state.is_loading_more
            );
            return None;
        }

        let request = PageRequest::new(
            self.state.next_page_index,
            self.page_size,
            self.state.query.clone(),
        );
        let ticket = FetchTicket {
            epoch: self.epoch,
            kind: FetchKind::More,
            request,
        };

        tracing::debug!(
            "{}: loading page {} (query {:?})",
            self.label,
            ticket.request.page_index,
            ticket.request.filter_text
        );

        self.in_flight = Some(ticket.clone());
        self.update(|s| {
            s.is_loading_more = true;
            s.last_error = None;
        });
        Some(ticket)
    }

    /// Apply the result of a ticket previously handed out
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Page<E>, FetchError>,
    ) -> Completion {
        if self.in_flight.as_ref() != Some(ticket) {
            tracing::debug!(
                "{}: discarding stale page {} from epoch {} (current epoch {})",
                self.label,
                ticket.request.page_index,
                ticket.epoch,
                self.epoch
            );
            return Completion::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let can_continue = page.can_continue();
                let received = page.items.len();
                let page_index = ticket.request.page_index;

                self.update(|s| {
                    s.items.extend(page.items);
                    s.can_load_more = can_continue;
                    s.next_page_index += 1;
                    s.is_loading = false;
                    s.is_loading_more = false;
                });

                if received == 0 && page_index == 0 {
                    tracing::info!(
                        "{}: no results for query {:?}",
                        self.label,
                        self.state.query
                    );
                } else {
                    tracing::info!(
                        "{}: page {} added {} (total {}, more: {})",
                        self.label,
                        page_index,
                        received,
                        self.state.items.len(),
                        can_continue
                    );
                }
            }
            Err(err) => {
                tracing::warn!(
                    "{}: page {} failed: {}",
                    self.label,
                    ticket.request.page_index,
                    err
                );
                self.update(|s| {
                    s.last_error = Some(err.message().to_string());
                    s.can_load_more = false;
                    s.is_loading = false;
                    s.is_loading_more = false;
                });
            }
        }

        Completion::Applied
    }

    /// Clear the error once the view has shown it
    pub fn consume_error(&mut self) -> Option<String> {
        let message = self.state.last_error.clone()?;
        self.update(|s| s.last_error = None);
        Some(message)
    }

    fn reset_and_fetch(&mut self, query: Option<String>) -> FetchTicket {
        self.epoch += 1;
        let ticket = FetchTicket {
            epoch: self.epoch,
            kind: FetchKind::Initial,
            request: PageRequest::new(0, self.page_size, query.clone()),
        };

        tracing::debug!(
            "{}: new search (query {:?}, epoch {})",
            self.label,
            query,
            self.epoch
        );

        self.in_flight = Some(ticket.clone());
        self.update(|s| {
            s.items.clear();
            s.next_page_index = 0;
            s.can_load_more = true;
            s.is_loading = true;
            s.is_loading_more = false;
            s.last_error = None;
            s.query = query;
        });
        ticket
    }

    /// Sole mutation point: apply the change, then publish a snapshot
    fn update(&mut self, apply: impl FnOnce(&mut ControllerState<E>)) {
        apply(&mut self.state);
        self.publisher.send_replace(self.state.clone());
    }
}
