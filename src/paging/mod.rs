//! Incremental, searchable, paginated list loading
//!
//! The same controller backs the teacher, course and student lists; it is
//! generic over the entity type and knows nothing about HTTP.
//!
//! # Architecture
//!
//! ```text
//! view ──set_query/load_more/refresh──▶ PagedSearchController
//!                                          │ FetchTicket
//!                                          ▼
//!                                       FilterPort (remote filter call)
//!                                          │ Page<E> | FetchError
//! view ◀──watch snapshot (subscribe)──── complete(ticket, result)
//! ```

mod controller;
mod page;
mod port;
mod state;

#[cfg(test)]
mod tests;

pub use controller::{FetchTicket, PagedSearchController};
pub use page::{Page, PageRequest, LIST_PAGE_SIZE, PICKER_PAGE_SIZE};
pub use port::{drive, fetch_all, FetchError, FilterPort};
pub use state::{ControllerState, ListRow, Phase};

#[cfg(test)]
pub use controller::{Completion, FetchKind};
