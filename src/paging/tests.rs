//! Controller behavior tests
//!
//! Synchronous tests hold tickets by hand to simulate fetches that are
//! still in flight; async tests run against an in-memory catalog port.

use super::*;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashSet;
use std::sync::Mutex;

// ─────────────────────────────────────────────────────────────────────────────
// Fake port
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory port that filters by substring and pages with `has_next`
struct Catalog {
    items: Vec<&'static str>,
    failing_pages: HashSet<u32>,
    calls: Mutex<Vec<PageRequest>>,
}

impl Catalog {
    fn new(items: &[&'static str]) -> Self {
        Self {
            items: items.to_vec(),
            failing_pages: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, page_index: u32) -> Self {
        self.failing_pages.insert(page_index);
        self
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl FilterPort<String> for Catalog {
    fn fetch_page(&self, request: PageRequest) -> BoxFuture<'_, Result<Page<String>, FetchError>> {
        async move {
            self.calls.lock().unwrap().push(request.clone());
            if self.failing_pages.contains(&request.page_index) {
                return Err(FetchError::new("Network error. Please check your connection."));
            }

            let matching: Vec<String> = self
                .items
                .iter()
                .filter(|item| match &request.filter_text {
                    Some(filter) => item.contains(filter.as_str()),
                    None => true,
                })
                .map(|item| item.to_string())
                .collect();

            let start = (request.page_index * request.page_size) as usize;
            let end = (start + request.page_size as usize).min(matching.len());
            let items = matching.get(start..end).unwrap_or_default().to_vec();
            Ok(Page::new(items, end < matching.len()))
        }
        .boxed()
    }
}

fn page_of(items: &[&str], has_next: bool) -> Page<String> {
    Page::new(items.iter().map(|s| s.to_string()).collect(), has_next)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Guard and reset behavior
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_rapid_load_more_requests_each_page_once() {
    let mut controller = PagedSearchController::new("test", 2);
    let first = controller.set_query_forced("");
    controller.complete(&first, Ok(page_of(&["a", "b"], true)));

    let ticket = controller.load_more().expect("guard should accept");
    // Scroll events keep firing while page 1 is in flight
    for _ in 0..5 {
        assert!(controller.load_more().is_none());
    }
    assert_eq!(ticket.request.page_index, 1);

    controller.complete(&ticket, Ok(page_of(&["c", "d"], true)));
    assert_eq!(controller.state().items, strings(&["a", "b", "c", "d"]));

    // Completing the same ticket twice must not append twice
    assert_eq!(
        controller.complete(&ticket, Ok(page_of(&["c", "d"], true))),
        Completion::Stale
    );
    assert_eq!(controller.state().items.len(), 4);
}

#[test]
fn test_load_more_rejected_during_initial_load() {
    let mut controller: PagedSearchController<String> = PagedSearchController::new("test", 20);
    let _ticket = controller.set_query_forced("");

    assert!(controller.state().is_loading);
    assert!(controller.load_more().is_none());
}

#[test]
fn test_load_more_before_first_search_is_declined() {
    let mut controller: PagedSearchController<String> = PagedSearchController::new("test", 20);

    assert!(controller.load_more().is_none());
    assert_eq!(controller.epoch(), 0);
    assert!(controller.in_flight().is_none());
    assert!(!controller.state().is_loading_more);

    // The first search still goes out as page 0
    let ticket = controller.set_query_forced("");
    assert_eq!(ticket.kind, FetchKind::Initial);
    assert_eq!(ticket.request.page_index, 0);
}

#[test]
fn test_query_change_resets_before_fetch_resolves() {
    let mut controller = PagedSearchController::new("test", 2);
    let first = controller.set_query_forced("");
    controller.complete(&first, Ok(page_of(&["a", "b"], false)));
    assert!(!controller.state().can_load_more);

    let ticket = controller.set_query("math").expect("new query should fetch");
    let state = controller.state();

    assert!(state.items.is_empty());
    assert_eq!(state.next_page_index, 0);
    assert!(state.can_load_more);
    assert!(state.is_loading);
    assert!(!state.is_loading_more);
    assert_eq!(state.query.as_deref(), Some("math"));
    assert_eq!(ticket.kind, FetchKind::Initial);
    assert_eq!(ticket.request.page_index, 0);
    assert_eq!(ticket.request.filter_text.as_deref(), Some("math"));
}

#[test]
fn test_identical_query_is_a_no_op() {
    let mut controller: PagedSearchController<String> = PagedSearchController::new("test", 20);
    assert!(controller.set_query("math").is_some());
    assert!(controller.set_query("math").is_none());
    assert!(controller.set_query("  math  ").is_none());
}

#[test]
fn test_first_query_always_fetches() {
    let mut controller: PagedSearchController<String> = PagedSearchController::new("test", 20);
    let ticket = controller.set_query("   ").expect("pristine controller should load");
    assert_eq!(ticket.request.filter_text, None);
}

#[test]
fn test_refresh_refetches_same_query() {
    let mut controller = PagedSearchController::new("test", 2);
    let first = controller.set_query("ma").unwrap();
    controller.complete(&first, Ok(page_of(&["math", "macro"], true)));

    let ticket = controller.refresh();
    assert_eq!(ticket.request.filter_text.as_deref(), Some("ma"));
    assert_eq!(ticket.request.page_index, 0);
    assert!(controller.state().items.is_empty());
    assert!(ticket.epoch > first.epoch);
}

// ─────────────────────────────────────────────────────────────────────────────
// Continuation and completion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_continuation_tie_break_through_controller() {
    let cases = [
        (Some(true), Some(true), true),
        (None, Some(false), true),
        (None, None, false),
    ];

    for (has_next, is_last, expected) in cases {
        let mut controller = PagedSearchController::new("test", 20);
        let ticket = controller.set_query_forced("");
        controller.complete(
            &ticket,
            Ok(Page {
                items: strings(&["x"]),
                has_next,
                is_last,
            }),
        );
        assert_eq!(
            controller.state().can_load_more,
            expected,
            "has_next={:?} is_last={:?}",
            has_next,
            is_last
        );
    }
}

#[test]
fn test_empty_first_page_is_not_an_error() {
    let mut controller: PagedSearchController<String> = PagedSearchController::new("test", 20);
    let ticket = controller.set_query_forced("nothing");
    controller.complete(&ticket, Ok(page_of(&[], false)));

    let state = controller.state();
    assert!(state.items.is_empty());
    assert_eq!(state.last_error, None);
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.next_page_index, 1);
    assert!(state.shows_no_results());
}

#[test]
fn test_failed_load_more_preserves_items() {
    let mut controller = PagedSearchController::new("test", 2);
    let first = controller.set_query_forced("");
    controller.complete(&first, Ok(page_of(&["a", "b"], true)));
    assert!(controller.state().can_load_more);

    let ticket = controller.load_more().unwrap();
    assert_eq!(controller.state().phase(), Phase::LoadingMore);
    controller.complete(&ticket, Err(FetchError::new("Failed to load. Please try again.")));

    let state = controller.state();
    assert_eq!(state.items, strings(&["a", "b"]));
    assert!(state.last_error.is_some());
    assert!(!state.can_load_more);
    assert!(!state.is_loading_more);
    assert_eq!(state.phase(), Phase::Error);

    // Error blocks pagination until a new search
    assert!(controller.load_more().is_none());
}

#[test]
fn test_failed_first_page_leaves_list_empty() {
    let mut controller: PagedSearchController<String> = PagedSearchController::new("test", 2);
    let ticket = controller.set_query_forced("");
    controller.complete(&ticket, Err(FetchError::new("boom")));

    assert!(controller.state().items.is_empty());
    assert!(!controller.state().is_loading);
    assert_eq!(controller.state().last_error.as_deref(), Some("boom"));
    assert!(!controller.state().shows_no_results());
}

#[test]
fn test_new_search_recovers_from_error() {
    let mut controller = PagedSearchController::new("test", 2);
    let ticket = controller.set_query_forced("");
    controller.complete(&ticket, Err(FetchError::new("boom")));

    let ticket = controller.set_query("a").unwrap();
    assert_eq!(controller.state().phase(), Phase::InitialLoading);
    assert_eq!(controller.state().last_error, None);
    controller.complete(&ticket, Ok(page_of(&["a"], false)));
    assert_eq!(controller.state().phase(), Phase::Idle);
}

#[test]
fn test_consume_error_returns_message_once() {
    let mut controller: PagedSearchController<String> = PagedSearchController::new("test", 2);
    let ticket = controller.set_query_forced("");
    controller.complete(&ticket, Err(FetchError::new("boom")));

    assert_eq!(controller.consume_error().as_deref(), Some("boom"));
    assert_eq!(controller.consume_error(), None);
    assert_eq!(controller.state().last_error, None);
}

#[test]
fn test_stale_response_from_previous_query_is_discarded() {
    let mut controller = PagedSearchController::new("test", 2);
    let old = controller.set_query("alg").unwrap();
    let current = controller.set_query("geo").unwrap();

    // The slow "alg" response lands after the user already typed "geo"
    assert_eq!(
        controller.complete(&old, Ok(page_of(&["algebra"], true))),
        Completion::Stale
    );
    assert!(controller.state().items.is_empty());
    assert!(controller.state().is_loading);

    assert_eq!(
        controller.complete(&current, Ok(page_of(&["geometry"], false))),
        Completion::Applied
    );
    assert_eq!(controller.state().items, strings(&["geometry"]));
}

#[test]
fn test_refresh_during_load_more_discards_the_pending_page() {
    let mut controller = PagedSearchController::new("test", 2);
    let first = controller.set_query_forced("");
    controller.complete(&first, Ok(page_of(&["a", "b"], true)));

    let more = controller.load_more().unwrap();
    let refresh = controller.refresh();
    assert_eq!(refresh.kind, FetchKind::Initial);

    assert_eq!(
        controller.complete(&more, Ok(page_of(&["c", "d"], true))),
        Completion::Stale
    );
    assert!(controller.state().items.is_empty());
    assert!(controller.state().is_loading);
    assert!(!controller.state().is_loading_more);

    controller.complete(&refresh, Ok(page_of(&["a", "b"], false)));
    assert_eq!(controller.state().items, strings(&["a", "b"]));
    assert_eq!(controller.state().next_page_index, 1);
}

#[test]
fn test_subscribers_see_every_change() {
    let mut controller = PagedSearchController::new("test", 2);
    let mut rx = controller.subscribe();

    let ticket = controller.set_query_forced("");
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_loading);

    controller.complete(&ticket, Ok(page_of(&["a"], false)));
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.items, strings(&["a"]));
    assert!(!snapshot.is_loading);
}

// ─────────────────────────────────────────────────────────────────────────────
// Driven through a port
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_end_to_end_paging_over_five_items() {
    let catalog = Catalog::new(&["A", "B", "C", "D", "E"]);
    let mut controller = PagedSearchController::new("test", 2);

    let ticket = controller.set_query_forced("");
    drive(&mut controller, &catalog, ticket).await;
    assert_eq!(controller.state().items, strings(&["A", "B"]));
    assert!(controller.state().can_load_more);

    let ticket = controller.load_more().unwrap();
    drive(&mut controller, &catalog, ticket).await;
    assert_eq!(controller.state().items, strings(&["A", "B", "C", "D"]));
    assert!(controller.state().can_load_more);

    let ticket = controller.load_more().unwrap();
    drive(&mut controller, &catalog, ticket).await;
    assert_eq!(controller.state().items, strings(&["A", "B", "C", "D", "E"]));
    assert!(!controller.state().can_load_more);

    assert!(controller.load_more().is_none());
    assert_eq!(catalog.call_count(), 3);

    let indexes: Vec<u32> = catalog
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.page_index)
        .collect();
    assert_eq!(indexes, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_identical_search_fetches_once() {
    let catalog = Catalog::new(&["math", "music"]);
    let mut controller = PagedSearchController::new("test", 20);

    for _ in 0..2 {
        if let Some(ticket) = controller.set_query("math") {
            drive(&mut controller, &catalog, ticket).await;
        }
    }

    assert_eq!(catalog.call_count(), 1);
    assert_eq!(controller.state().items, strings(&["math"]));
}

#[tokio::test]
async fn test_port_failure_mid_list() {
    let catalog = Catalog::new(&["a", "b", "c"]).failing_on(1);
    let mut controller = PagedSearchController::new("test", 2);

    let ticket = controller.set_query_forced("");
    drive(&mut controller, &catalog, ticket).await;
    let ticket = controller.load_more().unwrap();
    drive(&mut controller, &catalog, ticket).await;

    assert_eq!(controller.state().items, strings(&["a", "b"]));
    assert_eq!(
        controller.state().last_error.as_deref(),
        Some("Network error. Please check your connection.")
    );
    assert!(!controller.state().can_load_more);
}

#[tokio::test]
async fn test_fetch_all_uses_single_large_page() {
    let catalog = Catalog::new(&["a", "b", "c"]);
    let items = fetch_all(&catalog, PICKER_PAGE_SIZE).await.unwrap();

    assert_eq!(items, strings(&["a", "b", "c"]));
    let calls = catalog.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].page_size, PICKER_PAGE_SIZE);
    assert_eq!(calls[0].filter_text, None);
}
