//! Observable list state
//!
//! This is what a list view renders. It is produced only by
//! [`PagedSearchController`](super::PagedSearchController); views get a
//! reference or a `watch` snapshot and never mutate it.

/// Coarse phase derived from the loading/error flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InitialLoading,
    LoadingMore,
    Error,
}

/// A row as the list view should draw it
///
/// The loading footer is its own variant rather than a fake entity
/// injected into the item list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListRow<'a, E> {
    Item(&'a E),
    LoadingFooter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState<E> {
    /// Current filter (trimmed, `None` = no filter)
    pub query: Option<String>,
    /// Accumulated items in arrival order
    pub items: Vec<E>,
    /// Number of pages consumed since the last reset
    pub next_page_index: u32,
    pub can_load_more: bool,
    pub is_loading: bool,
    pub is_loading_more: bool,
    /// User-facing message, shown once then consumed
    pub last_error: Option<String>,
}

impl<E> Default for ControllerState<E> {
    fn default() -> Self {
        Self {
            query: None,
            items: Vec::new(),
            next_page_index: 0,
            can_load_more: true,
            is_loading: false,
            is_loading_more: false,
            last_error: None,
        }
    }
}

impl<E> ControllerState<E> {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::InitialLoading
        } else if self.is_loading_more {
            Phase::LoadingMore
        } else if self.last_error.is_some() {
            Phase::Error
        } else {
            Phase::Idle
        }
    }

    /// The load-more guard: nothing in flight and more pages expected
    pub fn accepts_load_more(&self) -> bool {
        self.can_load_more && !self.is_loading && !self.is_loading_more
    }

    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_loading_more
    }

    /// First page arrived and was empty, with no error pending
    pub fn shows_no_results(&self) -> bool {
        !self.is_busy()
            && self.items.is_empty()
            && self.last_error.is_none()
            && self.next_page_index > 0
    }

    /// Items followed by a loading footer while the next page is in flight
    pub fn rows(&self) -> impl Iterator<Item = ListRow<'_, E>> + '_ {
        self.items
            .iter()
            .map(ListRow::Item)
            .chain(self.is_loading_more.then_some(ListRow::LoadingFooter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle_and_can_load() {
        let state: ControllerState<u8> = ControllerState::default();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.accepts_load_more());
        assert!(!state.shows_no_results());
    }

    #[test]
    fn test_rows_append_footer_only_while_loading_more() {
        let mut state = ControllerState {
            items: vec![1, 2],
            ..Default::default()
        };
        assert_eq!(state.rows().count(), 2);

        state.is_loading_more = true;
        let rows: Vec<_> = state.rows().collect();
        assert_eq!(
            rows,
            vec![ListRow::Item(&1), ListRow::Item(&2), ListRow::LoadingFooter]
        );
    }

    #[test]
    fn test_phase_precedence() {
        let mut state: ControllerState<u8> = ControllerState {
            last_error: Some("boom".to_string()),
            ..Default::default()
        };
        assert_eq!(state.phase(), Phase::Error);

        state.is_loading = true;
        assert_eq!(state.phase(), Phase::InitialLoading);
    }
}
