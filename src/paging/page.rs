//! Page and page-request types shared by the controller and its port

/// Page size for list screens
pub const LIST_PAGE_SIZE: u32 = 20;

/// Page size for one-shot entity pickers (single large page, no paging)
pub const PICKER_PAGE_SIZE: u32 = 200;

/// What to ask the remote filter for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: u32,
    pub page_size: u32,
    /// Trimmed, non-empty filter text, or `None` for "no filter"
    pub filter_text: Option<String>,
}

impl PageRequest {
    pub fn new(page_index: u32, page_size: u32, filter_text: Option<String>) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
            filter_text,
        }
    }
}

/// One server-returned batch of entities plus its continuation signal
///
/// The backend sometimes reports `has_next`, sometimes `is_last`, and
/// sometimes neither; [`Page::can_continue`] resolves them.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub has_next: Option<bool>,
    pub is_last: Option<bool>,
}

impl<E> Page<E> {
    /// A page that explicitly reports whether more pages follow
    #[cfg(test)]
    pub fn new(items: Vec<E>, has_next: bool) -> Self {
        Self {
            items,
            has_next: Some(has_next),
            is_last: None,
        }
    }

    /// `has_next` wins, then `!is_last`, and no signal at all means stop
    pub fn can_continue(&self) -> bool {
        match (self.has_next, self.is_last) {
            (Some(has_next), _) => has_next,
            (None, Some(is_last)) => !is_last,
            (None, None) => false,
        }
    }
}

/// Trim free text; empty after trimming means no filter
pub fn normalize_query(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(has_next: Option<bool>, is_last: Option<bool>) -> Page<u8> {
        Page {
            items: vec![],
            has_next,
            is_last,
        }
    }

    #[test]
    fn test_has_next_takes_precedence_over_is_last() {
        assert!(page(Some(true), Some(true)).can_continue());
        assert!(!page(Some(false), Some(false)).can_continue());
    }

    #[test]
    fn test_is_last_used_when_has_next_absent() {
        assert!(page(None, Some(false)).can_continue());
        assert!(!page(None, Some(true)).can_continue());
    }

    #[test]
    fn test_no_signal_means_no_more_pages() {
        assert!(!page(None, None).can_continue());
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  math "), Some("math".to_string()));
        assert_eq!(normalize_query("   "), None);
        assert_eq!(normalize_query(""), None);
    }

    #[test]
    fn test_page_size_is_at_least_one() {
        assert_eq!(PageRequest::new(0, 0, None).page_size, 1);
    }
}
