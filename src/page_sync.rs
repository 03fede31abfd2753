//! Keeps a table's page index in the address bar's `page` query parameter.
//!
//! The query string is the only place the synced page lives. Reading parses
//! `page` (1-based, absent means 1) into a 0-based index; writing stores
//! `index + 1`, or removes the key for the first page so canonical URLs carry
//! no `page` at all. Every other query parameter is passed through byte for
//! byte and keeps its position.
//!
//! [`Location`] abstracts the address bar. [`MemoryLocation`] is an in-memory
//! implementation with a history stack, used by tests and by hosts that have
//! no real address bar.
//!
//! ```rust
//! use datagrid_widgets::page_sync::{MemoryLocation, PageSyncAdapter};
//!
//! let location = MemoryLocation::new("tab=active");
//! let sync = PageSyncAdapter::new(location.clone());
//!
//! sync.write_page_index(3);
//! assert_eq!(location.search(), "tab=active&page=4");
//! assert_eq!(sync.read_page_index(), 3);
//!
//! sync.write_page_index(0);
//! assert_eq!(location.search(), "tab=active");
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use url::form_urlencoded;

/// Query parameter used unless [`PageSyncAdapter::with_param`] says otherwise.
pub const PAGE_PARAM: &str = "page";

/// How a write is recorded in the location's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Add a history entry, so "back" returns to the previous page.
    #[default]
    Push,
    /// Overwrite the current history entry.
    Replace,
}

/// The query-string half of an address bar.
pub trait Location: Send + Sync {
    /// Current query string, with or without a leading `?`.
    fn search(&self) -> String;

    /// Navigates to `search` (no leading `?`).
    fn navigate(&self, search: &str, mode: HistoryMode);
}

#[derive(Debug)]
struct History {
    entries: Vec<String>,
    index: usize,
}

/// Shared in-memory [`Location`] with back/forward history.
///
/// Clones share the same history, so a host can keep one handle to simulate
/// browser navigation while a table owns another.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    inner: Arc<Mutex<History>>,
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryLocation {
    /// Creates a history with a single entry.
    pub fn new(search: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(History {
                entries: vec![strip_question_mark(search).to_string()],
                index: 0,
            })),
        }
    }

    /// Current query string without the leading `?`.
    pub fn search(&self) -> String {
        let history = self.inner.lock();
        history.entries[history.index].clone()
    }

    /// Pushes a new entry, discarding any forward history.
    pub fn push(&self, search: &str) {
        let mut history = self.inner.lock();
        let next = history.index + 1;
        history.entries.truncate(next);
        history.entries.push(strip_question_mark(search).to_string());
        history.index = next;
    }

    /// Replaces the current entry.
    pub fn replace(&self, search: &str) {
        let mut history = self.inner.lock();
        let index = history.index;
        history.entries[index] = strip_question_mark(search).to_string();
    }

    /// Moves one entry back. Returns false at the start of history.
    pub fn back(&self) -> bool {
        let mut history = self.inner.lock();
        if history.index == 0 {
            return false;
        }
        history.index -= 1;
        true
    }

    /// Moves one entry forward. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        let mut history = self.inner.lock();
        if history.index + 1 >= history.entries.len() {
            return false;
        }
        history.index += 1;
        true
    }

    /// Number of history entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Always false; a history has at least its initial entry.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Location for MemoryLocation {
    fn search(&self) -> String {
        MemoryLocation::search(self)
    }

    fn navigate(&self, search: &str, mode: HistoryMode) {
        match mode {
            HistoryMode::Push => self.push(search),
            HistoryMode::Replace => self.replace(search),
        }
    }
}

/// Reads and writes a page index through a [`Location`].
pub struct PageSyncAdapter {
    location: Box<dyn Location>,
    param: String,
    mode: HistoryMode,
}

impl std::fmt::Debug for PageSyncAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSyncAdapter")
            .field("search", &self.location.search())
            .field("param", &self.param)
            .field("mode", &self.mode)
            .finish()
    }
}

impl PageSyncAdapter {
    /// Syncs through `location` using the `page` parameter and pushed history.
    pub fn new(location: impl Location + 'static) -> Self {
        Self {
            location: Box::new(location),
            param: PAGE_PARAM.to_string(),
            mode: HistoryMode::default(),
        }
    }

    /// Uses a different query parameter name (builder).
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Chooses how writes enter history (builder).
    pub fn with_history_mode(mut self, mode: HistoryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Name of the synced parameter.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Page index currently encoded in the location, 0-based.
    pub fn read_page_index(&self) -> usize {
        parse_page_index(&self.location.search(), &self.param)
    }

    /// Encodes `index` into the location. Does nothing if the location already
    /// says so, which keeps history free of duplicate entries.
    pub fn write_page_index(&self, index: usize) {
        let current = self.location.search();
        let next = with_page_index(&current, &self.param, index);
        if next != strip_question_mark(&current) {
            self.location.navigate(&next, self.mode);
        }
    }
}

fn strip_question_mark(search: &str) -> &str {
    search.strip_prefix('?').unwrap_or(search)
}

fn segment_key(segment: &str) -> Option<String> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
}

/// Parses `param` out of `search` as a 0-based page index.
///
/// Missing, empty, non-numeric or zero values all mean the first page.
pub fn parse_page_index(search: &str, param: &str) -> usize {
    let raw = form_urlencoded::parse(strip_question_mark(search).as_bytes())
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned());

    let Some(raw) = raw else {
        return 0;
    };
    match raw.trim().parse::<usize>() {
        Ok(page) if page >= 1 => page - 1,
        _ => {
            debug!(param, value = %raw, "ignoring invalid page parameter");
            0
        }
    }
}

/// Returns `search` with `param` set to `index + 1`, or removed when `index`
/// is 0. Other parameters keep their exact encoding and order.
pub fn with_page_index(search: &str, param: &str, index: usize) -> String {
    let encoded = if index == 0 {
        None
    } else {
        let key: String = form_urlencoded::byte_serialize(param.as_bytes()).collect();
        Some(format!("{}={}", key, index.saturating_add(1)))
    };

    let mut segments = Vec::new();
    let mut placed = false;
    for segment in strip_question_mark(search).split('&') {
        if segment.is_empty() {
            continue;
        }
        if segment_key(segment).as_deref() == Some(param) {
            if let (false, Some(pair)) = (placed, &encoded) {
                segments.push(pair.clone());
                placed = true;
            }
            continue;
        }
        segments.push(segment.to_string());
    }
    if let (false, Some(pair)) = (placed, encoded) {
        segments.push(pair);
    }
    segments.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_page_means_first() {
        assert_eq!(parse_page_index("", PAGE_PARAM), 0);
        assert_eq!(parse_page_index("?q=acme", PAGE_PARAM), 0);
    }

    #[test]
    fn test_page_is_one_based() {
        assert_eq!(parse_page_index("page=4", PAGE_PARAM), 3);
        assert_eq!(parse_page_index("?sort=name&page=2", PAGE_PARAM), 1);
    }

    #[test]
    fn test_invalid_page_falls_back_to_first() {
        for search in ["page=0", "page=-3", "page=abc", "page=", "page=1.5"] {
            assert_eq!(parse_page_index(search, PAGE_PARAM), 0, "{search}");
        }
    }

    #[test]
    fn test_write_keeps_other_params_verbatim() {
        let search = "q=ACME%20Corp&tab=open+now";
        assert_eq!(
            with_page_index(search, PAGE_PARAM, 3),
            "q=ACME%20Corp&tab=open+now&page=4"
        );
        assert_eq!(
            with_page_index("a=1&page=9&b=2", PAGE_PARAM, 1),
            "a=1&page=2&b=2"
        );
    }

    #[test]
    fn test_first_page_drops_param() {
        assert_eq!(with_page_index("a=1&page=9&b=2", PAGE_PARAM, 0), "a=1&b=2");
        assert_eq!(with_page_index("page=3", PAGE_PARAM, 0), "");
    }

    #[test]
    fn test_duplicate_params_collapse() {
        assert_eq!(with_page_index("page=2&x=1&page=5", PAGE_PARAM, 6), "page=7&x=1");
    }

    #[test]
    fn test_round_trip_for_all_small_indices() {
        for index in 0..50 {
            let search = with_page_index("view=grid", PAGE_PARAM, index);
            assert_eq!(parse_page_index(&search, PAGE_PARAM), index);
        }
    }

    #[test]
    fn test_adapter_writes_through_history() {
        let location = MemoryLocation::new("?view=grid");
        let sync = PageSyncAdapter::new(location.clone());

        sync.write_page_index(2);
        sync.write_page_index(2);
        assert_eq!(location.len(), 2, "unchanged write adds no entry");
        assert_eq!(location.search(), "view=grid&page=3");

        assert!(location.back());
        assert_eq!(sync.read_page_index(), 0);
        assert!(location.forward());
        assert_eq!(sync.read_page_index(), 2);
    }

    #[test]
    fn test_custom_param_and_replace_mode() {
        let location = MemoryLocation::new("");
        let sync = PageSyncAdapter::new(location.clone())
            .with_param("p")
            .with_history_mode(HistoryMode::Replace);
        sync.write_page_index(4);
        assert_eq!(location.search(), "p=5");
        assert_eq!(location.len(), 1);
        assert_eq!(sync.param(), "p");
    }
}
