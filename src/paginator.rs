//! Pagination control: page math and the rendered page indicator.
//!
//! This component only tracks which page is shown and how many pages exist.
//! It does not hold the rows themselves; [`crate::table::Table`] uses it to
//! slice its row model and to render the control below the table body.

use crate::key::{self, Binding, KeyMap as KeyMapTrait};
use bubbletea_rs::{KeyMsg, Msg};
use crossterm::event::KeyCode;

/// How the page indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Type {
    /// Page numbers, e.g. `"2/5"`.
    #[default]
    Arabic,
    /// One dot per page, e.g. `"○ • ○ ○ ○"`.
    Dots,
}

/// Key bindings for moving between pages.
#[derive(Debug, Clone)]
pub struct PaginatorKeyMap {
    /// Previous page. Default: PageUp, Left, `h`.
    pub prev_page: Binding,
    /// Next page. Default: PageDown, Right, `l`.
    pub next_page: Binding,
    /// First page. Default: Home.
    pub first_page: Binding,
    /// Last page. Default: End.
    pub last_page: Binding,
}

impl Default for PaginatorKeyMap {
    fn default() -> Self {
        Self {
            prev_page: Binding::new(vec![KeyCode::PageUp, KeyCode::Left, KeyCode::Char('h')])
                .with_help("←/h", "prev page"),
            next_page: Binding::new(vec![KeyCode::PageDown, KeyCode::Right, KeyCode::Char('l')])
                .with_help("→/l", "next page"),
            first_page: Binding::new(vec![KeyCode::Home]).with_help("home", "first page"),
            last_page: Binding::new(vec![KeyCode::End]).with_help("end", "last page"),
        }
    }
}

impl KeyMapTrait for PaginatorKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.prev_page, &self.next_page]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![
            vec![&self.prev_page, &self.next_page],
            vec![&self.first_page, &self.last_page],
        ]
    }
}

/// A page navigation intent decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageIntent {
    /// Go one page back.
    Prev,
    /// Go one page forward.
    Next,
    /// Jump to the first page.
    First,
    /// Jump to the last page.
    Last,
}

/// Returns the number of pages needed for `items` rows at `per_page` rows each.
///
/// Zero items still make one (empty) page.
///
/// ```rust
/// use datagrid_widgets::paginator::page_count_for;
///
/// assert_eq!(page_count_for(25, 10), 3);
/// assert_eq!(page_count_for(30, 10), 3);
/// assert_eq!(page_count_for(0, 10), 1);
/// ```
pub fn page_count_for(items: usize, per_page: usize) -> usize {
    if items == 0 {
        1
    } else {
        items.div_ceil(per_page.max(1))
    }
}

/// Pagination state and view.
///
/// ```rust
/// use datagrid_widgets::paginator::Model;
///
/// let mut paginator = Model::new().with_per_page(10).with_total_items(25);
/// assert_eq!(paginator.total_pages, 3);
///
/// paginator.set_page(7); // clamped
/// assert_eq!(paginator.page, 2);
/// assert_eq!(paginator.slice_bounds(25), (20, 25));
/// assert_eq!(paginator.view(), "3/3");
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    /// Indicator style.
    pub paginator_type: Type,
    /// Current page, 0-based.
    pub page: usize,
    /// Rows per page, at least 1.
    pub per_page: usize,
    /// Number of pages, at least 1.
    pub total_pages: usize,
    /// Marker for the current page in dots mode.
    pub active_dot: String,
    /// Marker for other pages in dots mode.
    pub inactive_dot: String,
    /// Format for arabic mode; the first `%d` is the 1-based page, the second
    /// the page count.
    pub arabic_format: String,
    /// Key bindings.
    pub keymap: PaginatorKeyMap,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            paginator_type: Type::default(),
            page: 0,
            per_page: 1,
            total_pages: 1,
            active_dot: "•".to_string(),
            inactive_dot: "○".to_string(),
            arabic_format: "%d/%d".to_string(),
            keymap: PaginatorKeyMap::default(),
        }
    }
}

impl Model {
    /// Creates a paginator on page 0 with one row per page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets rows per page (builder). Values below 1 become 1.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Sets the page count from a row count (builder).
    pub fn with_total_items(mut self, items: usize) -> Self {
        self.set_total_items(items);
        self
    }

    /// Sets the indicator style (builder).
    pub fn with_type(mut self, paginator_type: Type) -> Self {
        self.paginator_type = paginator_type;
        self
    }

    /// Sets the page count directly, re-clamping the current page.
    pub fn set_total_pages(&mut self, pages: usize) {
        self.total_pages = pages.max(1);
        self.clamp_page();
    }

    /// Derives the page count from a row count, re-clamping the current page.
    pub fn set_total_items(&mut self, items: usize) {
        self.total_pages = page_count_for(items, self.per_page);
        self.clamp_page();
    }

    /// Moves to `page`, clamped into `[0, total_pages - 1]`. Returns the stored page.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = page.min(self.last_page_index());
        self.page
    }

    /// Index of the last page.
    pub fn last_page_index(&self) -> usize {
        self.total_pages.saturating_sub(1)
    }

    fn clamp_page(&mut self) {
        if self.page > self.last_page_index() {
            self.page = self.last_page_index();
        }
    }

    /// Start (inclusive) and end (exclusive) indices of the current page
    /// within a sequence of `length` rows.
    pub fn slice_bounds(&self, length: usize) -> (usize, usize) {
        let start = (self.page * self.per_page).min(length);
        let end = (start + self.per_page).min(length);
        (start, end)
    }

    /// Number of rows shown on the current page.
    pub fn items_on_page(&self, total_items: usize) -> usize {
        let (start, end) = self.slice_bounds(total_items);
        end - start
    }

    /// Goes back one page; no-op on the first page.
    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Goes forward one page; no-op on the last page.
    pub fn next_page(&mut self) {
        if !self.on_last_page() {
            self.page += 1;
        }
    }

    /// True on page 0.
    pub fn on_first_page(&self) -> bool {
        self.page == 0
    }

    /// True on the last page.
    pub fn on_last_page(&self) -> bool {
        self.page == self.last_page_index()
    }

    /// Whether the control should be drawn at all.
    ///
    /// A single page has nothing to navigate, so the control is left out
    /// entirely rather than shown disabled.
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }

    /// Decodes a key press into a page intent without applying it.
    pub fn intent(&self, msg: &Msg) -> Option<PageIntent> {
        let key_msg = msg.downcast_ref::<KeyMsg>()?;
        if self.keymap.next_page.matches(key_msg) {
            Some(PageIntent::Next)
        } else if self.keymap.prev_page.matches(key_msg) {
            Some(PageIntent::Prev)
        } else if self.keymap.first_page.matches(key_msg) {
            Some(PageIntent::First)
        } else if self.keymap.last_page.matches(key_msg) {
            Some(PageIntent::Last)
        } else {
            None
        }
    }

    /// Applies page key presses directly to this paginator.
    pub fn update(&mut self, msg: &Msg) {
        match self.intent(msg) {
            Some(PageIntent::Next) => self.next_page(),
            Some(PageIntent::Prev) => self.prev_page(),
            Some(PageIntent::First) => self.page = 0,
            Some(PageIntent::Last) => self.page = self.last_page_index(),
            None => {}
        }
    }

    /// Renders the indicator.
    pub fn view(&self) -> String {
        match self.paginator_type {
            Type::Arabic => self.arabic_view(),
            Type::Dots => self.dots_view(),
        }
    }

    fn arabic_view(&self) -> String {
        self.arabic_format
            .replacen("%d", &(self.page + 1).to_string(), 1)
            .replacen("%d", &self.total_pages.to_string(), 1)
    }

    fn dots_view(&self) -> String {
        (0..self.total_pages)
            .map(|i| {
                if i == self.page {
                    self.active_dot.as_str()
                } else {
                    self.inactive_dot.as_str()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Msg {
        Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_page_count_rounds_up() {
        let p = Model::new().with_per_page(10).with_total_items(25);
        assert_eq!(p.total_pages, 3);
        assert!(p.is_visible());

        let single = Model::new().with_per_page(10).with_total_items(10);
        assert_eq!(single.total_pages, 1);
        assert!(!single.is_visible());
    }

    #[test]
    fn test_last_page_slice_is_partial() {
        let mut p = Model::new().with_per_page(10).with_total_items(25);
        p.set_page(2);
        assert_eq!(p.slice_bounds(25), (20, 25));
        assert_eq!(p.items_on_page(25), 5);
    }

    #[test]
    fn test_shrinking_total_clamps_page() {
        let mut p = Model::new().with_per_page(10).with_total_items(100);
        p.set_page(9);
        p.set_total_items(15);
        assert_eq!(p.page, 1);
        p.set_total_items(0);
        assert_eq!(p.page, 0);
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn test_keys_move_between_pages() {
        let mut p = Model::new().with_per_page(5).with_total_items(20);
        p.update(&key(KeyCode::Right));
        p.update(&key(KeyCode::Char('l')));
        assert_eq!(p.page, 2);
        p.update(&key(KeyCode::End));
        assert_eq!(p.page, 3);
        p.update(&key(KeyCode::Right));
        assert_eq!(p.page, 3);
        p.update(&key(KeyCode::Home));
        assert!(p.on_first_page());
        assert_eq!(p.intent(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_views() {
        let mut p = Model::new().with_per_page(10).with_total_items(50);
        p.set_page(1);
        assert_eq!(p.view(), "2/5");
        p.paginator_type = Type::Dots;
        assert_eq!(p.view(), "○ • ○ ○ ○");
    }
}
