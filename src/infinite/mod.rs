//! Infinite-scroll option list.
//!
//! [`InfiniteList`] loads a remote, single-select option list one page at a
//! time. The first page is fetched when the popup first opens; every later
//! page is requested when the popover reports that its sentinel row came into
//! view (see [`crate::sentinel`]). Pages are numbered from 1, requested in
//! strictly increasing order, and never more than one at a time.
//!
//! Fetches run as bubbletea [`Cmd`]s. A command resolves to an
//! [`OptionPageMsg`] tagged with the list's id, which the owner feeds back
//! through [`InfiniteList::update`]:
//!
//! ```rust
//! use datagrid_widgets::error::FetchError;
//! use datagrid_widgets::infinite::{InfiniteList, OptionItem};
//!
//! let mut list = InfiniteList::new(|page: u32| async move {
//!     Ok::<_, FetchError>(
//!         (1..=3)
//!             .map(|i| OptionItem::new(format!("{page}-{i}"), format!("Advertiser {page}.{i}")))
//!             .collect(),
//!     )
//! });
//!
//! let cmd = list.open().expect("first open fetches page 1");
//! if let Some(msg) = futures::executor::block_on(cmd) {
//!     list.update(&msg);
//! }
//! assert_eq!(list.items().len(), 3);
//!
//! // Reopening reuses the cached page.
//! list.close();
//! assert!(list.open().is_none());
//! ```

mod state;

pub use state::{LoadState, OptionCache, OptionItem};

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use bubbletea_rs::{Cmd, Msg};
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::FetchError;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Loads one page of options.
///
/// Implemented for any `Fn(u32) -> impl Future<Output = Result<Vec<OptionItem>,
/// FetchError>>`. Fetching the same page twice must be harmless, since a
/// failed page is simply requested again.
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetches page `page` (1-based).
    fn fetch(&self, page: u32) -> BoxFuture<'static, Result<Vec<OptionItem>, FetchError>>;
}

impl<F, Fut> PageFetcher for F
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<OptionItem>, FetchError>> + Send + 'static,
{
    fn fetch(&self, page: u32) -> BoxFuture<'static, Result<Vec<OptionItem>, FetchError>> {
        self(page).boxed()
    }
}

/// Result of one page fetch, addressed to the list that issued it.
#[derive(Debug, Clone)]
pub struct OptionPageMsg {
    /// Id of the issuing [`InfiniteList`].
    pub id: i64,
    /// 1-based page number.
    pub page: u32,
    /// Fetched items or the fetch failure.
    pub result: Result<Vec<OptionItem>, FetchError>,
}

/// Incrementally loaded, searchable single-select option list.
pub struct InfiniteList {
    id: i64,
    fetcher: Arc<dyn PageFetcher>,
    cache: OptionCache,
    state: LoadState,
    // State to go back to if the in-flight fetch fails.
    resume: LoadState,
    has_loaded_initial: bool,
    last_loaded_page: u32,
    open: bool,
    selected: Option<OptionItem>,
    // Fetch commands hold a `Weak` to this; once the list is dropped they
    // resolve to no message.
    alive: Arc<()>,
}

impl fmt::Debug for InfiniteList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfiniteList")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("items", &self.cache.len())
            .field("has_more", &self.cache.has_more())
            .field("has_loaded_initial", &self.has_loaded_initial)
            .field("last_loaded_page", &self.last_loaded_page)
            .field("open", &self.open)
            .field("selected", &self.selected)
            .finish()
    }
}

impl InfiniteList {
    /// Creates a closed, empty list that loads pages through `fetcher`.
    pub fn new(fetcher: impl PageFetcher) -> Self {
        Self {
            id: next_id(),
            fetcher: Arc::new(fetcher),
            cache: OptionCache::default(),
            state: LoadState::Idle,
            resume: LoadState::Idle,
            has_loaded_initial: false,
            last_loaded_page: 0,
            open: false,
            selected: None,
            alive: Arc::new(()),
        }
    }

    /// Starts with `item` committed, e.g. a value restored from a form
    /// (builder). The item does not enter the cache.
    pub fn with_selected(mut self, item: OptionItem) -> Self {
        self.selected = Some(item);
        self
    }

    /// Opens the popup. Returns the page-1 fetch the first time only; a list
    /// whose first page is cached or in flight opens without fetching.
    pub fn open(&mut self) -> Option<Cmd> {
        self.open = true;
        if self.has_loaded_initial || self.state.is_loading() {
            return None;
        }
        Some(self.fetch(1))
    }

    /// Closes the popup. The cache and any in-flight fetch are kept.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Requests the next page when the sentinel row comes into view.
    ///
    /// Returns `None` unless a page is loaded, more may exist, nothing is in
    /// flight and at least one option is cached.
    pub fn on_sentinel_visible(&mut self) -> Option<Cmd> {
        if self.state != LoadState::Loaded || !self.cache.has_more() || self.cache.is_empty() {
            return None;
        }
        Some(self.fetch(self.last_loaded_page + 1))
    }

    fn fetch(&mut self, page: u32) -> Cmd {
        debug!(instance = self.id, page, "fetching option page");
        self.resume = self.state;
        self.state = LoadState::Loading { page };

        let id = self.id;
        let fetcher = Arc::clone(&self.fetcher);
        let alive = Arc::downgrade(&self.alive);
        Box::pin(async move {
            alive.upgrade()?;
            let result = fetcher.fetch(page).await;
            alive.upgrade()?;
            Some(Box::new(OptionPageMsg { id, page, result }) as Msg)
        })
    }

    /// Applies a fetched page. Returns true if `msg` was this list's
    /// [`OptionPageMsg`] for the page in flight; anything else is ignored.
    pub fn update(&mut self, msg: &Msg) -> bool {
        let Some(page_msg) = msg.downcast_ref::<OptionPageMsg>() else {
            return false;
        };
        if page_msg.id != self.id {
            return false;
        }
        if self.state != (LoadState::Loading { page: page_msg.page }) {
            debug!(instance = self.id, page = page_msg.page, "ignoring stale option page");
            return false;
        }

        match &page_msg.result {
            Ok(items) => {
                let added = self.cache.append(items.clone());
                self.has_loaded_initial = true;
                if self.cache.has_more() {
                    self.last_loaded_page = page_msg.page;
                    self.state = LoadState::Loaded;
                } else {
                    self.state = LoadState::Exhausted;
                }
                debug!(
                    instance = self.id,
                    page = page_msg.page,
                    added,
                    total = self.cache.len(),
                    "option page loaded"
                );
            }
            Err(err) => {
                warn!(
                    instance = self.id,
                    page = page_msg.page,
                    error = %err,
                    "option page fetch failed"
                );
                self.state = self.resume;
            }
        }
        true
    }

    /// Commits the cached option with `value` and closes the popup. The cache
    /// is kept so reopening shows the same options.
    ///
    /// Returns the committed option, or `None` (changing nothing) if no cached
    /// option has that value.
    pub fn select(&mut self, value: &str) -> Option<&OptionItem> {
        let Some(item) = self.cache.get(value).cloned() else {
            debug!(instance = self.id, value, "ignoring selection of unknown option");
            return None;
        };
        self.open = false;
        self.selected = Some(item);
        self.selected.as_ref()
    }

    /// Clears the committed option.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Cached options whose label contains `query`, ignoring case. An empty
    /// query returns every cached option.
    pub fn search(&self, query: &str) -> Vec<&OptionItem> {
        let needle = query.trim().to_lowercase();
        self.cache
            .items()
            .iter()
            .filter(|item| needle.is_empty() || item.label.to_lowercase().contains(&needle))
            .collect()
    }

    /// Unique id carried by this list's fetch messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Current load state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// True while a page fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// True while the popup is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Cached options in arrival order.
    pub fn items(&self) -> &[OptionItem] {
        self.cache.items()
    }

    /// False once an empty page has been received.
    pub fn has_more(&self) -> bool {
        self.cache.has_more()
    }

    /// Whether the first page has been loaded.
    pub fn has_loaded_initial(&self) -> bool {
        self.has_loaded_initial
    }

    /// Highest page appended to the cache, 0 before the first.
    pub fn last_loaded_page(&self) -> u32 {
        self.last_loaded_page
    }

    /// The committed option.
    pub fn selected(&self) -> Option<&OptionItem> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Calls = Arc<Mutex<Vec<u32>>>;

    /// A fetcher serving `sizes[page - 1]` items per page and recording calls.
    fn sized_pages(sizes: &'static [usize]) -> (impl PageFetcher, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&calls);
        let fetcher = move |page: u32| {
            log.lock().push(page);
            async move {
                let size = sizes.get(page as usize - 1).copied().unwrap_or(0);
                Ok::<_, FetchError>(
                    (0..size)
                        .map(|i| {
                            OptionItem::new(format!("{page}:{i}"), format!("Option {page}.{i}"))
                        })
                        .collect(),
                )
            }
        };
        (fetcher, calls)
    }

    async fn run(list: &mut InfiniteList, cmd: Option<Cmd>) -> bool {
        let cmd = cmd.expect("expected a fetch command");
        match cmd.await {
            Some(msg) => list.update(&msg),
            None => false,
        }
    }

    #[tokio::test]
    async fn test_scenario_c_two_pages_then_exhausted() {
        let (fetcher, calls) = sized_pages(&[20, 20, 0]);
        let mut list = InfiniteList::new(fetcher);

        let cmd = list.open();
        assert!(run(&mut list, cmd).await);
        assert_eq!(list.items().len(), 20);
        assert_eq!(list.state(), LoadState::Loaded);

        let cmd = list.on_sentinel_visible();
        assert!(run(&mut list, cmd).await);
        let cmd = list.on_sentinel_visible();
        assert!(run(&mut list, cmd).await);

        assert_eq!(list.items().len(), 40);
        assert!(!list.has_more());
        assert_eq!(list.state(), LoadState::Exhausted);
        assert!(list.on_sentinel_visible().is_none());
        assert_eq!(*calls.lock(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_scenario_d_reopen_uses_cache() {
        let (fetcher, calls) = sized_pages(&[5, 5]);
        let mut list = InfiniteList::new(fetcher);

        let cmd = list.open();
        run(&mut list, cmd).await;
        let chosen = list.select("1:3").cloned();
        assert_eq!(chosen, Some(OptionItem::new("1:3", "Option 1.3")));
        assert!(!list.is_open());

        assert!(list.open().is_none());
        assert!(list.is_open());
        assert_eq!(list.items().len(), 5);
        assert_eq!(list.selected().map(|i| i.label.as_str()), Some("Option 1.3"));
        assert_eq!(*calls.lock(), vec![1]);
    }

    #[tokio::test]
    async fn test_double_open_fetches_once() {
        let (fetcher, calls) = sized_pages(&[3]);
        let mut list = InfiniteList::new(fetcher);
        let first = list.open();
        assert!(list.open().is_none());
        list.close();
        assert!(list.open().is_none(), "page 1 is still in flight");
        run(&mut list, first).await;
        assert_eq!(*calls.lock(), vec![1]);
    }

    #[tokio::test]
    async fn test_sentinel_ignored_while_in_flight_or_empty() {
        let (fetcher, calls) = sized_pages(&[4, 4]);
        let mut list = InfiniteList::new(fetcher);
        assert!(list.on_sentinel_visible().is_none(), "nothing loaded yet");

        let cmd = list.open();
        run(&mut list, cmd).await;
        let next = list.on_sentinel_visible();
        assert!(next.is_some());
        assert_eq!(list.state(), LoadState::Loading { page: 2 });
        assert!(list.on_sentinel_visible().is_none());
        run(&mut list, next).await;
        assert_eq!(*calls.lock(), vec![1, 2]);
        assert_eq!(list.last_loaded_page(), 2);
    }

    #[tokio::test]
    async fn test_empty_first_page_exhausts_without_items() {
        let (fetcher, _) = sized_pages(&[]);
        let mut list = InfiniteList::new(fetcher);
        let cmd = list.open();
        run(&mut list, cmd).await;
        assert!(list.has_loaded_initial());
        assert!(list.items().is_empty());
        assert_eq!(list.state(), LoadState::Exhausted);
        list.close();
        assert!(list.open().is_none());
    }

    #[tokio::test]
    async fn test_failed_page_is_retried() {
        let attempts = Arc::new(Mutex::new(0_u32));
        let counter = Arc::clone(&attempts);
        let mut list = InfiniteList::new(move |page: u32| {
            let attempt = {
                let mut n = counter.lock();
                *n += 1;
                *n
            };
            async move {
                // Page 2 fails on its first attempt.
                if page == 2 && attempt == 2 {
                    return Err(FetchError::request("connection reset"));
                }
                Ok(vec![OptionItem::new(format!("v{page}"), format!("Page {page}"))])
            }
        });

        let cmd = list.open();
        run(&mut list, cmd).await;

        let cmd = list.on_sentinel_visible();
        assert!(run(&mut list, cmd).await);
        assert_eq!(list.state(), LoadState::Loaded);
        assert_eq!(list.last_loaded_page(), 1);
        assert_eq!(list.items().len(), 1);
        assert!(list.has_more());

        let cmd = list.on_sentinel_visible();
        run(&mut list, cmd).await;
        assert_eq!(list.last_loaded_page(), 2);
        assert_eq!(list.items().len(), 2);
        assert_eq!(*attempts.lock(), 3);
    }

    #[tokio::test]
    async fn test_failed_first_page_retries_on_next_open() {
        let attempts = Arc::new(Mutex::new(0_u32));
        let counter = Arc::clone(&attempts);
        let mut list = InfiniteList::new(move |_page: u32| {
            let first = {
                let mut n = counter.lock();
                *n += 1;
                *n == 1
            };
            async move {
                if first {
                    Err(FetchError::decode("unexpected payload"))
                } else {
                    Ok(vec![OptionItem::new("a", "A")])
                }
            }
        });

        let cmd = list.open();
        run(&mut list, cmd).await;
        assert_eq!(list.state(), LoadState::Idle);
        assert!(!list.has_loaded_initial());

        list.close();
        let cmd = list.open();
        assert!(cmd.is_some());
        run(&mut list, cmd).await;
        assert_eq!(list.items().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_list_yields_no_message() {
        let (fetcher, _) = sized_pages(&[3]);
        let mut list = InfiniteList::new(fetcher);
        let cmd = list.open().unwrap();
        drop(list);
        assert!(cmd.await.is_none());
    }

    #[tokio::test]
    async fn test_messages_for_other_instances_are_ignored() {
        let (fetcher_a, _) = sized_pages(&[2]);
        let (fetcher_b, _) = sized_pages(&[2]);
        let mut a = InfiniteList::new(fetcher_a);
        let mut b = InfiniteList::new(fetcher_b);
        assert_ne!(a.id(), b.id());

        let cmd = a.open().unwrap();
        let _ = b.open();
        let msg = cmd.await.unwrap();
        assert!(!b.update(&msg));
        assert!(b.items().is_empty());
        assert!(a.update(&msg));

        // A replayed message no longer matches the in-flight page.
        assert!(!a.update(&msg));
        assert_eq!(a.items().len(), 2);

        let unrelated: Msg = Box::new("tick");
        assert!(!a.update(&unrelated));
    }

    #[tokio::test]
    async fn test_duplicate_values_across_pages() {
        let mut list = InfiniteList::new(|page: u32| async move {
            let values: &[&str] = match page {
                1 => &["a", "b", "c"],
                2 => &["c", "d"],
                _ => &[],
            };
            Ok::<_, FetchError>(
                values
                    .iter()
                    .map(|v| OptionItem::new(*v, v.to_uppercase()))
                    .collect(),
            )
        });
        let cmd = list.open();
        run(&mut list, cmd).await;
        let cmd = list.on_sentinel_visible();
        run(&mut list, cmd).await;
        let values: Vec<_> = list.items().iter().map(|i| i.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_search_and_unknown_selection() {
        let mut list = InfiniteList::new(|_page: u32| async {
            Ok::<_, FetchError>(vec![
                OptionItem::new("1", "ACME Corp"),
                OptionItem::new("2", "Globex"),
                OptionItem::new("3", "Acme Labs"),
            ])
        });
        let cmd = list.open();
        run(&mut list, cmd).await;

        let hits: Vec<_> = list.search(" acme ").iter().map(|i| i.value.clone()).collect();
        assert_eq!(hits, vec!["1", "3"]);
        assert_eq!(list.search("").len(), 3);

        assert!(list.select("42").is_none());
        assert!(list.is_open());
        assert!(list.selected().is_none());
    }
}
