#![warn(missing_docs)]

//! # datagrid-widgets
//!
//! Data-grid and infinite option list components for
//! [bubbletea-rs](https://github.com/joshka/bubbletea-rs) dashboards.
//!
//! ## Overview
//!
//! Two independent controllers sit at the core of this crate:
//!
//! - [`table::Table`] owns sorting, filtering and pagination for a typed row
//!   set, either slicing pages itself (client mode) or rendering whatever page
//!   the caller fetched (server mode). Its page index can be mirrored into a
//!   `page` query parameter through [`page_sync::PageSyncAdapter`].
//! - [`infinite::InfiniteList`] loads a remote option list one page at a time,
//!   guarded so that at most one fetch is in flight and re-opening never
//!   refetches a cached first page.
//!
//! Render adapters turn them into terminal views the Elm Architecture way,
//! with `update(msg)` and `view()`:
//!
//! - [`table::Table::view`] draws the header with sort indicators, the body
//!   (or a loading skeleton) and a pagination line built on [`paginator`].
//! - [`select::Model`] wraps an [`infinite::InfiniteList`] in a popover whose
//!   scroll window is a [`viewport::Model`] watched by a
//!   [`sentinel::ViewportSentinel`].
//!
//! ## Quick start
//!
//! ```rust
//! use datagrid_widgets::prelude::*;
//!
//! struct Campaign {
//!     advertiser: String,
//!     spend: f64,
//! }
//!
//! impl Row for Campaign {
//!     fn fields() -> &'static [&'static str] {
//!         &["advertiser", "spend"]
//!     }
//!
//!     fn cell(&self, field: &str) -> CellValue {
//!         match field {
//!             "advertiser" => self.advertiser.as_str().into(),
//!             "spend" => self.spend.into(),
//!             _ => CellValue::Null,
//!         }
//!     }
//! }
//!
//! let mut table = Table::new(
//!     vec![
//!         Column::field("advertiser", "Advertiser"),
//!         Column::field("spend", "Spend"),
//!     ],
//!     TableOptions::new().with_page_size(10),
//! )
//! .unwrap();
//!
//! table.set_rows(
//!     (1..=25)
//!         .map(|n| Campaign { advertiser: format!("Advertiser {n}"), spend: n as f64 })
//!         .collect(),
//! );
//! table.attach_page_sync(PageSyncAdapter::new(MemoryLocation::new("page=3")));
//!
//! assert_eq!(table.page_count(), 3);
//! assert_eq!(table.page_index(), 2);
//! assert_eq!(table.visible_rows().count(), 5);
//! ```
//!
//! ## Logging
//!
//! Components log through [`tracing`] (ignored intents and query fallbacks at
//! `debug`, row model recomputation at `trace`, failed option fetches at
//! `warn`). The crate never installs a subscriber.

pub mod error;
pub mod infinite;
pub mod key;
pub mod page_sync;
pub mod paginator;
pub mod select;
pub mod sentinel;
pub mod spinner;
pub mod table;
pub mod viewport;

pub use error::{ConfigError, FetchError, TableError};
pub use infinite::{InfiniteList, LoadState, OptionItem, OptionPageMsg, PageFetcher};
pub use key::{Binding, KeyMap};
pub use page_sync::{HistoryMode, Location, MemoryLocation, PageSyncAdapter};
pub use paginator::Model as Paginator;
pub use select::{Model as Select, SelectKeyMap, SelectOptions, SelectStyles};
pub use sentinel::ViewportSentinel;
pub use spinner::Model as Spinner;
pub use table::Table;
pub use viewport::Model as Viewport;

/// Everything needed to build a table or a select with one `use`.
///
/// ```rust
/// use datagrid_widgets::prelude::*;
///
/// let options = SelectOptions::default().with_popup_height(6);
/// let select = Select::new(
///     |_page: u32| async { Ok::<_, FetchError>(Vec::<OptionItem>::new()) },
///     options,
/// );
/// assert!(!select.is_open());
/// ```
pub mod prelude {
    pub use crate::error::{ConfigError, FetchError, TableError};
    pub use crate::infinite::{InfiniteList, LoadState, OptionItem, OptionPageMsg, PageFetcher};
    pub use crate::key::{Binding, KeyMap};
    pub use crate::page_sync::{HistoryMode, Location, MemoryLocation, PageSyncAdapter};
    pub use crate::paginator::Model as Paginator;
    pub use crate::select::{Model as Select, SelectKeyMap, SelectOptions, SelectStyles};
    pub use crate::sentinel::ViewportSentinel;
    pub use crate::spinner::Model as Spinner;
    pub use crate::table::{
        CellValue, Column, FilterKind, PaginationMode, Row, SortDescriptor, SortDirection,
        SortIntent, SortMode, Table, TableOptions, TableStyles,
    };
    pub use crate::viewport::Model as Viewport;
}
