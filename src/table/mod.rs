//! Data-grid controller: sorting, filtering and pagination over typed rows.
//!
//! [`Table`] is the single source of truth for `{sorting, column_filters,
//! global_filter, pagination}` and the derived [`RowModel`]. Every mutation is
//! one `&mut self` call that recomputes the row model before it returns, so a
//! renderer never sees a half-applied state.
//!
//! Two pagination modes are supported:
//! - [`PaginationMode::Client`]: the table owns every row and slices pages.
//! - [`PaginationMode::Server`]: the caller supplies one page of rows and the
//!   remote total via [`Table::set_server_page`], and refetches when the
//!   `on_*_change` listeners fire.
//!
//! With a [`PageSyncAdapter`] attached the page index lives in the `page`
//! query parameter; see [`crate::page_sync`].
//!
//! ```rust
//! use datagrid_widgets::table::{CellValue, Column, Row, SortIntent, Table, TableOptions};
//!
//! struct Campaign { advertiser: &'static str, clicks: i64 }
//!
//! impl Row for Campaign {
//!     fn fields() -> &'static [&'static str] { &["advertiser", "clicks"] }
//!     fn cell(&self, field: &str) -> CellValue {
//!         match field {
//!             "advertiser" => self.advertiser.into(),
//!             "clicks" => self.clicks.into(),
//!             _ => CellValue::Null,
//!         }
//!     }
//! }
//!
//! let mut table = Table::new(
//!     vec![Column::field("advertiser", "Advertiser"), Column::field("clicks", "Clicks")],
//!     TableOptions::new().with_page_size(2),
//! )
//! .unwrap();
//! table.set_rows(vec![
//!     Campaign { advertiser: "ACME Corp", clicks: 12 },
//!     Campaign { advertiser: "Globex", clicks: 40 },
//!     Campaign { advertiser: "Initech", clicks: 7 },
//! ]);
//!
//! table.set_sort("clicks", SortIntent::Toggle).unwrap();
//! let first: Vec<_> = table.visible_rows().map(|c| c.advertiser).collect();
//! assert_eq!(first, vec!["Initech", "ACME Corp"]);
//! assert_eq!(table.page_count(), 2);
//! ```

mod column;
mod render;
mod row_model;
mod state;

pub use column::{Accessor, CellValue, Column, ComputeFn, FilterFn, FilterKind, Row};
pub use render::TableStyles;
pub use row_model::RowModel;
pub use state::{
    PaginationMode, PaginationState, SortDescriptor, SortDirection, SortIntent, SortMode,
    TableOptions, TableState, GLOBAL_FILTER_ID,
};

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use bubbletea_rs::Msg;
use tracing::debug;

use crate::error::{ConfigError, TableError};
use crate::page_sync::PageSyncAdapter;
use crate::paginator::{self, PageIntent};

type Listener<T> = Box<dyn FnMut(&T) + Send>;

#[derive(Default)]
struct Listeners {
    sorting: Vec<Listener<Vec<SortDescriptor>>>,
    column_filters: Vec<Listener<BTreeMap<String, CellValue>>>,
    global_filter: Vec<Listener<String>>,
    pagination: Vec<Listener<PaginationState>>,
}

/// Who decides the page index of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageSource {
    /// A page intent; the clamped result is written through to the location.
    Intent,
    /// The location, when attached. The index is re-read from it and clamped
    /// for display only, never written back.
    Location,
}

/// The data-grid controller.
pub struct Table<R> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    options: TableOptions,
    state: TableState,
    row_model: RowModel,
    paginator: paginator::Model,
    loading: bool,
    page_sync: Option<PageSyncAdapter>,
    listeners: Listeners,
    styles: TableStyles,
}

impl<R> fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("options", &self.options)
            .field("state", &self.state)
            .field("row_model", &self.row_model)
            .field("loading", &self.loading)
            .field("page_sync", &self.page_sync)
            .finish()
    }
}

fn validate<R: Row>(columns: &[Column<R>]) -> Result<(), ConfigError> {
    if columns.is_empty() {
        return Err(ConfigError::EmptyColumns);
    }
    let fields = R::fields();
    let mut seen = HashSet::new();
    for column in columns {
        if column.id == GLOBAL_FILTER_ID {
            return Err(ConfigError::ReservedColumnId(column.id.clone()));
        }
        if !seen.insert(column.id.as_str()) {
            return Err(ConfigError::DuplicateColumn(column.id.clone()));
        }
        if let Accessor::Field(field) = &column.accessor {
            if !fields.contains(&field.as_str()) {
                return Err(ConfigError::UnknownField {
                    column: column.id.clone(),
                    field: field.clone(),
                });
            }
        }
    }
    Ok(())
}

impl<R: Row> Table<R> {
    /// Builds a table, validating the column schema against `R` once.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty or duplicated column set, the
    /// reserved global-filter id, a field accessor `R` does not declare, a
    /// zero page size, or initial sorting/filters naming unknown columns.
    pub fn new(columns: Vec<Column<R>>, options: TableOptions) -> Result<Self, ConfigError> {
        validate(&columns)?;
        if options.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        let known = |id: &str| columns.iter().any(|c| c.id == id);
        if let Some(d) = options.initial_sorting.iter().find(|d| !known(d.column_id.as_str())) {
            return Err(ConfigError::UnknownColumn(d.column_id.clone()));
        }
        if let Some(id) = options.initial_filters.keys().find(|id| !known(id.as_str())) {
            return Err(ConfigError::UnknownColumn(id.clone()));
        }

        let mut sorting: Vec<SortDescriptor> = Vec::new();
        for d in &options.initial_sorting {
            if !sorting.iter().any(|s| s.column_id == d.column_id) {
                sorting.push(d.clone());
            }
        }
        if options.sort_mode == SortMode::Single {
            sorting.truncate(1);
        }

        let state = TableState {
            sorting,
            column_filters: options
                .initial_filters
                .iter()
                .filter(|(_, v)| !v.is_blank())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            global_filter: options.initial_global_filter.trim().to_string(),
            pagination: PaginationState {
                page_index: 0,
                page_size: options.page_size,
                total_count: None,
            },
        };

        let paginator = paginator::Model::new().with_per_page(options.page_size);
        let mut table = Self {
            columns,
            rows: Vec::new(),
            options,
            state,
            row_model: RowModel::default(),
            paginator,
            loading: false,
            page_sync: None,
            listeners: Listeners::default(),
            styles: TableStyles::default(),
        };
        table.recompute();
        Ok(table)
    }

    /// Replaces the render styles (builder).
    pub fn with_styles(mut self, styles: TableStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Sets the pagination indicator style (builder).
    pub fn with_paginator_type(mut self, paginator_type: paginator::Type) -> Self {
        self.paginator.paginator_type = paginator_type;
        self
    }

    fn recompute(&mut self) {
        self.row_model =
            row_model::compute(&self.rows, &self.columns, &mut self.state, &self.options);
        self.paginator.set_total_pages(self.row_model.page_count());
        self.paginator.set_page(self.state.pagination.page_index);
    }

    /// Applies `change` as one transition: recompute, sync the page with the
    /// location, then notify listeners of whatever actually changed.
    fn transition(&mut self, source: PageSource, change: impl FnOnce(&mut TableState)) {
        let before = self.state.clone();
        change(&mut self.state);
        if source == PageSource::Location {
            if let Some(sync) = &self.page_sync {
                self.state.pagination.page_index = sync.read_page_index();
            }
        }
        self.recompute();

        if source == PageSource::Intent {
            let page_index = self.state.pagination.page_index;
            let read_back = self.page_sync.as_ref().map(|sync| {
                sync.write_page_index(page_index);
                sync.read_page_index()
            });
            if let Some(index) = read_back.filter(|&index| index != page_index) {
                self.state.pagination.page_index = index;
                self.recompute();
            }
        }

        self.notify(&before);
    }

    fn notify(&mut self, before: &TableState) {
        if before.sorting != self.state.sorting {
            for listener in &mut self.listeners.sorting {
                listener(&self.state.sorting);
            }
        }
        if before.column_filters != self.state.column_filters {
            for listener in &mut self.listeners.column_filters {
                listener(&self.state.column_filters);
            }
        }
        if before.global_filter != self.state.global_filter {
            for listener in &mut self.listeners.global_filter {
                listener(&self.state.global_filter);
            }
        }
        if before.pagination.page_index != self.state.pagination.page_index {
            for listener in &mut self.listeners.pagination {
                listener(&self.state.pagination);
            }
        }
    }

    fn column(&self, column_id: &str) -> Result<&Column<R>, TableError> {
        self.columns
            .iter()
            .find(|c| c.id == column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))
    }

    // ---- intents -------------------------------------------------------

    /// Changes the sort state of one column.
    ///
    /// [`SortIntent::Toggle`] cycles `none -> asc -> desc -> none`. In
    /// [`SortMode::Multi`] other columns keep their descriptors and a newly
    /// sorted column gets the lowest precedence; in [`SortMode::Single`] the
    /// other descriptors are dropped. Non-sortable columns are ignored.
    ///
    /// # Errors
    ///
    /// [`TableError::UnknownColumn`] if no column has `column_id`.
    pub fn set_sort(&mut self, column_id: &str, intent: SortIntent) -> Result<(), TableError> {
        if !self.column(column_id)?.sortable {
            debug!(column = %column_id, "ignoring sort on non-sortable column");
            return Ok(());
        }
        let single = self.options.sort_mode == SortMode::Single;
        self.transition(PageSource::Location, |state| {
            let current = state.sort_direction(column_id);
            let next = match intent {
                SortIntent::Toggle => SortDirection::cycle(current),
                SortIntent::Set(direction) => direction,
            };
            if single {
                state.sorting.retain(|d| d.column_id == column_id);
            }
            match (state.sort_precedence(column_id), next) {
                (Some(i), Some(direction)) => state.sorting[i].direction = direction,
                (Some(i), None) => {
                    state.sorting.remove(i);
                }
                (None, Some(direction)) => state.sorting.push(SortDescriptor {
                    column_id: column_id.to_string(),
                    direction,
                }),
                (None, None) => {}
            }
        });
        Ok(())
    }

    /// Removes every sort descriptor.
    pub fn clear_sorting(&mut self) {
        self.transition(PageSource::Location, |state| state.sorting.clear());
    }

    /// Sets or clears (blank value) the filter of one column and returns to
    /// the first page.
    ///
    /// # Errors
    ///
    /// [`TableError::UnknownColumn`] if no column has `column_id`.
    pub fn set_column_filter(
        &mut self,
        column_id: &str,
        value: impl Into<CellValue>,
    ) -> Result<(), TableError> {
        if !self.column(column_id)?.filterable {
            debug!(column = %column_id, "ignoring filter on non-filterable column");
            return Ok(());
        }
        let value = value.into();
        self.transition(PageSource::Intent, |state| {
            if value.is_blank() {
                state.column_filters.remove(column_id);
            } else {
                state.column_filters.insert(column_id.to_string(), value);
            }
            state.pagination.page_index = 0;
        });
        Ok(())
    }

    /// Sets the cross-column text filter and returns to the first page.
    /// Whitespace-only text clears it.
    pub fn set_global_filter(&mut self, text: &str) {
        let text = text.trim().to_string();
        self.transition(PageSource::Intent, |state| {
            state.global_filter = text;
            state.pagination.page_index = 0;
        });
    }

    /// Clears all column filters and the global filter.
    pub fn reset_filters(&mut self) {
        self.transition(PageSource::Intent, |state| {
            state.column_filters.clear();
            state.global_filter.clear();
            state.pagination.page_index = 0;
        });
    }

    /// Moves to `index`, clamped into `[0, page_count - 1]`, and returns the
    /// stored index.
    pub fn set_page(&mut self, index: usize) -> usize {
        self.transition(PageSource::Intent, |state| state.pagination.page_index = index);
        self.state.pagination.page_index
    }

    /// Goes forward one page.
    pub fn next_page(&mut self) -> usize {
        self.set_page(self.state.pagination.page_index.saturating_add(1))
    }

    /// Goes back one page.
    pub fn prev_page(&mut self) -> usize {
        self.set_page(self.state.pagination.page_index.saturating_sub(1))
    }

    /// Jumps to the first page.
    pub fn first_page(&mut self) -> usize {
        self.set_page(0)
    }

    /// Jumps to the last page.
    pub fn last_page(&mut self) -> usize {
        self.set_page(self.page_count().saturating_sub(1))
    }

    /// Replaces the source rows (client mode).
    ///
    /// The page index is re-derived from the location when one is attached
    /// and clamped for display; the location keeps the requested page.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.loading = false;
        self.transition(PageSource::Location, |_| {});
    }

    /// Replaces the current page of rows and the remote total (server mode).
    pub fn set_server_page(&mut self, rows: Vec<R>, total_count: usize) {
        self.rows = rows;
        self.loading = false;
        self.transition(PageSource::Location, |state| {
            state.pagination.total_count = Some(total_count);
        });
    }

    /// Marks rows as being fetched; the body renders as a skeleton meanwhile.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Replaces the column schema.
    ///
    /// The new columns are validated like at construction. Sorting and filters
    /// on removed columns are dropped, and the table returns to the first page
    /// (writing through to the location) so a shrunken result set never shows
    /// an empty out-of-range page.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validation; the table is left unchanged.
    pub fn set_columns(&mut self, columns: Vec<Column<R>>) -> Result<(), ConfigError> {
        validate(&columns)?;
        self.columns = columns;
        let ids: HashSet<String> = self.columns.iter().map(|c| c.id.clone()).collect();
        self.transition(PageSource::Intent, |state| {
            state.sorting.retain(|d| ids.contains(&d.column_id));
            state.column_filters.retain(|id, _| ids.contains(id));
            state.pagination.page_index = 0;
        });
        Ok(())
    }

    /// Handles page navigation keys.
    pub fn update(&mut self, msg: &Msg) {
        match self.paginator.intent(msg) {
            Some(PageIntent::Next) => {
                self.next_page();
            }
            Some(PageIntent::Prev) => {
                self.prev_page();
            }
            Some(PageIntent::First) => {
                self.first_page();
            }
            Some(PageIntent::Last) => {
                self.last_page();
            }
            None => {}
        }
    }

    // ---- page sync -----------------------------------------------------

    /// Attaches a page sync adapter and reads the initial page from it.
    pub fn attach_page_sync(&mut self, sync: PageSyncAdapter) {
        self.page_sync = Some(sync);
        self.location_changed();
    }

    /// Detaches and returns the page sync adapter.
    pub fn detach_page_sync(&mut self) -> Option<PageSyncAdapter> {
        self.page_sync.take()
    }

    /// Re-reads the page after the location changed outside the table
    /// (browser back/forward, a pasted URL). Never writes back.
    pub fn location_changed(&mut self) {
        if self.page_sync.is_some() {
            self.transition(PageSource::Location, |_| {});
        }
    }

    // ---- listeners -----------------------------------------------------

    /// Called after the sort list changes.
    pub fn on_sorting_change(&mut self, f: impl FnMut(&Vec<SortDescriptor>) + Send + 'static) {
        self.listeners.sorting.push(Box::new(f));
    }

    /// Called after the column filters change.
    pub fn on_column_filters_change(
        &mut self,
        f: impl FnMut(&BTreeMap<String, CellValue>) + Send + 'static,
    ) {
        self.listeners.column_filters.push(Box::new(f));
    }

    /// Called after the global filter changes.
    pub fn on_global_filter_change(&mut self, f: impl FnMut(&String) + Send + 'static) {
        self.listeners.global_filter.push(Box::new(f));
    }

    /// Called after the page index changes, whatever caused it.
    pub fn on_pagination_change(&mut self, f: impl FnMut(&PaginationState) + Send + 'static) {
        self.listeners.pagination.push(Box::new(f));
    }

    // ---- accessors -----------------------------------------------------

    /// Current state snapshot.
    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Sort descriptors in precedence order.
    pub fn sorting(&self) -> &[SortDescriptor] {
        &self.state.sorting
    }

    /// Page position.
    pub fn pagination(&self) -> &PaginationState {
        &self.state.pagination
    }

    /// Current page index, 0-based.
    pub fn page_index(&self) -> usize {
        self.state.pagination.page_index
    }

    /// Number of pages, at least 1.
    pub fn page_count(&self) -> usize {
        self.row_model.page_count()
    }

    /// Whether pagination controls should be rendered at all.
    pub fn show_pagination(&self) -> bool {
        self.page_count() > 1
    }

    /// The derived row model.
    pub fn row_model(&self) -> &RowModel {
        &self.row_model
    }

    /// Rows on the current page, in display order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &R> + '_ {
        self.row_model
            .visible_indices()
            .iter()
            .map(move |&i| &self.rows[i])
    }

    /// Number of rows passing the filters.
    pub fn filtered_row_count(&self) -> usize {
        self.row_model.filtered_len()
    }

    /// All source rows.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Column schema.
    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    /// Whether rows are being fetched.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The pagination control.
    pub fn paginator(&self) -> &paginator::Model {
        &self.paginator
    }
}
