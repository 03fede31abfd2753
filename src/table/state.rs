//! Table state, options and the sort/pagination vocabulary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::column::CellValue;

/// Reserved id of the virtual column that stands for the global text filter.
pub const GLOBAL_FILTER_ID: &str = "__global__";

/// Sort direction of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Next step of the `none -> asc -> desc -> none` cycle.
    pub fn cycle(current: Option<SortDirection>) -> Option<SortDirection> {
        match current {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        }
    }
}

/// One entry of the ordered sort list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    /// Sorted column.
    pub column_id: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortDescriptor {
    /// Ascending sort on `column_id`.
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `column_id`.
    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// What a sort intent asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIntent {
    /// Advance the column through `none -> asc -> desc -> none`.
    Toggle,
    /// Put the column in this state directly; `None` removes it.
    Set(Option<SortDirection>),
}

/// Whether several columns may be sorted at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Keep other columns' descriptors; new ones get the lowest precedence.
    #[default]
    Multi,
    /// Sorting a column clears every other descriptor.
    Single,
}

/// Who slices the rows into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// The table holds every row and slices pages itself.
    #[default]
    Client,
    /// The caller hands over one page at a time plus the remote total.
    Server,
}

/// Page position and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Current page, 0-based.
    pub page_index: usize,
    /// Rows per page, fixed for the table's lifetime.
    pub page_size: usize,
    /// Total row count reported by the caller in server mode, or the
    /// filtered count in client mode once rows are known.
    pub total_count: Option<usize>,
}

/// Everything a caller needs to reproduce the current view, for example to
/// forward it to a backend in server mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    /// Ordered sort descriptors; earlier entries take precedence.
    pub sorting: Vec<SortDescriptor>,
    /// Raw filter value per column id.
    pub column_filters: BTreeMap<String, CellValue>,
    /// Cross-column text filter; empty means none.
    pub global_filter: String,
    /// Page position.
    pub pagination: PaginationState,
}

impl TableState {
    /// Direction of `column_id`, if it is sorted.
    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.sorting
            .iter()
            .find(|d| d.column_id == column_id)
            .map(|d| d.direction)
    }

    /// Precedence (0 = primary) of `column_id` in the sort list.
    pub fn sort_precedence(&self, column_id: &str) -> Option<usize> {
        self.sorting.iter().position(|d| d.column_id == column_id)
    }
}

/// Construction options.
///
/// Deserializable with defaults, so dashboards can keep per-table settings in
/// their own configuration files:
///
/// ```rust
/// use datagrid_widgets::table::{PaginationMode, TableOptions};
///
/// let options: TableOptions =
///     serde_json::from_str(r#"{ "page_size": 25, "pagination_mode": "server" }"#).unwrap();
/// assert_eq!(options.page_size, 25);
/// assert_eq!(options.pagination_mode, PaginationMode::Server);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Rows per page.
    pub page_size: usize,
    /// Single or multi-column sorting.
    pub sort_mode: SortMode,
    /// Client or server pagination.
    pub pagination_mode: PaginationMode,
    /// In server mode, also leave sorting to the caller.
    pub manual_sorting: bool,
    /// In server mode, also leave filtering to the caller.
    pub manual_filtering: bool,
    /// Sorting applied at construction.
    pub initial_sorting: Vec<SortDescriptor>,
    /// Column filters applied at construction.
    pub initial_filters: BTreeMap<String, CellValue>,
    /// Global filter applied at construction.
    pub initial_global_filter: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            sort_mode: SortMode::default(),
            pagination_mode: PaginationMode::default(),
            manual_sorting: false,
            manual_filtering: false,
            initial_sorting: Vec::new(),
            initial_filters: BTreeMap::new(),
            initial_global_filter: String::new(),
        }
    }
}

impl TableOptions {
    /// Default options: client mode, multi-sort, 10 rows per page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets rows per page (builder).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the sort mode (builder).
    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = mode;
        self
    }

    /// Sets the pagination mode (builder).
    pub fn with_pagination_mode(mut self, mode: PaginationMode) -> Self {
        self.pagination_mode = mode;
        self
    }

    /// Server mode with sorting and filtering also delegated (builder).
    pub fn fully_manual(mut self) -> Self {
        self.pagination_mode = PaginationMode::Server;
        self.manual_sorting = true;
        self.manual_filtering = true;
        self
    }

    /// Adds an initial sort descriptor (builder).
    pub fn with_sort(mut self, descriptor: SortDescriptor) -> Self {
        self.initial_sorting.push(descriptor);
        self
    }

    /// Adds an initial column filter (builder).
    pub fn with_column_filter(
        mut self,
        column_id: impl Into<String>,
        value: impl Into<CellValue>,
    ) -> Self {
        self.initial_filters.insert(column_id.into(), value.into());
        self
    }

    /// Sets the initial global filter (builder).
    pub fn with_global_filter(mut self, text: impl Into<String>) -> Self {
        self.initial_global_filter = text.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_cycle_returns_to_none() {
        let mut dir = None;
        let mut seen = Vec::new();
        for _ in 0..6 {
            dir = SortDirection::cycle(dir);
            seen.push(dir);
        }
        use SortDirection::*;
        assert_eq!(
            seen,
            vec![Some(Asc), Some(Desc), None, Some(Asc), Some(Desc), None]
        );
    }

    #[test]
    fn test_state_serializes_for_backend_requests() {
        let state = TableState {
            sorting: vec![SortDescriptor::desc("spend")],
            column_filters: BTreeMap::from([("status".to_string(), CellValue::from("live"))]),
            global_filter: "acme".into(),
            pagination: PaginationState {
                page_index: 2,
                page_size: 25,
                total_count: Some(80),
            },
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["sorting"][0]["direction"], "desc");
        assert_eq!(json["column_filters"]["status"], "live");
        assert_eq!(json["pagination"]["page_index"], 2);

        let back: TableState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_options_builder() {
        let options = TableOptions::new()
            .with_page_size(5)
            .with_sort_mode(SortMode::Single)
            .with_sort(SortDescriptor::asc("name"))
            .with_column_filter("status", "live")
            .with_global_filter("acme");
        assert_eq!(options.page_size, 5);
        assert_eq!(options.initial_sorting.len(), 1);
        assert_eq!(options.initial_filters["status"], CellValue::from("live"));

        let manual = TableOptions::new().fully_manual();
        assert_eq!(manual.pagination_mode, PaginationMode::Server);
        assert!(manual.manual_sorting && manual.manual_filtering);
    }
}
