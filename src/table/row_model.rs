//! Derived row model: `paginate(sort(filter(rows)))`.
//!
//! The row model stores indices into the table's source rows, so computing
//! it never clones or mutates a row.

use std::ops::Range;

use tracing::trace;

use super::column::{contains_ignore_case, CellValue, Column, Row};
use super::state::{PaginationMode, SortDirection, TableOptions, TableState};
use crate::paginator;

/// Read-only projection of the source rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowModel {
    ordered: Vec<usize>,
    window: Range<usize>,
    page_count: usize,
}

impl RowModel {
    /// Source indices of the rows on the current page, in display order.
    pub fn visible_indices(&self) -> &[usize] {
        &self.ordered[self.window.clone()]
    }

    /// Source indices of every row passing the filters, in sorted order.
    pub fn filtered_indices(&self) -> &[usize] {
        &self.ordered
    }

    /// Number of rows passing the filters.
    pub fn filtered_len(&self) -> usize {
        self.ordered.len()
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

fn passes_filters<R: Row>(row: &R, columns: &[Column<R>], state: &TableState) -> bool {
    let columns_pass = state.column_filters.iter().all(|(id, value)| {
        columns
            .iter()
            .find(|c| &c.id == id)
            .map_or(true, |column| column.filter_kind.matches(&column.value(row), value))
    });
    if !columns_pass {
        return false;
    }

    let needle = state.global_filter.trim();
    needle.is_empty()
        || columns
            .iter()
            .filter(|c| !c.hidden)
            .any(|c| contains_ignore_case(&c.value(row).to_string(), needle))
}

fn sort_indices<R: Row>(
    indices: &mut Vec<usize>,
    rows: &[R],
    columns: &[Column<R>],
    state: &TableState,
) {
    let keys: Vec<(&Column<R>, SortDirection)> = state
        .sorting
        .iter()
        .filter_map(|d| {
            columns
                .iter()
                .find(|c| c.id == d.column_id)
                .map(|c| (c, d.direction))
        })
        .collect();
    if keys.is_empty() {
        return;
    }

    let mut keyed: Vec<(usize, Vec<CellValue>)> = indices
        .iter()
        .map(|&i| (i, keys.iter().map(|(c, _)| c.value(&rows[i])).collect()))
        .collect();

    // Stable, so rows equal on every key keep their source order.
    keyed.sort_by(|(_, a), (_, b)| {
        keys.iter()
            .enumerate()
            .map(|(k, (_, direction))| {
                let ord = a[k].total_cmp(&b[k]);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    *indices = keyed.into_iter().map(|(i, _)| i).collect();
}

/// Computes the row model and clamps `state.pagination.page_index` into range.
pub(crate) fn compute<R: Row>(
    rows: &[R],
    columns: &[Column<R>],
    state: &mut TableState,
    options: &TableOptions,
) -> RowModel {
    let server = options.pagination_mode == PaginationMode::Server;

    let mut ordered: Vec<usize> = if server && options.manual_filtering {
        (0..rows.len()).collect()
    } else {
        (0..rows.len())
            .filter(|&i| passes_filters(&rows[i], columns, state))
            .collect()
    };

    if !(server && options.manual_sorting) {
        sort_indices(&mut ordered, rows, columns, state);
    }

    let page_size = state.pagination.page_size;
    let (page_count, window) = if server {
        // Unknown remote total: trust the requested page until the caller
        // reports how many rows exist.
        let page_count = match state.pagination.total_count {
            Some(total) => paginator::page_count_for(total, page_size),
            None => state.pagination.page_index.saturating_add(1),
        };
        state.pagination.page_index = state.pagination.page_index.min(page_count - 1);
        (page_count, 0..ordered.len())
    } else {
        let mut pages = paginator::Model::new()
            .with_per_page(page_size)
            .with_total_items(ordered.len());
        state.pagination.page_index = pages.set_page(state.pagination.page_index);
        state.pagination.total_count = Some(ordered.len());
        let (start, end) = pages.slice_bounds(ordered.len());
        (pages.total_pages, start..end)
    };

    trace!(
        rows = rows.len(),
        filtered = ordered.len(),
        page = state.pagination.page_index,
        page_count,
        "row model recomputed"
    );

    RowModel {
        ordered,
        window,
        page_count,
    }
}
