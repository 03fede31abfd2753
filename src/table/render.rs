//! Plain-text rendering of a [`Table`]: header, body, skeleton and the
//! pagination line.
//!
//! Every cell is padded to its column width in terminal cells, so wide glyphs
//! line up. Styles only wrap text that is already padded.

use lipgloss_extras::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::column::Row;
use super::state::SortDirection;
use super::Table;

const COLUMN_SEPARATOR: &str = " | ";
const HEADER_SEPARATOR: &str = "-+-";
const ELLIPSIS: &str = "…";
const SKELETON_CELL: char = '░';

/// Styles applied by [`Table::view`] and its parts.
#[derive(Debug, Clone)]
pub struct TableStyles {
    /// Header cells.
    pub header: Style,
    /// The dashed line under the header.
    pub separator: Style,
    /// Body cells.
    pub cell: Style,
    /// Placeholder cells drawn while loading.
    pub skeleton: Style,
    /// The "no results" line.
    pub empty: Style,
    /// The pagination line.
    pub pagination: Style,
}

impl Default for TableStyles {
    fn default() -> Self {
        let subdued = AdaptiveColor {
            Light: "#9B9B9B",
            Dark: "#5C5C5C",
        };
        Self {
            header: Style::new().bold(true),
            separator: Style::new().foreground(subdued.clone()),
            cell: Style::new(),
            skeleton: Style::new().foreground(AdaptiveColor {
                Light: "#DDDADA",
                Dark: "#3C3C3C",
            }),
            empty: Style::new().foreground(AdaptiveColor {
                Light: "#909090",
                Dark: "#626262",
            }),
            pagination: Style::new().foreground(subdued),
        }
    }
}

/// Pads `text` with spaces to `width` cells, truncating with an ellipsis if it
/// is wider.
fn fit(text: &str, width: usize) -> String {
    let current = text.width();
    if current <= width {
        return format!("{}{}", text, " ".repeat(width - current));
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(ELLIPSIS);
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

impl<R: Row> Table<R> {
    fn visible_columns(&self) -> impl Iterator<Item = &super::Column<R>> + '_ {
        self.columns.iter().filter(|c| !c.hidden)
    }

    fn header_label(&self, column_id: &str, header: &str) -> String {
        let Some(precedence) = self.state.sort_precedence(column_id) else {
            return header.to_string();
        };
        let arrow = match self.state.sorting[precedence].direction {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        };
        if self.state.sorting.len() > 1 {
            format!("{header} {arrow}{}", precedence + 1)
        } else {
            format!("{header} {arrow}")
        }
    }

    /// Display text of every visible column for every row on the page.
    fn page_cells(&self) -> Vec<Vec<String>> {
        self.visible_rows()
            .map(|row| {
                self.visible_columns()
                    .map(|c| c.value(row).to_string())
                    .collect()
            })
            .collect()
    }

    fn column_widths(&self, cells: &[Vec<String>]) -> Vec<usize> {
        self.visible_columns()
            .enumerate()
            .map(|(i, column)| match column.width {
                Some(width) => width,
                None => cells
                    .iter()
                    .map(|row| row[i].width())
                    .chain(std::iter::once(
                        self.header_label(&column.id, &column.header).width(),
                    ))
                    .max()
                    .unwrap_or(0),
            })
            .collect()
    }

    fn header_lines(&self, widths: &[usize]) -> String {
        let header = self
            .visible_columns()
            .zip(widths)
            .map(|(c, &w)| fit(&self.header_label(&c.id, &c.header), w))
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR);
        let separator = widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join(HEADER_SEPARATOR);
        format!(
            "{}\n{}",
            self.styles.header.render(&header),
            self.styles.separator.render(&separator)
        )
    }

    /// Header row with sort indicators, followed by the separator line.
    ///
    /// A sorted column shows `▲` or `▼`; when several columns are sorted each
    /// indicator also carries its 1-based precedence.
    pub fn render_header(&self) -> String {
        let cells = self.page_cells();
        self.header_lines(&self.column_widths(&cells))
    }

    fn body_lines(&self, cells: &[Vec<String>], widths: &[usize]) -> String {
        if cells.is_empty() {
            return self.styles.empty.render("No results.");
        }
        cells
            .iter()
            .map(|row| {
                let line = row
                    .iter()
                    .zip(widths)
                    .map(|(text, &w)| fit(text, w))
                    .collect::<Vec<_>>()
                    .join(COLUMN_SEPARATOR);
                self.styles.cell.render(line.trim_end())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rows of the current page, or a "No results." line when nothing passes
    /// the filters.
    pub fn render_body(&self) -> String {
        let cells = self.page_cells();
        let widths = self.column_widths(&cells);
        self.body_lines(&cells, &widths)
    }

    /// `rows` placeholder rows shaped like the current columns.
    pub fn render_skeleton(&self, rows: usize) -> String {
        let widths = self.column_widths(&[]);
        let line = widths
            .iter()
            .map(|&w| SKELETON_CELL.to_string().repeat(w))
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR);
        let styled = self.styles.skeleton.render(&line);
        vec![styled; rows].join("\n")
    }

    /// The pagination line, or `None` when everything fits on one page.
    pub fn render_pagination(&self) -> Option<String> {
        if !self.show_pagination() {
            return None;
        }
        let text = format!(
            "{}  ({} rows)",
            self.paginator.view(),
            self.state.pagination.total_count.unwrap_or(0)
        );
        Some(self.styles.pagination.render(&text))
    }

    /// The whole table. While loading, the body is a skeleton of one page.
    pub fn view(&self) -> String {
        let cells = if self.loading {
            Vec::new()
        } else {
            self.page_cells()
        };
        let widths = self.column_widths(&cells);

        let mut out = self.header_lines(&widths);
        out.push('\n');
        if self.loading {
            out.push_str(&self.render_skeleton(self.state.pagination.page_size));
        } else {
            out.push_str(&self.body_lines(&cells, &widths));
        }
        if let Some(pagination) = self.render_pagination() {
            out.push_str("\n\n");
            out.push_str(&pagination);
        }
        out
    }
}
