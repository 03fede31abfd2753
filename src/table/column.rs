//! Typed column schema: row shape, cell values, accessors and filter kinds.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A row type the table can read cells from.
///
/// `fields` declares the row shape once; column accessors that name a field
/// are checked against it when the table is built, so a typo surfaces as a
/// [`ConfigError`](crate::error::ConfigError) instead of a column of blanks.
///
/// ```rust
/// use datagrid_widgets::table::{CellValue, Row};
///
/// struct Campaign {
///     advertiser: String,
///     budget: i64,
/// }
///
/// impl Row for Campaign {
///     fn fields() -> &'static [&'static str] {
///         &["advertiser", "budget"]
///     }
///
///     fn cell(&self, field: &str) -> CellValue {
///         match field {
///             "advertiser" => self.advertiser.as_str().into(),
///             "budget" => self.budget.into(),
///             _ => CellValue::Null,
///         }
///     }
/// }
/// ```
pub trait Row {
    /// Names of every field [`Row::cell`] understands.
    fn fields() -> &'static [&'static str];

    /// Value of `field` for this row.
    fn cell(&self, field: &str) -> CellValue;
}

/// A single cell, or a raw filter value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value. Sorts before everything else and renders as empty text.
    #[default]
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
}

impl CellValue {
    /// True for `Null` and for empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::Text(_) => 3,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Total order used for sorting.
    ///
    /// Values of different kinds order by kind (null, bool, number, text).
    /// Integers and floats compare numerically; text compares
    /// case-insensitively, then by exact bytes.
    pub fn total_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (a, b) if a.rank() == 2 && b.rank() == 2 => {
                let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                x.total_cmp(&y)
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    /// Typed equality with coercion of text filter values.
    ///
    /// A text filter such as `"42"` matches the number 42 and `"true"`
    /// matches a boolean `true`; everything else compares by kind and value.
    pub fn loosely_eq(&self, filter: &CellValue) -> bool {
        match (self, filter) {
            (CellValue::Int(_) | CellValue::Float(_), CellValue::Int(_) | CellValue::Float(_)) => {
                self.as_f64() == filter.as_f64()
            }
            (CellValue::Int(_) | CellValue::Float(_), CellValue::Text(_)) => {
                filter.as_f64().is_some() && self.as_f64() == filter.as_f64()
            }
            (CellValue::Bool(b), CellValue::Text(s)) => s.trim().parse::<bool>() == Ok(*b),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(n) => write!(f, "{n}"),
            CellValue::Float(x) => write!(f, "{x}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        CellValue::Text(value.clone())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value.into())
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Int(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

/// Predicate used by [`FilterKind::Custom`]: `(cell, filter_value) -> keep`.
pub type FilterFn = Arc<dyn Fn(&CellValue, &CellValue) -> bool + Send + Sync>;

/// Derives a cell from a whole row.
pub type ComputeFn<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

/// How a column filter compares cells to the filter value.
#[derive(Clone, Default)]
pub enum FilterKind {
    /// Typed equality, see [`CellValue::loosely_eq`].
    #[default]
    Equality,
    /// Case-insensitive substring of the rendered text.
    Substring,
    /// Caller-supplied predicate.
    Custom(FilterFn),
}

impl FilterKind {
    /// Wraps a predicate as [`FilterKind::Custom`].
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&CellValue, &CellValue) -> bool + Send + Sync + 'static,
    {
        FilterKind::Custom(Arc::new(predicate))
    }

    /// Whether `cell` passes a filter set to `value`.
    pub fn matches(&self, cell: &CellValue, value: &CellValue) -> bool {
        match self {
            FilterKind::Equality => cell.loosely_eq(value),
            FilterKind::Substring => contains_ignore_case(&cell.to_string(), &value.to_string()),
            FilterKind::Custom(predicate) => predicate(cell, value),
        }
    }
}

impl fmt::Debug for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Equality => f.write_str("Equality"),
            FilterKind::Substring => f.write_str("Substring"),
            FilterKind::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Where a column's cells come from.
pub enum Accessor<R> {
    /// A field declared by [`Row::fields`].
    Field(String),
    /// A value computed from the whole row.
    Computed(ComputeFn<R>),
}

impl<R> Clone for Accessor<R> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Field(name) => Accessor::Field(name.clone()),
            Accessor::Computed(f) => Accessor::Computed(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for Accessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A column descriptor.
///
/// ```rust
/// use datagrid_widgets::table::{CellValue, Column, FilterKind};
/// # struct Campaign { budget: i64 }
///
/// let advertiser: Column<Campaign> = Column::field("advertiser", "Advertiser")
///     .with_filter(FilterKind::Substring)
///     .with_width(24);
///
/// let over_budget = Column::computed("over", "Over budget", |c: &Campaign| {
///     CellValue::Bool(c.budget > 10_000)
/// })
/// .sortable(false);
/// ```
pub struct Column<R> {
    pub(crate) id: String,
    pub(crate) header: String,
    pub(crate) accessor: Accessor<R>,
    pub(crate) filter_kind: FilterKind,
    pub(crate) sortable: bool,
    pub(crate) filterable: bool,
    pub(crate) hidden: bool,
    pub(crate) width: Option<usize>,
}

impl<R> Column<R> {
    /// A column reading the row field of the same name.
    pub fn field(id: impl Into<String>, header: impl Into<String>) -> Self {
        let id = id.into();
        let accessor = Accessor::Field(id.clone());
        Self::with_accessor(id, header, accessor)
    }

    /// A column whose cells are computed from the row.
    pub fn computed<F>(id: impl Into<String>, header: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        Self::with_accessor(id.into(), header, Accessor::Computed(Arc::new(compute)))
    }

    fn with_accessor(id: String, header: impl Into<String>, accessor: Accessor<R>) -> Self {
        Self {
            id,
            header: header.into(),
            accessor,
            filter_kind: FilterKind::default(),
            sortable: true,
            filterable: true,
            hidden: false,
            width: None,
        }
    }

    /// Reads a differently named field than the column id (builder).
    pub fn reading(mut self, field: impl Into<String>) -> Self {
        self.accessor = Accessor::Field(field.into());
        self
    }

    /// Sets the column filter comparison (builder).
    pub fn with_filter(mut self, kind: FilterKind) -> Self {
        self.filter_kind = kind;
        self
    }

    /// Enables or disables sorting (builder).
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Enables or disables column filtering (builder).
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Hides the column from rendering and from the global filter (builder).
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Fixes the rendered width in terminal cells (builder).
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Column id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Header text.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Accessor.
    pub fn accessor(&self) -> &Accessor<R> {
        &self.accessor
    }

    /// Filter comparison.
    pub fn filter_kind(&self) -> &FilterKind {
        &self.filter_kind
    }

    /// Whether sort intents apply to this column.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Whether column filter intents apply to this column.
    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Whether the column is hidden.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Fixed width, if any.
    pub fn width(&self) -> Option<usize> {
        self.width
    }
}

impl<R: Row> Column<R> {
    /// Cell value of this column for `row`.
    pub fn value(&self, row: &R) -> CellValue {
        match &self.accessor {
            Accessor::Field(name) => row.cell(name),
            Accessor::Computed(compute) => compute(row),
        }
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            filter_kind: self.filter_kind.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            hidden: self.hidden,
            width: self.width,
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("accessor", &self.accessor)
            .field("filter_kind", &self.filter_kind)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("hidden", &self.hidden)
            .field("width", &self.width)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cmp_orders_kinds_then_values() {
        let mut values = vec![
            CellValue::from("beta"),
            CellValue::Int(3),
            CellValue::Null,
            CellValue::Float(2.5),
            CellValue::from("Alpha"),
            CellValue::Bool(true),
        ];
        values.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Float(2.5),
                CellValue::Int(3),
                CellValue::from("Alpha"),
                CellValue::from("beta"),
            ]
        );
    }

    #[test]
    fn test_loose_equality_coerces_text_filters() {
        assert!(CellValue::Int(42).loosely_eq(&CellValue::from("42")));
        assert!(CellValue::Float(1.0).loosely_eq(&CellValue::Int(1)));
        assert!(CellValue::Bool(false).loosely_eq(&CellValue::from("false")));
        assert!(!CellValue::Int(42).loosely_eq(&CellValue::from("forty-two")));
        assert!(!CellValue::from("Acme").loosely_eq(&CellValue::from("acme")));
    }

    #[test]
    fn test_filter_kinds() {
        let cell = CellValue::from("ACME Corp");
        assert!(FilterKind::Substring.matches(&cell, &CellValue::from("acme")));
        assert!(!FilterKind::Equality.matches(&cell, &CellValue::from("acme")));

        let starts = FilterKind::custom(|cell, value| {
            cell.to_string().starts_with(&value.to_string())
        });
        assert!(starts.matches(&cell, &CellValue::from("ACME")));
        assert!(!starts.matches(&cell, &CellValue::from("Corp")));
    }

    #[test]
    fn test_display_and_blank() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Float(1.5).to_string(), "1.5");
        assert!(CellValue::from("  ").is_blank());
        assert!(!CellValue::Int(0).is_blank());
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
    }

    #[test]
    fn test_cell_values_deserialize_untagged() {
        let values: Vec<CellValue> = serde_json::from_str(r#"[null, true, 7, 1.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Int(7),
                CellValue::Float(1.5),
                CellValue::from("x"),
            ]
        );
    }
}
