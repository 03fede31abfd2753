//! Error types shared by the table and option-list components.
//!
//! Configuration problems are reported once, when a table is built or
//! reconfigured. Fetch failures never cross a controller boundary: the
//! controllers log them and keep their previous state so the same page can be
//! requested again. Out-of-range page indices are clamped instead of raised.

use thiserror::Error;

/// A column schema that does not fit the row type or the table options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The table was given no columns at all.
    #[error("a table needs at least one column")]
    EmptyColumns,

    /// Two columns share the same id.
    #[error("duplicate column id `{0}`")]
    DuplicateColumn(String),

    /// A column tried to use the id reserved for the global filter.
    #[error("column id `{0}` is reserved for the global filter")]
    ReservedColumnId(String),

    /// A field accessor names a field the row type does not have.
    #[error("column `{column}` reads field `{field}`, which the row type does not declare")]
    UnknownField {
        /// Id of the offending column.
        column: String,
        /// Field name the accessor asked for.
        field: String,
    },

    /// Initial sorting or filtering refers to a column that does not exist.
    #[error("initial table state refers to unknown column `{0}`")]
    UnknownColumn(String),

    /// Page size must be at least one row.
    #[error("page size must be at least 1")]
    InvalidPageSize,
}

/// A runtime intent that could not be applied to a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The intent named a column the table does not have.
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
}

/// Failure reported by an injected page fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be completed (network, HTTP status, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The response arrived but could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Shorthand for a [`FetchError::Request`].
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// Shorthand for a [`FetchError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages_name_the_column() {
        let err = ConfigError::UnknownField {
            column: "advertiser".into(),
            field: "advertizer".into(),
        };
        assert_eq!(
            err.to_string(),
            "column `advertiser` reads field `advertizer`, which the row type does not declare"
        );
        assert_eq!(
            ConfigError::DuplicateColumn("id".into()).to_string(),
            "duplicate column id `id`"
        );
    }

    #[test]
    fn test_fetch_error_shorthands() {
        assert_eq!(
            FetchError::request("503"),
            FetchError::Request("503".to_string())
        );
        assert_eq!(FetchError::decode("eof").to_string(), "invalid response: eof");
    }
}
