//! SQLite dialect implementation.

use super::{join_bound, Dialect};
use crate::value::SqlValue;

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }

    fn bind_bool(&self, value: bool) -> String {
        String::from(if value { "1" } else { "0" })
    }

    // No array type; render as a plain list for logs.
    fn bind_array(&self, values: &[SqlValue], limit: usize) -> String {
        format!("({})", join_bound(self, values, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_dialect() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.name(), "sqlite");
        assert_eq!(dialect.identifier_quote(), '"');
        assert_eq!(dialect.placeholder(2), "?");
        assert!(!dialect.supports_array_based_in());
        assert!(!dialect.supports_allocate_ids());
        assert_eq!(dialect.empty_in_list(), "select null where 1 = 0");
    }

    #[test]
    fn test_sqlite_literals() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.bind(&SqlValue::Bool(true), 10), "1");
        assert_eq!(dialect.bind(&SqlValue::Bool(false), 10), "0");
        assert_eq!(dialect.bind(&SqlValue::Blob(vec![0xAB, 0x01]), 10), "X'AB01'");
        assert_eq!(
            dialect.bind(
                &SqlValue::Array(vec![SqlValue::Int(1), SqlValue::Int(2)]),
                10
            ),
            "(1, 2)"
        );
    }
}
