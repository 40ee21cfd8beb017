//! MySQL dialect.

use super::Dialect;

/// MySQL dialect: backtick identifiers, `?` placeholders, no arrays.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn empty_in_list(&self) -> &'static str {
        "select null from dual where 1 = 0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_dialect() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.quote_identifier("key"), "`key`");
        assert_eq!(dialect.quote_identifier("a`b"), "`a``b`");
        assert!(!dialect.supports_array_based_in());
        assert_eq!(dialect.empty_in_list(), "select null from dual where 1 = 0");
    }
}
