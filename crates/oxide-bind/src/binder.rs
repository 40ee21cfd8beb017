//! Literal rendering for logs and diagnostics.
//!
//! Execution never inlines values: drivers bind them natively from
//! [`Statement::args`](crate::Statement). The binder only produces a readable,
//! size-bounded rendering of a statement with its values substituted.

use crate::dialect::Dialect;
use crate::template::Template;
use crate::value::{Param, Params, SqlValue};

/// Renders values as dialect literals, truncating long strings and blobs.
#[derive(Clone, Copy)]
pub struct Binder<'a> {
    dialect: &'a dyn Dialect,
    limit: usize,
}

impl std::fmt::Debug for Binder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("dialect", &self.dialect.name())
            .field("limit", &self.limit)
            .finish()
    }
}

impl<'a> Binder<'a> {
    /// Default truncation limit for rendered strings and blobs.
    pub const DEFAULT_LIMIT: usize = 1000;

    /// Creates a binder for `dialect`, truncating values to `limit`.
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect, limit: usize) -> Self {
        Self { dialect, limit }
    }

    /// The truncation limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Renders a single value.
    #[must_use]
    pub fn render(&self, value: &SqlValue) -> String {
        self.dialect.bind(value, self.limit)
    }

    /// Renders a parameter; collections become a comma separated list.
    #[must_use]
    pub fn render_param(&self, param: &Param) -> String {
        match param {
            Param::Scalar(value) => self.render(value),
            Param::Collection(values) if values.is_empty() => {
                self.dialect.empty_in_list().to_string()
            }
            Param::Collection(values) => values
                .iter()
                .map(|v| self.render(v))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Renders `template` with every bound marker replaced by its literal.
    /// Unbound markers are left as written.
    #[must_use]
    pub fn render_template(&self, template: &Template, params: &Params) -> String {
        template.render_with(|name| {
            params
                .get(name)
                .map_or_else(|| format!(":{name}"), |param| self.render_param(param))
        })
    }

    /// Parses and renders `sql` in one step.
    #[must_use]
    pub fn render_sql(&self, sql: &str, params: &Params) -> String {
        self.render_template(&Template::parse(sql), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{PostgresDialect, SqliteDialect};

    #[test]
    fn test_render_escapes_quotes() {
        let dialect = SqliteDialect::new();
        let binder = Binder::new(&dialect, Binder::DEFAULT_LIMIT);
        assert_eq!(
            binder.render(&SqlValue::Text(String::from("O'Malley"))),
            "'O''Malley'"
        );
    }

    #[test]
    fn test_render_truncates_strings() {
        let dialect = SqliteDialect::new();
        let binder = Binder::new(&dialect, 3);
        assert_eq!(
            binder.render(&SqlValue::Text("abcdefgh".repeat(100))),
            "'abc'"
        );
    }

    #[test]
    fn test_blob_length_bounded_by_limit() {
        let dialect = PostgresDialect::new();
        let binder = Binder::new(&dialect, 4);
        let rendered: Vec<usize> = [4, 40, 4000]
            .iter()
            .map(|n| binder.render(&SqlValue::Blob(vec![1; *n])).len())
            .collect();
        assert!(rendered.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_render_sql_inlines_parameters() {
        let dialect = SqliteDialect::new();
        let binder = Binder::new(&dialect, 100);
        let params = Params::new()
            .bind("name", "O'Malley")
            .bind_all("ids", [1, 2])
            .bind_all("none", Vec::<i64>::new());
        assert_eq!(
            binder.render_sql(
                "select * from actor where last_name = :name and id in (:ids) or id in (:none) or x = :unbound",
                &params
            ),
            "select * from actor where last_name = 'O''Malley' and id in (1, 2) or id in (select null where 1 = 0) or x = :unbound"
        );
    }

    #[test]
    fn test_debug_shows_dialect() {
        let dialect = SqliteDialect::new();
        let binder = Binder::new(&dialect, 5);
        assert_eq!(
            format!("{binder:?}"),
            "Binder { dialect: \"sqlite\", limit: 5 }"
        );
    }
}
