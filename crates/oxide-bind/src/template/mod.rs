//! Named-parameter templates.
//!
//! A template is SQL text with `:name` markers. Expanding it against a
//! [`Params`] map produces executable SQL with positional placeholders plus
//! the ordered list of values to bind.
//!
//! Collection parameters are expanded per occurrence:
//!
//! - on dialects with native arrays, `in (:ids)` becomes `= any($n)` and the
//!   whole collection is bound as one array;
//! - elsewhere the marker becomes one placeholder per element, and an empty
//!   collection becomes a sub-select returning no rows.
//!
//! ```rust
//! use oxide_bind::{expand, Params, SqliteDialect, SqlValue};
//!
//! let params = Params::new().bind("id", 1).bind_all("ids", [2, 3]);
//! let statement = expand(
//!     &SqliteDialect::new(),
//!     "select * from actor where actor_id = :id or actor_id in (:ids)",
//!     &params,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     statement.sql,
//!     "select * from actor where actor_id = ? or actor_id in (?, ?)"
//! );
//! assert_eq!(
//!     statement.values().cloned().collect::<Vec<_>>(),
//!     vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
//! );
//! ```

mod scanner;

use tracing::trace;

use scanner::{tokenize, Segment};

use crate::dialect::Dialect;
use crate::error::{BindError, Result};
use crate::value::{Param, Params, SqlValue};

/// A value bound to one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct BindArgument {
    /// The named parameter this value came from.
    pub name: String,
    /// The value to bind.
    pub value: SqlValue,
}

/// Executable SQL and its bind arguments, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL with positional placeholders.
    pub sql: String,
    /// One argument per placeholder.
    pub args: Vec<BindArgument>,
}

impl Statement {
    /// Iterates over the values to bind, in order.
    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.args.iter().map(|arg| &arg.value)
    }
}

/// SQL text parsed into literal runs and named markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    sql: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `sql` once so it can be expanded repeatedly.
    pub fn parse(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let segments = tokenize(&sql);
        Self { sql, segments }
    }

    /// The original SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter names in order of occurrence, repeats included.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Sql(_) => None,
        })
    }

    /// Renders the template with each marker replaced by `render(name)`.
    pub(crate) fn render_with<F>(&self, mut render: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        let mut out = String::with_capacity(self.sql.len());
        for segment in &self.segments {
            match segment {
                Segment::Sql(text) => out.push_str(text),
                Segment::Param(name) => out.push_str(&render(name)),
            }
        }
        out
    }

    /// Rewrites the template for `dialect` and collects the bind arguments.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingParameter`] if a marker has no entry in
    /// `params`. Nothing is rewritten in that case.
    pub fn expand<D: Dialect + ?Sized>(&self, dialect: &D, params: &Params) -> Result<Statement> {
        if let Some(name) = self.parameter_names().find(|name| !params.contains(name)) {
            return Err(BindError::MissingParameter {
                name: name.to_string(),
            });
        }

        let mut out = String::with_capacity(self.sql.len());
        let mut args: Vec<BindArgument> = Vec::new();
        let mut drop_close_paren = false;

        for (idx, segment) in self.segments.iter().enumerate() {
            let name = match segment {
                Segment::Sql(text) => {
                    if drop_close_paren {
                        drop_close_paren = false;
                        out.push_str(&text.trim_start()[1..]);
                    } else {
                        out.push_str(text);
                    }
                    continue;
                }
                Segment::Param(name) => name,
            };

            let param = params.get(name).ok_or_else(|| BindError::MissingParameter {
                name: name.clone(),
            })?;

            match param {
                Param::Scalar(value) => {
                    args.push(BindArgument {
                        name: name.clone(),
                        value: value.clone(),
                    });
                    out.push_str(&dialect.placeholder(args.len()));
                }
                Param::Collection(values) if dialect.supports_array_based_in() => {
                    args.push(BindArgument {
                        name: name.clone(),
                        value: SqlValue::Array(values.clone()),
                    });
                    let placeholder = dialect.placeholder(args.len());
                    match in_clause_start(&out) {
                        Some((start, negated)) if closes_paren(self.segments.get(idx + 1)) => {
                            out.truncate(start);
                            if negated {
                                out.push_str(&dialect.array_based_not_in(&placeholder));
                            } else {
                                out.push_str(&dialect.array_based_in(&placeholder));
                            }
                            drop_close_paren = true;
                        }
                        _ => out.push_str(&placeholder),
                    }
                }
                Param::Collection(values) if values.is_empty() => {
                    out.push_str(dialect.empty_in_list());
                }
                Param::Collection(values) => {
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        args.push(BindArgument {
                            name: name.clone(),
                            value: value.clone(),
                        });
                        out.push_str(&dialect.placeholder(args.len()));
                    }
                }
            }
        }

        for unused in params.names().filter(|n| !self.parameter_names().any(|p| p == *n)) {
            trace!(parameter = %unused, "Parameter not referenced by template");
        }
        trace!(
            dialect = dialect.name(),
            placeholders = args.len(),
            "Expanded template"
        );

        Ok(Statement { sql: out, args })
    }
}

/// Parses and expands `sql` in one step.
///
/// # Errors
///
/// Returns [`BindError::MissingParameter`] if `sql` references a name that
/// `params` does not bind.
pub fn expand<D: Dialect + ?Sized>(dialect: &D, sql: &str, params: &Params) -> Result<Statement> {
    Template::parse(sql).expand(dialect, params)
}

/// If `out` ends with `in (` or `not in (` (any case, any spacing), returns
/// where that keyword run starts and whether it is negated.
fn in_clause_start(out: &str) -> Option<(usize, bool)> {
    let before_paren = out.trim_end().strip_suffix('(')?.trim_end();
    let start = keyword_start(before_paren, "in")?;
    let rest = before_paren[..start].trim_end();
    Some(keyword_start(rest, "not").map_or((start, false), |not_start| (not_start, true)))
}

/// If `text` ends with the whole word `keyword`, returns where it starts.
fn keyword_start(text: &str, keyword: &str) -> Option<usize> {
    let start = text.len().checked_sub(keyword.len())?;
    if !text
        .get(start..)
        .is_some_and(|tail| tail.eq_ignore_ascii_case(keyword))
    {
        return None;
    }
    match text[..start].chars().next_back() {
        Some(c) if c.is_alphanumeric() || c == '_' => None,
        _ => Some(start),
    }
}

fn closes_paren(next: Option<&Segment>) -> bool {
    matches!(next, Some(Segment::Sql(text)) if text.trim_start().starts_with(')'))
}
