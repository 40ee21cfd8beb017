//! # oxide-bind
//!
//! Named-parameter SQL templates with dialect-aware binding.
//!
//! This crate provides:
//! - `Dialect` strategies for literal formatting, placeholders and quoting
//! - `SqlValue` / `Params` for typed parameter values, scalar or collection
//! - A template expander turning `:name` markers into positional placeholders
//! - A `Binder` rendering statements with inlined literals for logging
//!
//! ## Collection Parameters
//!
//! A parameter bound to a collection expands to one placeholder per element,
//! or to a single array bind on dialects that support it:
//!
//! ```rust
//! use oxide_bind::{expand, Params, PostgresDialect, SqlValue};
//!
//! let params = Params::new().bind_all("ids", [1, 2, 3]);
//! let statement = expand(
//!     &PostgresDialect::new(),
//!     "select * from actor where actor_id in (:ids)",
//!     &params,
//! )
//! .unwrap();
//!
//! assert_eq!(statement.sql, "select * from actor where actor_id = any($1)");
//! assert_eq!(statement.args.len(), 1);
//! ```
//!
//! SQL text is otherwise passed through untouched.

pub mod binder;
pub mod dialect;
mod error;
pub mod template;
pub mod value;

pub use binder::Binder;
pub use dialect::{Dialect, GenericDialect, MysqlDialect, PostgresDialect, SqliteDialect};
pub use error::{BindError, Result};
pub use template::{expand, BindArgument, Statement, Template};
pub use value::{Param, Params, SqlValue, ToSqlValue};
