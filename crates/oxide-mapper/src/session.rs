//! Statement execution against a SQLite pool.

use std::fmt;
use std::sync::Arc;

use futures::TryStreamExt;
use oxide_bind::{expand, Binder, Dialect, Params, SqlValue, SqliteDialect, Statement};
use serde::Deserialize;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::Sqlite;
use tracing::debug;

use crate::error::{MapperError, Result};

/// Session settings.
///
/// ```rust
/// use oxide_mapper::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{"log_limit": 40}"#).unwrap();
/// assert!(config.log_statements);
/// assert_eq!(config.log_limit, 40);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Log each statement with its parameters inlined.
    pub log_statements: bool,
    /// Maximum characters or bytes of a logged value.
    pub log_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_statements: true,
            log_limit: Binder::DEFAULT_LIMIT,
        }
    }
}

/// Executes named-parameter statements.
///
/// Templates are expanded with the SQLite dialect and every argument is
/// bound natively; literals are only inlined for logging.
#[derive(Clone)]
pub struct Session {
    pool: SqlitePool,
    dialect: Arc<dyn Dialect>,
    config: SessionConfig,
}

impl Session {
    /// Creates a session with default settings.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_config(pool, SessionConfig::default())
    }

    /// Creates a session with `config`.
    #[must_use]
    pub fn with_config(pool: SqlitePool, config: SessionConfig) -> Self {
        Self {
            pool,
            dialect: Arc::new(SqliteDialect::new()),
            config,
        }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The dialect templates are expanded with.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// The session settings.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Runs a query and maps every row.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::Bind`] before touching the database if a
    /// parameter is missing, [`MapperError::Database`] if execution fails,
    /// or the mapper's error.
    pub async fn select<T, F>(&self, sql: &str, params: &Params, mapper: F) -> Result<Vec<T>>
    where
        F: Fn(&SqliteRow) -> Result<T>,
    {
        let statement = self.prepare(sql, params)?;
        let rows = bind_all(&statement)?.fetch_all(&self.pool).await?;
        rows.iter().map(mapper).collect()
    }

    /// Runs a query expected to return at most one row.
    ///
    /// # Errors
    ///
    /// As [`select`](Self::select).
    pub async fn select_optional<T, F>(
        &self,
        sql: &str,
        params: &Params,
        mapper: F,
    ) -> Result<Option<T>>
    where
        F: Fn(&SqliteRow) -> Result<T>,
    {
        let statement = self.prepare(sql, params)?;
        let row = bind_all(&statement)?
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(mapper).transpose()
    }

    /// Streams the rows of a query into `f`, returning the number of rows.
    ///
    /// # Errors
    ///
    /// As [`select`](Self::select); stops at the first error from `f`.
    pub async fn for_each<F>(&self, sql: &str, params: &Params, mut f: F) -> Result<u64>
    where
        F: FnMut(&SqliteRow) -> Result<()>,
    {
        let statement = self.prepare(sql, params)?;
        let query = bind_all(&statement)?;
        let mut rows = query.fetch(&self.pool);
        let mut count = 0;
        while let Some(row) = rows.try_next().await? {
            f(&row)?;
            count += 1;
        }
        Ok(count)
    }

    /// Runs a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// As [`select`](Self::select).
    pub async fn update(&self, sql: &str, params: &Params) -> Result<u64> {
        let statement = self.prepare(sql, params)?;
        let result = bind_all(&statement)?.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    fn prepare(&self, sql: &str, params: &Params) -> Result<Statement> {
        let statement = expand(self.dialect.as_ref(), sql, params)?;
        if self.config.log_statements {
            let binder = Binder::new(self.dialect.as_ref(), self.config.log_limit);
            debug!(
                sql = %binder.render_sql(sql, params),
                args = statement.args.len(),
                "executing statement"
            );
        }
        Ok(statement)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("dialect", &self.dialect.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_all(statement: &Statement) -> Result<SqliteQuery<'_>> {
    statement
        .values()
        .try_fold(sqlx::query(&statement.sql), bind_value)
}

fn bind_value<'q>(query: SqliteQuery<'q>, value: &SqlValue) -> Result<SqliteQuery<'q>> {
    let query = match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Blob(b) => query.bind(b.clone()),
        SqlValue::Date(d) => query.bind(*d),
        SqlValue::Time(t) => query.bind(*t),
        SqlValue::Timestamp(ts) => query.bind(*ts),
        SqlValue::Array(_) => return Err(MapperError::UnsupportedBind("array")),
    };
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SessionConfig::default();
        assert!(config.log_statements);
        assert_eq!(config.log_limit, 1000);

        let config: SessionConfig =
            serde_json::from_str(r#"{"log_statements": false}"#).unwrap();
        assert!(!config.log_statements);
        assert_eq!(config.log_limit, 1000);
    }

    #[test]
    fn test_arrays_are_not_bound() {
        let statement = Statement {
            sql: String::from("select ?"),
            args: vec![oxide_bind::BindArgument {
                name: String::from("ids"),
                value: SqlValue::Array(vec![SqlValue::Int(1)]),
            }],
        };
        assert!(matches!(
            bind_all(&statement),
            Err(MapperError::UnsupportedBind("array"))
        ));
    }
}
