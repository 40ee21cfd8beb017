//! SQL Dialect support.
//!
//! Different databases format literals, placeholders and identifiers
//! differently, and only some of them can bind a collection as a single array
//! parameter. A dialect is a stateless strategy: construct it once and share it.

mod generic;
mod mysql;
mod postgres;
mod sqlite;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub use generic::GenericDialect;
pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::value::SqlValue;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling any embedded quote character.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(quote);
        for c in name.chars() {
            if c == quote {
                quoted.push(quote);
            }
            quoted.push(c);
        }
        quoted.push(quote);
        quoted
    }

    /// Returns the positional placeholder for the 1-based bind `position`.
    fn placeholder(&self, _position: usize) -> String {
        String::from("?")
    }

    /// Renders `value` as a SQL literal.
    ///
    /// Strings and byte sequences are truncated to `limit` (characters and
    /// bytes respectively) before they are escaped or encoded.
    fn bind(&self, value: &SqlValue, limit: usize) -> String {
        match value {
            SqlValue::Null => String::from("null"),
            SqlValue::Bool(b) => self.bind_bool(*b),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => escape_single_quoted(truncate_chars(s, limit)),
            SqlValue::Blob(bytes) => self.bind_bytes(truncate_bytes(bytes, limit)),
            SqlValue::Date(date) => self.bind_date(date),
            SqlValue::Time(time) => self.bind_time(time),
            SqlValue::Timestamp(ts) => self.bind_timestamp(ts),
            SqlValue::Array(values) => self.bind_array(values, limit),
        }
    }

    /// Boolean literal.
    fn bind_bool(&self, value: bool) -> String {
        value.to_string()
    }

    /// Literal for already truncated bytes.
    fn bind_bytes(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex(bytes))
    }

    /// Date literal.
    fn bind_date(&self, date: &NaiveDate) -> String {
        format!("'{}'", date.format("%Y-%m-%d"))
    }

    /// Time literal.
    fn bind_time(&self, time: &NaiveTime) -> String {
        format!("'{}'", time.format("%H:%M:%S"))
    }

    /// Timestamp literal.
    fn bind_timestamp(&self, ts: &NaiveDateTime) -> String {
        format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.3f"))
    }

    /// Array literal; each element is bound with the same limit.
    fn bind_array(&self, values: &[SqlValue], limit: usize) -> String {
        format!("array[{}]", join_bound(self, values, limit))
    }

    /// Returns whether collections may be bound as a single native array.
    fn supports_array_based_in(&self) -> bool {
        false
    }

    /// The fragment replacing `in (<placeholder>)` when arrays are supported.
    fn array_based_in(&self, placeholder: &str) -> String {
        format!("= any({placeholder})")
    }

    /// The fragment replacing `not in (<placeholder>)` when arrays are supported.
    fn array_based_not_in(&self, placeholder: &str) -> String {
        format!("<> all({placeholder})")
    }

    /// Replaces the placeholder list of an empty collection. Must select no
    /// rows inside `in (...)`.
    fn empty_in_list(&self) -> &'static str {
        "select null where 1 = 0"
    }

    /// Returns whether a batch of sequence values can be fetched in one query.
    fn supports_allocate_ids(&self) -> bool {
        false
    }

    /// SQL allocating `count` ids from `sequence`, returned under `column`.
    fn allocate_ids(&self, _count: usize, _sequence: &str, _column: &str) -> Option<String> {
        None
    }

    /// Returns whether generated keys can be fetched by column name.
    fn supports_fetching_generated_keys_by_name(&self) -> bool {
        false
    }
}

/// Wraps `value` in single quotes, doubling embedded quotes.
#[must_use]
pub fn escape_single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Returns at most the first `limit` characters of `value`.
#[must_use]
pub fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Returns at most the first `limit` bytes of `bytes`.
#[must_use]
pub fn truncate_bytes(bytes: &[u8], limit: usize) -> &[u8] {
    &bytes[..bytes.len().min(limit)]
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

fn join_bound<D: Dialect + ?Sized>(dialect: &D, values: &[SqlValue], limit: usize) -> String {
    values
        .iter()
        .map(|v| dialect.bind(v, limit))
        .collect::<Vec<_>>()
        .join(", ")
}
