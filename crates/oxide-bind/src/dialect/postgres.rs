//! PostgreSQL dialect.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::Dialect;

/// PostgreSQL dialect: `$n` placeholders, native arrays and sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn placeholder(&self, position: usize) -> String {
        format!("${position}")
    }

    fn bind_bytes(&self, bytes: &[u8]) -> String {
        format!("decode('{}','base64')", STANDARD.encode(bytes))
    }

    fn supports_array_based_in(&self) -> bool {
        true
    }

    fn supports_allocate_ids(&self) -> bool {
        true
    }

    fn allocate_ids(&self, count: usize, sequence: &str, column: &str) -> Option<String> {
        Some(format!(
            "select nextval('{sequence}') as {column} from generate_series(1, {count})"
        ))
    }

    fn supports_fetching_generated_keys_by_name(&self) -> bool {
        true
    }
}
