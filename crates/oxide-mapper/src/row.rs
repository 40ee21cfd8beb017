//! Raw cell access on result rows.

use std::collections::HashMap;

use oxide_bind::SqlValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row as _, TypeInfo, ValueRef};

use crate::error::{MapperError, Result};

/// A result row whose cells can be read by column name.
pub trait Row {
    /// Returns the raw cell of column `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingColumn`] if the row has no such column.
    fn cell(&self, name: &str) -> Result<SqlValue>;
}

impl Row for HashMap<String, SqlValue> {
    fn cell(&self, name: &str) -> Result<SqlValue> {
        self.get(name)
            .cloned()
            .ok_or_else(|| MapperError::MissingColumn {
                column: name.to_string(),
            })
    }
}

/// Cells are read by their SQLite storage class, so converters see
/// integers, reals, text or blobs whatever the declared column type.
impl Row for SqliteRow {
    fn cell(&self, name: &str) -> Result<SqlValue> {
        let raw = self.try_get_raw(name).map_err(|e| match e {
            sqlx::Error::ColumnNotFound(_) => MapperError::MissingColumn {
                column: name.to_string(),
            },
            other => MapperError::Database(other),
        })?;
        if raw.is_null() {
            return Ok(SqlValue::Null);
        }
        let storage = raw.type_info().name().to_ascii_uppercase();
        let cell = match storage.as_str() {
            "INTEGER" | "BOOLEAN" => SqlValue::Int(self.try_get_unchecked::<i64, _>(name)?),
            "REAL" => SqlValue::Float(self.try_get_unchecked::<f64, _>(name)?),
            "BLOB" => SqlValue::Blob(self.try_get_unchecked::<Vec<u8>, _>(name)?),
            _ => SqlValue::Text(self.try_get_unchecked::<String, _>(name)?),
        };
        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_row() {
        let row = HashMap::from([(String::from("title"), SqlValue::Text(String::from("Alien")))]);
        assert_eq!(
            row.cell("title").unwrap(),
            SqlValue::Text(String::from("Alien"))
        );
        assert!(matches!(
            row.cell("length"),
            Err(MapperError::MissingColumn { column }) if column == "length"
        ));
    }
}
