//! Generic SQL dialect.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{join_bound, Dialect};
use crate::value::SqlValue;

/// A generic SQL dialect using ANSI SQL standards.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn bind_date(&self, date: &NaiveDate) -> String {
        format!("DATE '{}'", date.format("%Y-%m-%d"))
    }

    fn bind_time(&self, time: &NaiveTime) -> String {
        format!("TIME '{}'", time.format("%H:%M:%S"))
    }

    fn bind_timestamp(&self, ts: &NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.3f"))
    }

    fn bind_array(&self, values: &[SqlValue], limit: usize) -> String {
        format!("ARRAY[{}]", join_bound(self, values, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_dialect() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.name(), "generic");
        assert_eq!(dialect.identifier_quote(), '"');
        assert_eq!(dialect.placeholder(3), "?");
        assert!(!dialect.supports_array_based_in());
        assert!(!dialect.supports_allocate_ids());
        assert_eq!(dialect.allocate_ids(5, "seq", "id"), None);
    }

    #[test]
    fn test_generic_temporal_literals() {
        let dialect = GenericDialect::new();
        let date = NaiveDate::from_ymd_opt(2015, 3, 1).unwrap();
        let ts = date.and_hms_milli_opt(10, 30, 0, 250).unwrap();
        assert_eq!(dialect.bind(&SqlValue::Date(date), 10), "DATE '2015-03-01'");
        assert_eq!(
            dialect.bind(&SqlValue::Time(ts.time()), 10),
            "TIME '10:30:00'"
        );
        assert_eq!(
            dialect.bind(&SqlValue::Timestamp(ts), 10),
            "TIMESTAMP '2015-03-01 10:30:00.250'"
        );
    }

    #[test]
    fn test_generic_blob_is_hex() {
        let dialect = GenericDialect::new();
        assert_eq!(
            dialect.bind(&SqlValue::Blob(vec![0x48, 0x45, 0x4C, 0x4C, 0x4F]), 100),
            "X'48454C4C4F'"
        );
        assert_eq!(dialect.bind(&SqlValue::Blob(vec![0x48, 0x45, 0x4C]), 1), "X'48'");
    }

    #[test]
    fn test_generic_array_literal() {
        let dialect = GenericDialect::new();
        let value = SqlValue::Array(vec![SqlValue::Int(1), SqlValue::Null]);
        assert_eq!(dialect.bind(&value, 10), "ARRAY[1, null]");
    }
}
