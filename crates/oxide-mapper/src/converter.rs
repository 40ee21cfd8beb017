//! Bidirectional converters between raw cells and typed values.
//!
//! A converter is pure: `decode` turns a cell read from a row into a typed
//! value, `encode` turns a typed value back into a `SqlValue` for binding.
//! For every non-null value `decode(&encode(v)) == v`.

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use oxide_bind::SqlValue;
use uuid::Uuid;

use crate::error::ConvertError;
use crate::registry::SqlEnum;

/// Maps between a raw cell and a typed value.
pub trait Converter<T>: Send + Sync {
    /// Converts a cell read from a row.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] if the cell is null or of the wrong kind.
    fn decode(&self, cell: &SqlValue) -> Result<T, ConvertError>;

    /// Converts a value for binding.
    fn encode(&self, value: &T) -> SqlValue;
}

type DecodeFn<T> = dyn Fn(&SqlValue) -> Result<T, ConvertError> + Send + Sync;
type EncodeFn<T> = dyn Fn(&T) -> SqlValue + Send + Sync;

/// A converter built from a pair of functions.
///
/// ```rust
/// use oxide_bind::SqlValue;
/// use oxide_mapper::{Converter, SimpleConverter};
///
/// let shouting = SimpleConverter::new(
///     |cell| match cell {
///         SqlValue::Text(s) => Ok(s.to_lowercase()),
///         other => Err(oxide_mapper::ConvertError::TypeMismatch {
///             expected: "text",
///             found: other.kind(),
///         }),
///     },
///     |value: &String| SqlValue::Text(value.to_uppercase()),
/// );
/// assert_eq!(shouting.encode(&String::from("abc")), SqlValue::Text(String::from("ABC")));
/// ```
pub struct SimpleConverter<T> {
    decode: Box<DecodeFn<T>>,
    encode: Box<EncodeFn<T>>,
}

impl<T> SimpleConverter<T> {
    /// Creates a converter from a decode and an encode function.
    pub fn new<D, E>(decode: D, encode: E) -> Self
    where
        D: Fn(&SqlValue) -> Result<T, ConvertError> + Send + Sync + 'static,
        E: Fn(&T) -> SqlValue + Send + Sync + 'static,
    {
        Self {
            decode: Box::new(decode),
            encode: Box::new(encode),
        }
    }
}

impl<T> Converter<T> for SimpleConverter<T> {
    fn decode(&self, cell: &SqlValue) -> Result<T, ConvertError> {
        (self.decode)(cell)
    }

    fn encode(&self, value: &T) -> SqlValue {
        (self.encode)(value)
    }
}

fn mismatch(expected: &'static str, cell: &SqlValue) -> ConvertError {
    if cell.is_null() {
        ConvertError::UnexpectedNull
    } else {
        ConvertError::TypeMismatch {
            expected,
            found: cell.kind(),
        }
    }
}

pub(crate) fn bool_converter() -> SimpleConverter<bool> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(n) => Ok(*n != 0),
            other => Err(mismatch("bool", other)),
        },
        |value| SqlValue::Bool(*value),
    )
}

pub(crate) fn i64_converter() -> SimpleConverter<i64> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Int(n) => Ok(*n),
            other => Err(mismatch("int", other)),
        },
        |value| SqlValue::Int(*value),
    )
}

pub(crate) fn i32_converter() -> SimpleConverter<i32> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Int(n) => {
                i32::try_from(*n).map_err(|_| ConvertError::Parse(format!("{n} overflows i32")))
            }
            other => Err(mismatch("int", other)),
        },
        |value| SqlValue::Int(i64::from(*value)),
    )
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn f64_converter() -> SimpleConverter<f64> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Float(f) => Ok(*f),
            SqlValue::Int(n) => Ok(*n as f64),
            other => Err(mismatch("float", other)),
        },
        |value| SqlValue::Float(*value),
    )
}

pub(crate) fn string_converter() -> SimpleConverter<String> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(mismatch("text", other)),
        },
        |value| SqlValue::Text(value.clone()),
    )
}

pub(crate) fn bytes_converter() -> SimpleConverter<Vec<u8>> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Blob(b) => Ok(b.clone()),
            other => Err(mismatch("blob", other)),
        },
        |value| SqlValue::Blob(value.clone()),
    )
}

pub(crate) fn date_converter() -> SimpleConverter<NaiveDate> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Date(d) => Ok(*d),
            SqlValue::Text(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| ConvertError::Parse(format!("date '{s}': {e}"))),
            other => Err(mismatch("date", other)),
        },
        |value| SqlValue::Date(*value),
    )
}

pub(crate) fn time_converter() -> SimpleConverter<NaiveTime> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Time(t) => Ok(*t),
            SqlValue::Text(s) => NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
                .map_err(|e| ConvertError::Parse(format!("time '{s}': {e}"))),
            other => Err(mismatch("time", other)),
        },
        |value| SqlValue::Time(*value),
    )
}

pub(crate) fn timestamp_converter() -> SimpleConverter<NaiveDateTime> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Timestamp(ts) => Ok(*ts),
            SqlValue::Text(s) => parse_timestamp(s),
            other => Err(mismatch("timestamp", other)),
        },
        |value| SqlValue::Timestamp(*value),
    )
}

/// Accepts both the space and the ISO `T` separator.
fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ConvertError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| ConvertError::Parse(format!("timestamp '{s}': {e}")))
}

pub(crate) fn uuid_converter() -> SimpleConverter<Uuid> {
    SimpleConverter::new(
        |cell| match cell {
            SqlValue::Text(s) => {
                Uuid::parse_str(s).map_err(|e| ConvertError::Parse(format!("uuid '{s}': {e}")))
            }
            SqlValue::Blob(b) => {
                Uuid::from_slice(b).map_err(|e| ConvertError::Parse(format!("uuid: {e}")))
            }
            other => Err(mismatch("uuid", other)),
        },
        |value| SqlValue::Text(value.hyphenated().to_string()),
    )
}

/// Wraps a converter so that null cells map to `None`.
pub struct OptionalConverter<T> {
    inner: Arc<dyn Converter<T>>,
}

impl<T> OptionalConverter<T> {
    /// Wraps `inner`.
    pub fn new(inner: Arc<dyn Converter<T>>) -> Self {
        Self { inner }
    }
}

impl<T> Converter<Option<T>> for OptionalConverter<T> {
    fn decode(&self, cell: &SqlValue) -> Result<Option<T>, ConvertError> {
        if cell.is_null() {
            Ok(None)
        } else {
            self.inner.decode(cell).map(Some)
        }
    }

    fn encode(&self, value: &Option<T>) -> SqlValue {
        value
            .as_ref()
            .map_or(SqlValue::Null, |v| self.inner.encode(v))
    }
}

/// Stores an enum as its name.
pub struct EnumConverter<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> EnumConverter<E> {
    /// Creates a converter for `E`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for EnumConverter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SqlEnum> Converter<E> for EnumConverter<E> {
    fn decode(&self, cell: &SqlValue) -> Result<E, ConvertError> {
        match cell {
            SqlValue::Text(s) => E::from_name(s).ok_or_else(|| ConvertError::UnknownEnumToken {
                token: s.clone(),
                type_name: E::TYPE_NAME,
            }),
            other => Err(mismatch("text", other)),
        }
    }

    fn encode(&self, value: &E) -> SqlValue {
        SqlValue::Text(value.name().to_string())
    }
}

/// Stores a set of enums as element names joined by a delimiter.
///
/// The empty set is stored as the empty string and decodes back to the
/// empty set. Element names must be non-empty and free of the delimiter;
/// [`sql_enum!`](crate::sql_enum) enforces this for `|` at compile time.
/// An element converter that does not encode to text is bypassed and the
/// variant name stored instead.
pub struct EnumSetConverter<E> {
    element: Arc<dyn Converter<E>>,
    delimiter: char,
}

impl<E> EnumSetConverter<E> {
    /// The delimiter used by inferred converters.
    pub const DEFAULT_DELIMITER: char = '|';

    /// Builds a set converter over `element`.
    pub fn new(element: Arc<dyn Converter<E>>, delimiter: char) -> Self {
        Self { element, delimiter }
    }
}

impl<E: SqlEnum + Ord> Converter<BTreeSet<E>> for EnumSetConverter<E> {
    fn decode(&self, cell: &SqlValue) -> Result<BTreeSet<E>, ConvertError> {
        let text = match cell {
            SqlValue::Text(s) => s,
            other => return Err(mismatch("text", other)),
        };
        if text.is_empty() {
            return Ok(BTreeSet::new());
        }
        text.split(self.delimiter)
            .map(|token| self.element.decode(&SqlValue::Text(token.to_string())))
            .collect()
    }

    fn encode(&self, value: &BTreeSet<E>) -> SqlValue {
        let names: Vec<String> = value
            .iter()
            .map(|e| match self.element.encode(e) {
                SqlValue::Text(s) => s,
                _ => e.name().to_string(),
            })
            .collect();
        SqlValue::Text(names.join(&self.delimiter.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_enum;

    sql_enum! {
        enum ThreadState {
            New = "NEW",
            Runnable = "RUNNABLE",
            Waiting = "WAITING",
        }
    }

    fn enum_set() -> EnumSetConverter<ThreadState> {
        EnumSetConverter::new(
            Arc::new(EnumConverter::<ThreadState>::new()),
            EnumSetConverter::<ThreadState>::DEFAULT_DELIMITER,
        )
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn test_enum_set_encoding() {
        let converter = enum_set();
        assert_eq!(converter.encode(&BTreeSet::new()), text(""));
        assert_eq!(
            converter.encode(&BTreeSet::from([ThreadState::Runnable])),
            text("RUNNABLE")
        );
        assert_eq!(
            converter.encode(&BTreeSet::from([ThreadState::Waiting, ThreadState::Runnable])),
            text("RUNNABLE|WAITING")
        );
    }

    #[test]
    fn test_enum_set_decoding() {
        let converter = enum_set();
        assert_eq!(converter.decode(&text("")).unwrap(), BTreeSet::new());
        assert_eq!(
            converter.decode(&text("RUNNABLE|WAITING")).unwrap(),
            BTreeSet::from([ThreadState::Runnable, ThreadState::Waiting])
        );
    }

    #[test]
    fn test_enum_set_round_trip() {
        let converter = enum_set();
        for set in [
            BTreeSet::new(),
            BTreeSet::from([ThreadState::New]),
            BTreeSet::from([ThreadState::New, ThreadState::Runnable, ThreadState::Waiting]),
        ] {
            assert_eq!(converter.decode(&converter.encode(&set)).unwrap(), set);
        }
    }

    #[test]
    fn test_enum_set_custom_delimiter() {
        let converter = EnumSetConverter::new(Arc::new(EnumConverter::<ThreadState>::new()), ',');
        let set = BTreeSet::from([ThreadState::New, ThreadState::Waiting]);
        assert_eq!(converter.encode(&set), text("NEW,WAITING"));
        assert_eq!(converter.decode(&text("NEW,WAITING")).unwrap(), set);
    }

    #[test]
    fn test_enum_set_stores_names_for_non_text_elements() {
        let by_index = SimpleConverter::new(
            |cell: &SqlValue| match cell {
                SqlValue::Int(0) => Ok(ThreadState::New),
                _ => Ok(ThreadState::Waiting),
            },
            |state: &ThreadState| SqlValue::Int(i64::from(*state != ThreadState::New)),
        );
        let converter = EnumSetConverter::new(Arc::new(by_index), '|');
        assert_eq!(
            converter.encode(&BTreeSet::from([ThreadState::New, ThreadState::Waiting])),
            text("NEW|WAITING")
        );
    }

    #[test]
    fn test_enum_set_unknown_token() {
        let err = enum_set().decode(&text("RUNNABLE|SLEEPING")).unwrap_err();
        assert_eq!(
            err,
            ConvertError::UnknownEnumToken {
                token: String::from("SLEEPING"),
                type_name: "ThreadState",
            }
        );
    }

    #[test]
    fn test_optional_converter() {
        let converter = OptionalConverter::new(Arc::new(i64_converter()));
        assert_eq!(converter.decode(&SqlValue::Null).unwrap(), None);
        assert_eq!(converter.decode(&SqlValue::Int(4)).unwrap(), Some(4));
        assert_eq!(converter.encode(&None), SqlValue::Null);
        assert_eq!(converter.encode(&Some(4)), SqlValue::Int(4));
    }

    #[test]
    fn test_null_into_required_value() {
        assert_eq!(
            string_converter().decode(&SqlValue::Null).unwrap_err(),
            ConvertError::UnexpectedNull
        );
        assert_eq!(
            i64_converter().decode(&text("x")).unwrap_err(),
            ConvertError::TypeMismatch {
                expected: "int",
                found: "text"
            }
        );
    }

    #[test]
    fn test_sqlite_storage_forms() {
        assert!(bool_converter().decode(&SqlValue::Int(1)).unwrap());
        assert_eq!(f64_converter().decode(&SqlValue::Int(3)).unwrap(), 3.0);
        let ts = timestamp_converter()
            .decode(&text("2015-03-01 10:30:00.5"))
            .unwrap();
        assert_eq!(ts.to_string(), "2015-03-01 10:30:00.500");
        assert!(timestamp_converter()
            .decode(&text("2015-03-01T10:30:00"))
            .is_ok());
        assert!(i32_converter().decode(&SqlValue::Int(i64::MAX)).is_err());
    }

    #[test]
    fn test_primitive_round_trips() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        let time = NaiveTime::from_hms_milli_opt(23, 59, 1, 5).unwrap();
        let id = Uuid::new_v4();
        assert!(bool_converter().decode(&bool_converter().encode(&true)).unwrap());
        assert_eq!(i32_converter().decode(&i32_converter().encode(&-7)).unwrap(), -7);
        assert_eq!(
            bytes_converter()
                .decode(&bytes_converter().encode(&vec![0, 255]))
                .unwrap(),
            vec![0, 255]
        );
        assert_eq!(date_converter().decode(&date_converter().encode(&date)).unwrap(), date);
        assert_eq!(time_converter().decode(&time_converter().encode(&time)).unwrap(), time);
        assert_eq!(uuid_converter().decode(&uuid_converter().encode(&id)).unwrap(), id);
    }
}
