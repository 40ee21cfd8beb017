//! SQL values and named parameters.
//!
//! `SqlValue` is both the raw cell read back from a driver and the typed
//! argument handed to it for binding. `Param` is what a caller binds to a
//! `:name` marker: a single value or a collection of them.

use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A SQL value that can be bound as a parameter or read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
    /// Native array, only produced for dialects that bind collections as arrays.
    Array(Vec<SqlValue>),
}

impl SqlValue {
    /// Returns true for `SqlValue::Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in conversion errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::Timestamp(_) => "timestamp",
            Self::Array(_) => "array",
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! impl_to_sql_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_to_sql_int!(i64, i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Date(self)
    }
}

impl ToSqlValue for NaiveTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Time(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// The value bound to one named parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// A single value; one placeholder.
    Scalar(SqlValue),
    /// A collection; expanded or bound as an array depending on the dialect.
    Collection(Vec<SqlValue>),
}

impl Param {
    /// Creates a scalar parameter.
    pub fn scalar(value: impl ToSqlValue) -> Self {
        Self::Scalar(value.to_sql_value())
    }

    /// Creates a collection parameter, preserving iteration order.
    pub fn collection<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToSqlValue,
    {
        Self::Collection(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// Returns true when the parameter is collection-valued.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

impl<T: ToSqlValue> From<Vec<T>> for Param {
    fn from(values: Vec<T>) -> Self {
        Self::collection(values)
    }
}

impl<T: ToSqlValue + Ord> From<BTreeSet<T>> for Param {
    fn from(values: BTreeSet<T>) -> Self {
        Self::collection(values)
    }
}

/// Named parameters for one statement.
///
/// ```rust
/// use oxide_bind::Params;
///
/// let params = Params::new()
///     .bind("name", "Kate")
///     .bind_all("ids", [1, 2, 3]);
/// assert!(params.get("ids").unwrap().is_collection());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: HashMap<String, Param>,
}

impl Params {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a scalar value to `name`.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl ToSqlValue) -> Self {
        self.values.insert(name.into(), Param::scalar(value));
        self
    }

    /// Binds a collection to `name`.
    #[must_use]
    pub fn bind_all<I>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToSqlValue,
    {
        self.values.insert(name.into(), Param::collection(values));
        self
    }

    /// Inserts an already built parameter.
    pub fn insert(&mut self, name: impl Into<String>, param: Param) {
        self.values.insert(name.into(), param);
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Param> {
        self.values.get(name)
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over the bound names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Param)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Param)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
