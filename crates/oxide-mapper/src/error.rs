//! Error types for the mapper.

use oxide_bind::BindError;
use thiserror::Error;

use crate::registry::TypeDescriptor;

/// A single cell could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// A null cell was read into a non-optional value.
    #[error("unexpected null")]
    UnexpectedNull,

    /// The cell holds a different kind of value.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// What the converter accepts.
        expected: &'static str,
        /// What the cell held.
        found: &'static str,
    },

    /// An encoded enum collection contained an unknown name.
    #[error("unknown {type_name} value '{token}'")]
    UnknownEnumToken {
        /// The offending token.
        token: String,
        /// The enum being decoded.
        type_name: &'static str,
    },

    /// Text could not be parsed into the target type.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Mapper errors.
#[derive(Debug, Error)]
pub enum MapperError {
    /// Database error from sqlx, passed through unchanged.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Template expansion failed.
    #[error("binding error: {0}")]
    Bind(#[from] BindError),

    /// No converter could be found or synthesized for a declared type.
    #[error("no converter registered for {descriptor}{}", column_suffix(.column.as_deref()))]
    ConverterNotRegistered {
        /// The declared type.
        descriptor: TypeDescriptor,
        /// The column being declared, when known.
        column: Option<String>,
    },

    /// A column declared without an inferable type has no converter.
    #[error("column '{column}' has no converter")]
    MissingConverter {
        /// Column name.
        column: String,
    },

    /// Two columns of one table share a name.
    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// An entity was constructed without a value for a column.
    #[error("no value for column '{column}'")]
    MissingValue {
        /// Column name.
        column: String,
    },

    /// A row does not contain a column the table reads.
    #[error("row has no column '{column}'")]
    MissingColumn {
        /// Column name.
        column: String,
    },

    /// A cell could not be converted for a column.
    #[error("column '{column}': {source}")]
    Convert {
        /// Column name.
        column: String,
        /// The underlying conversion failure.
        #[source]
        source: ConvertError,
    },

    /// The driver cannot bind this kind of value.
    #[error("cannot bind {0} value")]
    UnsupportedBind(&'static str),

    /// No object found matching the query.
    #[error("object not found")]
    NotFound,
}

fn column_suffix(column: Option<&str>) -> String {
    column.map_or_else(String::new, |c| format!(" (column '{c}')"))
}

/// Result type alias for mapper operations.
pub type Result<T> = std::result::Result<T, MapperError>;
