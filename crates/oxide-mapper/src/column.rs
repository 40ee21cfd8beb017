//! Column declarations.
//!
//! A column ties a name to an accessor on the entity and a converter for its
//! value type. Columns are declared with [`col`] and appended to a table's
//! column list by [`ColumnsBuilder`](crate::ColumnsBuilder), which hands back a
//! typed [`Column`] handle used to read values out of a
//! [`ValueHolder`](crate::ValueHolder).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use oxide_bind::SqlValue;

use crate::converter::Converter;
use crate::error::ConvertError;

type Accessor<E, V> = Arc<dyn Fn(&E) -> V + Send + Sync>;
type MapConverter<V> = Arc<dyn Fn(&str) -> Result<V, ConvertError> + Send + Sync>;

/// An unfinished column declaration.
pub struct ColumnSpec<E, V> {
    pub(crate) name: String,
    pub(crate) accessor: Accessor<E, V>,
    pub(crate) id: bool,
    pub(crate) default: Option<V>,
    pub(crate) converter: Option<Arc<dyn Converter<V>>>,
    pub(crate) map_converter: Option<MapConverter<V>>,
}

/// Starts declaring a column named `name` whose value is read with `accessor`.
pub fn col<E, V>(
    name: impl Into<String>,
    accessor: impl Fn(&E) -> V + Send + Sync + 'static,
) -> ColumnSpec<E, V> {
    ColumnSpec {
        name: name.into(),
        accessor: Arc::new(accessor),
        id: false,
        default: None,
        converter: None,
        map_converter: None,
    }
}

impl<E, V> ColumnSpec<E, V> {
    /// Marks the column as part of the identity.
    #[must_use]
    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Sets the value used by [`Table::default_entity`](crate::Table::default_entity)
    /// and for keys missing from a map.
    #[must_use]
    pub fn default(mut self, value: V) -> Self {
        self.default = Some(value);
        self
    }

    /// Uses `converter` instead of the registry's.
    #[must_use]
    pub fn converter(mut self, converter: impl Converter<V> + 'static) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    /// Parses map values with `f` in [`Table::map_mapper`](crate::Table::map_mapper).
    #[must_use]
    pub fn map_converter(
        mut self,
        f: impl Fn(&str) -> Result<V, ConvertError> + Send + Sync + 'static,
    ) -> Self {
        self.map_converter = Some(Arc::new(f));
        self
    }
}

/// A column value paired with its column name.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    /// Column name.
    pub column: String,
    /// Encoded value.
    pub value: SqlValue,
    /// Whether the column is part of the identity.
    pub id: bool,
}

/// A declared column of a table over `E` holding `V`.
pub struct Column<E, V> {
    name: String,
    index: usize,
    id: bool,
    accessor: Accessor<E, V>,
    converter: Arc<dyn Converter<V>>,
}

impl<E, V> Column<E, V> {
    pub(crate) fn new(
        name: String,
        index: usize,
        id: bool,
        accessor: Accessor<E, V>,
        converter: Arc<dyn Converter<V>>,
    ) -> Self {
        Self {
            name,
            index,
            id,
            accessor,
            converter,
        }
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in declaration order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether the column is part of the identity.
    #[must_use]
    pub const fn is_id(&self) -> bool {
        self.id
    }

    /// Reads this column's value from an entity.
    #[must_use]
    pub fn get(&self, entity: &E) -> V {
        (self.accessor)(entity)
    }

    /// Encodes `value` as this column's value.
    #[must_use]
    pub fn of(&self, value: &V) -> ColumnValue {
        ColumnValue {
            column: self.name.clone(),
            value: self.converter.encode(value),
            id: self.id,
        }
    }

    pub(crate) fn converter(&self) -> &dyn Converter<V> {
        self.converter.as_ref()
    }
}

impl<E, V> Clone for Column<E, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            index: self.index,
            id: self.id,
            accessor: Arc::clone(&self.accessor),
            converter: Arc::clone(&self.converter),
        }
    }
}

impl<E, V> fmt::Debug for Column<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A column with its value type erased, as stored in a table's column list.
pub(crate) trait ColumnDef<E>: Send + Sync {
    fn name(&self) -> &str;

    fn is_id(&self) -> bool;

    /// Decodes a row cell.
    fn read(&self, cell: &SqlValue) -> Result<Box<dyn Any>, ConvertError>;

    /// Encodes this column's value of `entity`.
    fn encode(&self, entity: &E) -> SqlValue;

    /// Parses a plain map value.
    fn parse(&self, text: &str) -> Result<Box<dyn Any>, ConvertError>;

    fn default_slot(&self) -> Option<Box<dyn Any>>;
}

pub(crate) struct Definition<E, V> {
    pub(crate) column: Column<E, V>,
    pub(crate) default: Option<V>,
    pub(crate) map_converter: Option<MapConverter<V>>,
}

impl<E, V> ColumnDef<E> for Definition<E, V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.column.name()
    }

    fn is_id(&self) -> bool {
        self.column.is_id()
    }

    fn read(&self, cell: &SqlValue) -> Result<Box<dyn Any>, ConvertError> {
        let value = self.column.converter().decode(cell)?;
        Ok(Box::new(value))
    }

    fn encode(&self, entity: &E) -> SqlValue {
        self.column.converter().encode(&self.column.get(entity))
    }

    fn parse(&self, text: &str) -> Result<Box<dyn Any>, ConvertError> {
        let value = match &self.map_converter {
            Some(map_converter) => map_converter(text)?,
            None => parse_with(self.column.converter(), text)?,
        };
        Ok(Box::new(value))
    }

    fn default_slot(&self) -> Option<Box<dyn Any>> {
        self.default
            .clone()
            .map(|value| Box::new(value) as Box<dyn Any>)
    }
}

/// Decodes map text with a row converter.
///
/// The text is offered as a text cell first, then as an integer, a float and
/// a boolean when it parses as one. The first error is reported if nothing
/// decodes.
fn parse_with<V>(converter: &dyn Converter<V>, text: &str) -> Result<V, ConvertError> {
    let first = match converter.decode(&SqlValue::Text(text.to_string())) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    let candidates = [
        text.parse::<i64>().ok().map(SqlValue::Int),
        text.parse::<f64>().ok().map(SqlValue::Float),
        text.parse::<bool>().ok().map(SqlValue::Bool),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|cell| converter.decode(&cell).ok())
        .ok_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter;

    struct Actor {
        id: i64,
    }

    fn id_column() -> Column<Actor, i64> {
        Column::new(
            String::from("actor_id"),
            0,
            true,
            Arc::new(|a: &Actor| a.id),
            Arc::new(converter::i64_converter()),
        )
    }

    #[test]
    fn test_column_value() {
        let column = id_column();
        assert_eq!(column.get(&Actor { id: 3 }), 3);
        assert_eq!(
            column.of(&3),
            ColumnValue {
                column: String::from("actor_id"),
                value: SqlValue::Int(3),
                id: true,
            }
        );
    }

    #[test]
    fn test_parse_falls_back_to_numbers() {
        let definition = Definition {
            column: id_column(),
            default: None,
            map_converter: None,
        };
        let parsed = definition.parse("42").unwrap();
        assert_eq!(parsed.downcast_ref::<i64>(), Some(&42));

        let err = definition.parse("forty-two").err().unwrap();
        assert_eq!(
            err,
            ConvertError::TypeMismatch {
                expected: "int",
                found: "text"
            }
        );
    }

    #[test]
    fn test_map_converter_takes_precedence() {
        let definition = Definition {
            column: id_column(),
            default: Some(7),
            map_converter: Some(Arc::new(|s: &str| -> Result<i64, ConvertError> {
                Ok(i64::try_from(s.len()).unwrap_or(0))
            })),
        };
        let parsed = definition.parse("abcd").unwrap();
        assert_eq!(parsed.downcast_ref::<i64>(), Some(&4));
        let default = definition.default_slot().unwrap();
        assert_eq!(default.downcast_ref::<i64>(), Some(&7));
    }
}
