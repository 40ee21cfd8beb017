//! Tables: ordered column lists and entity construction.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::column::{Column, ColumnDef, ColumnSpec, ColumnValue, Definition};
use crate::converter::Converter;
use crate::error::{MapperError, Result};
use crate::registry::{ConverterRegistry, Declared};
use crate::row::Row;
use crate::value::ValueHolder;

/// The immutable, ordered column list of a table.
pub struct Columns<E> {
    table: String,
    defs: Vec<Box<dyn ColumnDef<E>>>,
}

impl<E> Columns<E> {
    /// The table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column names in declaration order.
    #[must_use]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|def| def.name())
    }

    /// Names of the identity columns in declaration order.
    #[must_use]
    pub fn id_names(&self) -> impl Iterator<Item = &str> {
        self.defs
            .iter()
            .filter(|def| def.is_id())
            .map(|def| def.name())
    }

    /// Number of declared columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no column is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub(crate) fn defs(&self) -> &[Box<dyn ColumnDef<E>>] {
        &self.defs
    }
}

impl<E> fmt::Debug for Columns<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Columns")
            .field("table", &self.table)
            .field("columns", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Appends column declarations to a table's column list.
///
/// Converters are resolved when a column is declared, so an unregistered
/// type fails here rather than on the first read.
pub struct ColumnsBuilder<'r, E> {
    table: String,
    registry: &'r ConverterRegistry,
    defs: Vec<Box<dyn ColumnDef<E>>>,
}

impl<'r, E: 'static> ColumnsBuilder<'r, E> {
    /// Starts the column list of `table`.
    #[must_use]
    pub fn new(table: impl Into<String>, registry: &'r ConverterRegistry) -> Self {
        Self {
            table: table.into(),
            registry,
            defs: Vec::new(),
        }
    }

    /// Declares a column of a registered type.
    ///
    /// Without an explicit converter one is inferred from the registry.
    /// Without an explicit default the type's fallback is used.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::ConverterNotRegistered`] naming the column if
    /// no converter is known, or [`MapperError::DuplicateColumn`].
    pub fn col<V>(&mut self, spec: ColumnSpec<E, V>) -> Result<Column<E, V>>
    where
        V: Declared + Clone + Send + Sync,
    {
        let converter = match spec.converter.clone() {
            Some(converter) => converter,
            None => V::infer(self.registry).map_err(|e| match e {
                MapperError::ConverterNotRegistered { descriptor, .. } => {
                    MapperError::ConverterNotRegistered {
                        descriptor,
                        column: Some(spec.name.clone()),
                    }
                }
                other => other,
            })?,
        };
        let default = spec.default.clone().or_else(V::fallback);
        self.push(spec, converter, default)
    }

    /// Declares a column of a type the registry does not know about.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingConverter`] if the declaration has no
    /// converter, or [`MapperError::DuplicateColumn`].
    pub fn custom<V>(&mut self, spec: ColumnSpec<E, V>) -> Result<Column<E, V>>
    where
        V: Clone + Send + Sync + 'static,
    {
        let converter = spec
            .converter
            .clone()
            .ok_or_else(|| MapperError::MissingConverter {
                column: spec.name.clone(),
            })?;
        let default = spec.default.clone();
        self.push(spec, converter, default)
    }

    fn push<V>(
        &mut self,
        spec: ColumnSpec<E, V>,
        converter: Arc<dyn Converter<V>>,
        default: Option<V>,
    ) -> Result<Column<E, V>>
    where
        V: Clone + Send + Sync + 'static,
    {
        if self.defs.iter().any(|def| def.name() == spec.name) {
            return Err(MapperError::DuplicateColumn {
                table: self.table.clone(),
                column: spec.name,
            });
        }
        let column = Column::new(
            spec.name,
            self.defs.len(),
            spec.id,
            spec.accessor,
            converter,
        );
        self.defs.push(Box::new(Definition {
            column: column.clone(),
            default,
            map_converter: spec.map_converter,
        }));
        Ok(column)
    }

    /// Finishes the column list.
    #[must_use]
    pub fn build(self) -> Columns<E> {
        trace!(table = %self.table, columns = self.defs.len(), "declared table");
        Columns {
            table: self.table,
            defs: self.defs,
        }
    }
}

/// Maps rows of one table to entities of type `Entity`.
///
/// Implementors declare their columns once and provide the identity
/// predicate and the constructor; reading rows, encoding entities and plain
/// map decoding are provided.
///
/// ```rust
/// use oxide_mapper::{
///     col, Column, Columns, ColumnsBuilder, ColumnValue, ConverterRegistry, Result,
///     SqlValue, Table, ValueHolder,
/// };
/// use std::collections::HashMap;
///
/// #[derive(Debug, PartialEq)]
/// struct Language {
///     id: i64,
///     name: String,
/// }
///
/// struct LanguageTable {
///     columns: Columns<Language>,
///     id: Column<Language, i64>,
///     name: Column<Language, String>,
/// }
///
/// impl LanguageTable {
///     fn new(registry: &ConverterRegistry) -> Result<Self> {
///         let mut builder = ColumnsBuilder::new("language", registry);
///         let id = builder.col(col("language_id", |l: &Language| l.id).id())?;
///         let name = builder.col(col("name", |l: &Language| l.name.clone()))?;
///         Ok(Self { columns: builder.build(), id, name })
///     }
/// }
///
/// impl Table for LanguageTable {
///     type Entity = Language;
///     type Id = i64;
///
///     fn columns(&self) -> &Columns<Language> {
///         &self.columns
///     }
///
///     fn id_columns(&self, id: &i64) -> Vec<ColumnValue> {
///         vec![self.id.of(id)]
///     }
///
///     fn create(&self, values: &ValueHolder<Language>) -> Result<Language> {
///         Ok(Language {
///             id: values.of(&self.id)?,
///             name: values.of(&self.name)?,
///         })
///     }
/// }
///
/// let table = LanguageTable::new(&ConverterRegistry::default()).unwrap();
/// let row = HashMap::from([
///     (String::from("language_id"), SqlValue::Int(1)),
///     (String::from("name"), SqlValue::Text(String::from("English"))),
/// ]);
/// let language = table.read(&row).unwrap();
/// assert_eq!(language, Language { id: 1, name: String::from("English") });
/// ```
pub trait Table: Send + Sync {
    /// The mapped entity.
    type Entity: 'static;

    /// The identity of an entity; a tuple for composite keys.
    type Id;

    /// The declared columns.
    fn columns(&self) -> &Columns<Self::Entity>;

    /// Equality pairs selecting the row with identity `id`.
    fn id_columns(&self, id: &Self::Id) -> Vec<ColumnValue>;

    /// Builds an entity from resolved column values.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is missing.
    fn create(&self, values: &ValueHolder<Self::Entity>) -> Result<Self::Entity>;

    /// The table name.
    fn name(&self) -> &str {
        self.columns().table()
    }

    /// Calls [`create`](Self::create) once every column has a value.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingValue`] naming the first column without
    /// a value.
    fn construct(&self, values: &ValueHolder<Self::Entity>) -> Result<Self::Entity> {
        values.ensure_complete()?;
        self.create(values)
    }

    /// Maps a row to an entity, matching columns by name.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingColumn`] if the row lacks a column and
    /// [`MapperError::Convert`] if a cell cannot be decoded.
    fn read<R: Row + ?Sized>(&self, row: &R) -> Result<Self::Entity> {
        let columns = self.columns();
        let mut values = ValueHolder::new(columns);
        for (index, def) in columns.defs().iter().enumerate() {
            let cell = row.cell(def.name())?;
            let value = def.read(&cell).map_err(|source| MapperError::Convert {
                column: def.name().to_string(),
                source,
            })?;
            values.put(index, value);
        }
        self.construct(&values)
    }

    /// Encodes every column of `entity` in declaration order.
    fn values(&self, entity: &Self::Entity) -> Vec<ColumnValue> {
        self.columns()
            .defs()
            .iter()
            .map(|def| ColumnValue {
                column: def.name().to_string(),
                value: def.encode(entity),
                id: def.is_id(),
            })
            .collect()
    }

    /// Builds an entity from column defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingValue`] for a column without a default.
    fn default_entity(&self) -> Result<Self::Entity> {
        let columns = self.columns();
        let mut values = ValueHolder::new(columns);
        for (index, def) in columns.defs().iter().enumerate() {
            if let Some(value) = def.default_slot() {
                values.put(index, value);
            }
        }
        self.construct(&values)
    }

    /// Returns a function building entities from plain string maps.
    ///
    /// Each column is parsed with its map converter, or with its row
    /// converter when it has none. A key missing from the map takes the
    /// column default.
    fn map_mapper(&self) -> Box<dyn Fn(&HashMap<String, String>) -> Result<Self::Entity> + '_> {
        Box::new(move |map: &HashMap<String, String>| {
            let columns = self.columns();
            let mut values = ValueHolder::new(columns);
            for (index, def) in columns.defs().iter().enumerate() {
                let value = match map.get(def.name()) {
                    Some(text) => Some(def.parse(text).map_err(|source| {
                        MapperError::Convert {
                            column: def.name().to_string(),
                            source,
                        }
                    })?),
                    None => def.default_slot(),
                };
                if let Some(value) = value {
                    values.put(index, value);
                }
            }
            self.construct(&values)
        })
    }
}
