//! Per-row column values handed to [`Table::create`](crate::Table::create).

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::column::Column;
use crate::error::{MapperError, Result};
use crate::table::Columns;

/// Resolved values for one entity, indexed by column.
pub struct ValueHolder<E> {
    names: Vec<String>,
    slots: Vec<Option<Box<dyn Any>>>,
    _marker: PhantomData<fn() -> E>,
}

impl<E> ValueHolder<E> {
    /// An empty holder for the given column list.
    #[must_use]
    pub fn new(columns: &Columns<E>) -> Self {
        let names: Vec<String> = columns.names().map(str::to_string).collect();
        let slots = names.iter().map(|_| None).collect();
        Self {
            names,
            slots,
            _marker: PhantomData,
        }
    }

    /// The value of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingValue`] if the column has no value.
    pub fn of<V: Clone + 'static>(&self, column: &Column<E, V>) -> Result<V> {
        self.slots
            .get(column.index())
            .and_then(Option::as_ref)
            .and_then(|slot| slot.downcast_ref::<V>())
            .cloned()
            .ok_or_else(|| MapperError::MissingValue {
                column: column.name().to_string(),
            })
    }

    /// Sets the value of `column`.
    pub fn set<V: 'static>(&mut self, column: &Column<E, V>, value: V) {
        self.put(column.index(), Box::new(value));
    }

    /// Whether `column` has a value.
    #[must_use]
    pub fn contains<V>(&self, column: &Column<E, V>) -> bool {
        matches!(self.slots.get(column.index()), Some(Some(_)))
    }

    pub(crate) fn put(&mut self, index: usize, value: Box<dyn Any>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(value);
        }
    }

    /// Checks that every column has a value.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::MissingValue`] naming the first empty column.
    pub fn ensure_complete(&self) -> Result<()> {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => Err(MapperError::MissingValue {
                column: self.names[index].clone(),
            }),
            None => Ok(()),
        }
    }
}

impl<E> fmt::Debug for ValueHolder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = self
            .names
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.is_some())
            .map(|(name, _)| name.as_str())
            .collect();
        f.debug_struct("ValueHolder")
            .field("columns", &self.names)
            .field("set", &set)
            .finish()
    }
}
