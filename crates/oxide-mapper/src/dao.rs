//! Generic CRUD statements for a [`Table`].

use oxide_bind::{Param, Params};
use tracing::debug;

use crate::column::ColumnValue;
use crate::error::{MapperError, Result};
use crate::session::Session;
use crate::table::Table;

/// Data access for one table through a [`Session`].
///
/// Statements are built from the table's column list with quoted
/// identifiers; values go through the columns' converters and are bound as
/// named parameters.
#[derive(Debug)]
pub struct Dao<'a, T> {
    session: &'a Session,
    table: &'a T,
}

impl<'a, T: Table> Dao<'a, T> {
    /// Binds `table` to `session`.
    #[must_use]
    pub const fn new(session: &'a Session, table: &'a T) -> Self {
        Self { session, table }
    }

    fn quote(&self, name: &str) -> String {
        self.session.dialect().quote_identifier(name)
    }

    fn column_list(&self) -> String {
        self.table
            .columns()
            .names()
            .map(|name| self.quote(name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn select_sql(&self) -> String {
        format!(
            "select {} from {}",
            self.column_list(),
            self.quote(self.table.name())
        )
    }

    /// `a = :p0 and b = :p1`, binding each value under `prefix` + index.
    fn predicate(&self, values: &[ColumnValue], prefix: &str, params: &mut Params) -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let name = format!("{prefix}{i}");
                params.insert(name.clone(), Param::Scalar(value.value.clone()));
                format!("{} = :{name}", self.quote(&value.column))
            })
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// Fetches the entity with identity `id`.
    ///
    /// # Errors
    ///
    /// Returns a database or mapping error.
    pub async fn find_by_id(&self, id: &T::Id) -> Result<Option<T::Entity>> {
        let mut params = Params::new();
        let predicate = self.predicate(&self.table.id_columns(id), "id_", &mut params);
        let sql = format!("{} where {predicate}", self.select_sql());
        self.session
            .select_optional(&sql, &params, |row| self.table.read(row))
            .await
    }

    /// Fetches the entity with identity `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::NotFound`] if there is no such row.
    pub async fn get(&self, id: &T::Id) -> Result<T::Entity> {
        self.find_by_id(id).await?.ok_or(MapperError::NotFound)
    }

    /// Fetches every entity whose identity is in `ids`.
    ///
    /// Single-column identities are matched with one collection parameter,
    /// composite ones with a disjunction of identity predicates.
    ///
    /// # Errors
    ///
    /// Returns a database or mapping error.
    pub async fn find_by_ids(&self, ids: &[T::Id]) -> Result<Vec<T::Entity>> {
        let id_names: Vec<&str> = self.table.columns().id_names().collect();
        let mut params = Params::new();
        let predicate = if let [id_name] = id_names.as_slice() {
            let values = ids
                .iter()
                .flat_map(|id| self.table.id_columns(id))
                .map(|value| value.value)
                .collect();
            params.insert("ids", Param::Collection(values));
            format!("{} in (:ids)", self.quote(id_name))
        } else {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            ids.iter()
                .enumerate()
                .map(|(i, id)| {
                    let values = self.table.id_columns(id);
                    format!("({})", self.predicate(&values, &format!("id_{i}_"), &mut params))
                })
                .collect::<Vec<_>>()
                .join(" or ")
        };
        let sql = format!("{} where {predicate}", self.select_sql());
        self.session
            .select(&sql, &params, |row| self.table.read(row))
            .await
    }

    /// Fetches every row of the table.
    ///
    /// # Errors
    ///
    /// Returns a database or mapping error.
    pub async fn find_all(&self) -> Result<Vec<T::Entity>> {
        self.session
            .select(&self.select_sql(), &Params::new(), |row| self.table.read(row))
            .await
    }

    /// Inserts `entity`, returning the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns a database error, for example on a key conflict.
    pub async fn insert(&self, entity: &T::Entity) -> Result<u64> {
        let values = self.table.values(entity);
        let mut params = Params::new();
        let mut columns = Vec::with_capacity(values.len());
        let mut markers = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            let name = format!("v{i}");
            columns.push(self.quote(&value.column));
            markers.push(format!(":{name}"));
            params.insert(name, Param::Scalar(value.value));
        }
        let sql = format!(
            "insert into {} ({}) values ({})",
            self.quote(self.table.name()),
            columns.join(", "),
            markers.join(", ")
        );
        let inserted = self.session.update(&sql, &params).await?;
        debug!(table = %self.table.name(), inserted, "inserted entity");
        Ok(inserted)
    }

    /// Writes every non-identity column of `entity` to its row.
    ///
    /// A table made only of identity columns has nothing to write; the row
    /// is then only checked for existence.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::NotFound`] if no row has the entity's identity.
    pub async fn update(&self, entity: &T::Entity) -> Result<()> {
        let (ids, values): (Vec<_>, Vec<_>) =
            self.table.values(entity).into_iter().partition(|v| v.id);
        let mut params = Params::new();
        if values.is_empty() {
            let predicate = self.predicate(&ids, "id_", &mut params);
            let sql = format!(
                "select 1 as found from {} where {predicate}",
                self.quote(self.table.name())
            );
            return self
                .session
                .select_optional(&sql, &params, |_| Ok(()))
                .await?
                .ok_or(MapperError::NotFound);
        }
        let assignments = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let name = format!("v{i}");
                let assignment = format!("{} = :{name}", self.quote(&value.column));
                params.insert(name, Param::Scalar(value.value));
                assignment
            })
            .collect::<Vec<_>>()
            .join(", ");
        let predicate = self.predicate(&ids, "id_", &mut params);
        let sql = format!(
            "update {} set {assignments} where {predicate}",
            self.quote(self.table.name())
        );
        match self.session.update(&sql, &params).await? {
            0 => Err(MapperError::NotFound),
            _ => Ok(()),
        }
    }

    /// Deletes the row with identity `id`, returning whether one existed.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn delete(&self, id: &T::Id) -> Result<bool> {
        let mut params = Params::new();
        let predicate = self.predicate(&self.table.id_columns(id), "id_", &mut params);
        let sql = format!(
            "delete from {} where {predicate}",
            self.quote(self.table.name())
        );
        Ok(self.session.update(&sql, &params).await? > 0)
    }
}
