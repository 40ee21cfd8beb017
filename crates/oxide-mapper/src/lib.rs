//! # oxide-mapper
//!
//! Declarative mapping between SQL rows and Rust entities.
//!
//! This crate provides:
//! - `Converter` for bidirectional conversion of single cells
//! - `ConverterRegistry` resolving converters from declared column types
//! - `Table` / `ColumnsBuilder` for declaring columns once per entity
//! - `Session` and `Dao` for running named-parameter statements on SQLite
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_mapper::{col, sql_enum, ConverterRegistry, Dao, Params, Session};
//!
//! sql_enum! {
//!     pub enum Rating { G, Pg = "PG", R }
//! }
//!
//! async fn example(pool: sqlx::SqlitePool) -> oxide_mapper::Result<()> {
//!     let mut registry = ConverterRegistry::default();
//!     registry.register_enum::<Rating>();
//!     let films = FilmTable::new(&registry)?;
//!
//!     let session = Session::new(pool);
//!     let params = Params::new().bind_all("ids", [1_i64, 2, 3]);
//!     let titles = session
//!         .select("select * from film where film_id in (:ids)", &params, |row| {
//!             Ok(films.read(row)?.title)
//!         })
//!         .await?;
//!
//!     let dao = Dao::new(&session, &films);
//!     let film = dao.get(&1).await?;
//!     Ok(())
//! }
//! ```
//!
//! Converters are resolved when a table declares its columns: a column of an
//! enum type that was never registered is rejected with
//! [`MapperError::ConverterNotRegistered`] before any row is read.

mod column;
pub mod converter;
mod dao;
mod error;
mod registry;
mod row;
mod session;
mod table;
mod value;

pub use column::{col, Column, ColumnSpec, ColumnValue};
pub use converter::{Converter, EnumConverter, EnumSetConverter, OptionalConverter, SimpleConverter};
pub use dao::Dao;
pub use error::{ConvertError, MapperError, Result};
#[doc(hidden)]
pub use registry::__storable_label;
pub use registry::{ConverterRegistry, Declared, SqlEnum, TypeDescriptor};
pub use row::Row;
pub use session::{Session, SessionConfig};
pub use table::{Columns, ColumnsBuilder, Table};
pub use value::ValueHolder;

pub use oxide_bind::{Param, Params, SqlValue};
