#![allow(dead_code)]

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use oxide_mapper::{
    col, sql_enum, Column, ColumnValue, Columns, ColumnsBuilder, ConverterRegistry, Result,
    Session, Table, ValueHolder,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    "create table actor (
        actor_id integer primary key,
        first_name text not null,
        last_name text not null,
        last_update timestamp not null
    )",
    "create table film (
        film_id integer primary key,
        title text not null,
        release_year integer,
        rating text,
        special_features text not null,
        in_stock boolean not null
    )",
    "create table film_actor (
        film_id integer not null,
        actor_id integer not null,
        primary key (film_id, actor_id)
    )",
];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool
}

pub async fn create_test_session() -> Session {
    init_tracing();
    Session::new(create_test_pool().await)
}

pub fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2006, 2, 15)
        .unwrap()
        .and_hms_opt(4, 34, 33)
        .unwrap()
}

sql_enum! {
    pub enum Rating {
        G,
        Pg = "PG",
        Pg13 = "PG-13",
        R,
        Nc17 = "NC-17",
    }
}

sql_enum! {
    pub enum SpecialFeature {
        Trailers,
        Commentaries,
        DeletedScenes = "Deleted Scenes",
        BehindTheScenes = "Behind the Scenes",
    }
}

pub fn registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::default();
    registry
        .register_enum::<Rating>()
        .register_enum::<SpecialFeature>();
    registry
}

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub last_update: NaiveDateTime,
}

pub fn actor(id: i64, first_name: &str, last_name: &str) -> Actor {
    Actor {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        last_update: timestamp(),
    }
}

pub struct ActorTable {
    columns: Columns<Actor>,
    pub id: Column<Actor, i64>,
    pub first_name: Column<Actor, String>,
    pub last_name: Column<Actor, String>,
    pub last_update: Column<Actor, NaiveDateTime>,
}

impl ActorTable {
    pub fn new(registry: &ConverterRegistry) -> Result<Self> {
        let mut builder = ColumnsBuilder::new("actor", registry);
        let id = builder.col(col("actor_id", |a: &Actor| a.id).id())?;
        let first_name = builder.col(col("first_name", |a: &Actor| a.first_name.clone()))?;
        let last_name = builder.col(col("last_name", |a: &Actor| a.last_name.clone()))?;
        let last_update = builder
            .col(col("last_update", |a: &Actor| a.last_update).default(timestamp()))?;
        Ok(Self {
            columns: builder.build(),
            id,
            first_name,
            last_name,
            last_update,
        })
    }
}

impl Table for ActorTable {
    type Entity = Actor;
    type Id = i64;

    fn columns(&self) -> &Columns<Actor> {
        &self.columns
    }

    fn id_columns(&self, id: &i64) -> Vec<ColumnValue> {
        vec![self.id.of(id)]
    }

    fn create(&self, values: &ValueHolder<Actor>) -> Result<Actor> {
        Ok(Actor {
            id: values.of(&self.id)?,
            first_name: values.of(&self.first_name)?,
            last_name: values.of(&self.last_name)?,
            last_update: values.of(&self.last_update)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub rating: Option<Rating>,
    pub special_features: BTreeSet<SpecialFeature>,
    pub in_stock: bool,
}

pub struct FilmTable {
    columns: Columns<Film>,
    pub id: Column<Film, i64>,
    pub title: Column<Film, String>,
    pub release_year: Column<Film, Option<i32>>,
    pub rating: Column<Film, Option<Rating>>,
    pub special_features: Column<Film, BTreeSet<SpecialFeature>>,
    pub in_stock: Column<Film, bool>,
}

impl FilmTable {
    pub fn new(registry: &ConverterRegistry) -> Result<Self> {
        let mut builder = ColumnsBuilder::new("film", registry);
        let id = builder.col(col("film_id", |f: &Film| f.id).id())?;
        let title = builder.col(col("title", |f: &Film| f.title.clone()))?;
        let release_year = builder.col(col("release_year", |f: &Film| f.release_year))?;
        let rating = builder.col(col("rating", |f: &Film| f.rating))?;
        let special_features =
            builder.col(col("special_features", |f: &Film| f.special_features.clone()))?;
        let in_stock = builder.col(col("in_stock", |f: &Film| f.in_stock).default(true))?;
        Ok(Self {
            columns: builder.build(),
            id,
            title,
            release_year,
            rating,
            special_features,
            in_stock,
        })
    }
}

impl Table for FilmTable {
    type Entity = Film;
    type Id = i64;

    fn columns(&self) -> &Columns<Film> {
        &self.columns
    }

    fn id_columns(&self, id: &i64) -> Vec<ColumnValue> {
        vec![self.id.of(id)]
    }

    fn create(&self, values: &ValueHolder<Film>) -> Result<Film> {
        Ok(Film {
            id: values.of(&self.id)?,
            title: values.of(&self.title)?,
            release_year: values.of(&self.release_year)?,
            rating: values.of(&self.rating)?,
            special_features: values.of(&self.special_features)?,
            in_stock: values.of(&self.in_stock)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilmActor {
    pub film_id: i64,
    pub actor_id: i64,
}

pub struct FilmActorTable {
    columns: Columns<FilmActor>,
    pub film_id: Column<FilmActor, i64>,
    pub actor_id: Column<FilmActor, i64>,
}

impl FilmActorTable {
    pub fn new(registry: &ConverterRegistry) -> Result<Self> {
        let mut builder = ColumnsBuilder::new("film_actor", registry);
        let film_id = builder.col(col("film_id", |fa: &FilmActor| fa.film_id).id())?;
        let actor_id = builder.col(col("actor_id", |fa: &FilmActor| fa.actor_id).id())?;
        Ok(Self {
            columns: builder.build(),
            film_id,
            actor_id,
        })
    }
}

impl Table for FilmActorTable {
    type Entity = FilmActor;
    type Id = (i64, i64);

    fn columns(&self) -> &Columns<FilmActor> {
        &self.columns
    }

    fn id_columns(&self, id: &(i64, i64)) -> Vec<ColumnValue> {
        vec![self.film_id.of(&id.0), self.actor_id.of(&id.1)]
    }

    fn create(&self, values: &ValueHolder<FilmActor>) -> Result<FilmActor> {
        Ok(FilmActor {
            film_id: values.of(&self.film_id)?,
            actor_id: values.of(&self.actor_id)?,
        })
    }
}

/// Only read from plain maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Rental {
    pub id: Uuid,
    pub customer: String,
    pub days: i32,
    pub returned: bool,
}

pub struct RentalTable {
    columns: Columns<Rental>,
    pub id: Column<Rental, Uuid>,
    pub customer: Column<Rental, String>,
    pub days: Column<Rental, i32>,
    pub returned: Column<Rental, bool>,
}

impl RentalTable {
    pub fn new(registry: &ConverterRegistry) -> Result<Self> {
        let mut builder = ColumnsBuilder::new("rental", registry);
        let id = builder.col(col("id", |r: &Rental| r.id).id())?;
        let customer = builder.col(
            col("customer", |r: &Rental| r.customer.clone())
                .map_converter(|s| Ok(s.trim().to_uppercase())),
        )?;
        let days = builder.col(col("days", |r: &Rental| r.days).default(3))?;
        let returned = builder.col(col("returned", |r: &Rental| r.returned))?;
        Ok(Self {
            columns: builder.build(),
            id,
            customer,
            days,
            returned,
        })
    }
}

impl Table for RentalTable {
    type Entity = Rental;
    type Id = Uuid;

    fn columns(&self) -> &Columns<Rental> {
        &self.columns
    }

    fn id_columns(&self, id: &Uuid) -> Vec<ColumnValue> {
        vec![self.id.of(id)]
    }

    fn create(&self, values: &ValueHolder<Rental>) -> Result<Rental> {
        Ok(Rental {
            id: values.of(&self.id)?,
            customer: values.of(&self.customer)?,
            days: values.of(&self.days)?,
            returned: values.of(&self.returned)?,
        })
    }
}
