//! Postgres adapters for the storage ports.
//!
//! Queries are runtime-checked (`sqlx::query_as::<_, Row>`); enum columns are
//! stored as TEXT and parsed back through each model's `FromStr`.

mod applications;
mod audit;
mod availability;
mod conversations;
mod interviews;
mod notifications;
mod offers;
mod swipes;
mod users;

use std::str::FromStr;

use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::ParseEnumError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_column<T>(raw: &str) -> Result<T>
where
    T: FromStr<Err = ParseEnumError>,
{
    raw.parse()
        .map_err(|e: ParseEnumError| Error::Internal(format!("corrupt row: {e}")))
}
