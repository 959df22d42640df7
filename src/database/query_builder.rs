use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::{self, postgres::PgArguments, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, FilterValue, Pagination, SqlResult};

/// One page of a listing plus the metadata the list envelope reports
#[derive(Debug, Clone, Serialize)]
pub struct QueryResults<T> {
    pub count: usize,
    pub total: i64,
    pub pagination: Pagination,
    pub data: Vec<T>,
}

/// Runs a `Filter` against the pool. Every row comes back as one JSON object
/// (`json_build_object` projection) and is deserialized into `T`.
pub struct QueryBuilder<'a> {
    pool: &'a PgPool,
    filter: Filter,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(pool: &'a PgPool, filter: Filter) -> Self {
        Self { pool, filter }
    }

    pub async fn select_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, DatabaseError> {
        let rows = self.fetch_rows().await?;
        rows.into_iter()
            .map(|v| serde_json::from_value(v).map_err(DatabaseError::from))
            .collect()
    }

    pub async fn select_optional<T: DeserializeOwned>(&self) -> Result<Option<T>, DatabaseError> {
        let mut rows = self.fetch_rows().await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(rows.swap_remove(0))?))
    }

    /// Raw JSON rows; keeps `select` projections that do not fit a typed model.
    pub async fn fetch_rows(&self) -> Result<Vec<Value>, DatabaseError> {
        let sql_result = self.filter.to_sql();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let sql_result: SqlResult = self.filter.to_count_sql();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param(q, p);
        }
        let row = q.fetch_one(self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    /// Page of rows, total matching count and prev/next links.
    pub async fn paged(&self) -> Result<QueryResults<Value>, DatabaseError> {
        let total = self.count().await?;
        let data = self.fetch_rows().await?;
        let pagination = self
            .filter
            .window()
            .map(|w| Pagination::for_window(w, total))
            .unwrap_or_default();
        Ok(QueryResults {
            count: data.len(),
            total,
            pagination,
            data,
        })
    }
}

pub(crate) fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q FilterValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        FilterValue::Text(s) => q.bind(s.as_str()),
        FilterValue::Integer(i) => q.bind(*i),
        FilterValue::Float(f) => q.bind(*f),
        FilterValue::Bool(b) => q.bind(*b),
        FilterValue::Uuid(u) => q.bind(*u),
        FilterValue::Timestamp(t) => q.bind(*t),
        FilterValue::TextList(list) => q.bind(list.as_slice()),
        FilterValue::IntegerList(list) => q.bind(list.as_slice()),
        FilterValue::FloatList(list) => q.bind(list.as_slice()),
        FilterValue::UuidList(list) => q.bind(list.as_slice()),
    }
}
