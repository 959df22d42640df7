use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{bootcamp, course, review, user, Bootcamp, Course, Review, User};
use crate::database::query_builder::{QueryBuilder, QueryResults};
use crate::filter::{Filter, FilterValue, Populate, ResourceSchema};

/// A stored collection the generic read path can serve
pub trait Resource: DeserializeOwned + Send {
    /// Singular name used in not-found messages
    const NAME: &'static str;
    const SCHEMA: ResourceSchema;
}

impl Resource for Bootcamp {
    const NAME: &'static str = "Bootcamp";
    const SCHEMA: ResourceSchema = bootcamp::SCHEMA;
}

impl Resource for Course {
    const NAME: &'static str = "Course";
    const SCHEMA: ResourceSchema = course::SCHEMA;
}

impl Resource for Review {
    const NAME: &'static str = "Review";
    const SCHEMA: ResourceSchema = review::SCHEMA;
}

impl Resource for User {
    const NAME: &'static str = "User";
    const SCHEMA: ResourceSchema = user::SCHEMA;
}

pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Resource> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn filter(&self) -> Filter {
        Filter::new(T::SCHEMA)
    }

    pub async fn select_any(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::new(&self.pool, filter).select_all().await
    }

    /// Paged listing as raw rows; `select` may have trimmed columns off the model.
    pub async fn select_paged(&self, filter: Filter) -> Result<QueryResults<Value>, DatabaseError> {
        QueryBuilder::new(&self.pool, filter).paged().await
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.select_one_populated(id, None).await
    }

    pub async fn select_one_populated(
        &self,
        id: Uuid,
        populate: Option<Populate>,
    ) -> Result<Option<T>, DatabaseError> {
        let mut filter = self.filter();
        filter.where_eq("id", FilterValue::Uuid(id));
        if let Some(join) = populate {
            filter.populate(join);
        }
        QueryBuilder::new(&self.pool, filter).select_optional().await
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_one(id).await?.ok_or_else(|| not_found::<T>(id))
    }

    /// Every row whose reference column equals `parent`, oldest first
    pub async fn select_children(
        &self,
        column: &'static str,
        parent: Uuid,
    ) -> Result<Vec<T>, DatabaseError> {
        let mut filter = self.filter();
        filter.where_eq(column, FilterValue::Uuid(parent));
        filter.order("createdAt");
        self.select_any(filter).await
    }

    pub async fn delete_404(&self, id: Uuid) -> Result<(), DatabaseError> {
        let query = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", T::SCHEMA.table);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(not_found::<T>(id));
        }
        Ok(())
    }
}

fn not_found<T: Resource>(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found with id of {}", T::NAME, id))
}
