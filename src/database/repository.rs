use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{self, FromRow, Sqlite, Transaction};

use crate::database::manager::{DatabaseError, UniqueKeys};
use crate::database::query_builder::{bind_param_query, bind_param_query_as, QueryBuilder};
use crate::filter::FilterData;

/// Column/value pairs for INSERT and UPDATE statements
pub type FieldValues = Vec<(&'static str, Value)>;

/// A table whose rows map onto `Self`
pub trait Table: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE: &'static str;
    /// Columns that may be filtered and sorted on
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;
}

pub struct Repository<T> {
    pool: SqlitePool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Table> Repository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, DatabaseError> {
        Ok(self.pool.acquire().await?)
    }

    /// Open a transaction for a batch of `*_on` calls
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, DatabaseError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        self.select_any_on(&mut *self.acquire().await?, filter_data).await
    }

    pub async fn select_any_on(&self, conn: &mut SqliteConnection, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(T::TABLE, T::COLUMNS)?
            .filter(filter_data)?
            .select_all(conn)
            .await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new(T::TABLE, T::COLUMNS)?
            .filter(filter_data)?
            .select_optional(&mut *self.acquire().await?)
            .await
    }

    pub async fn select_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        self.select_one(FilterData::new().where_eq("id", Some(id))).await
    }

    pub async fn select_404(&self, id: i64, not_found: &str) -> Result<T, DatabaseError> {
        self.select_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(not_found.to_string()))
    }

    pub async fn count(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        QueryBuilder::<T>::new(T::TABLE, T::COLUMNS)?
            .filter(filter_data)?
            .count(&mut *self.acquire().await?)
            .await
    }

    /// Whether any row other than `except_id` matches every predicate
    pub async fn exists(&self, filter_data: FilterData, except_id: Option<i64>) -> Result<bool, DatabaseError> {
        self.exists_on(&mut *self.acquire().await?, filter_data, except_id).await
    }

    pub async fn exists_on(
        &self,
        conn: &mut SqliteConnection,
        filter_data: FilterData,
        except_id: Option<i64>,
    ) -> Result<bool, DatabaseError> {
        let rows = self.select_any_on(conn, filter_data.paginate(0, 2)).await?;
        Ok(rows.iter().any(|row| Some(row.id()) != except_id))
    }

    pub async fn insert(&self, fields: FieldValues, unique_keys: UniqueKeys) -> Result<T, DatabaseError> {
        self.insert_on(&mut *self.acquire().await?, fields, unique_keys).await
    }

    pub async fn insert_on(
        &self,
        conn: &mut SqliteConnection,
        fields: FieldValues,
        unique_keys: UniqueKeys,
    ) -> Result<T, DatabaseError> {
        let columns: Vec<String> = fields.iter().map(|(c, _)| format!("\"{}\"", c)).collect();
        let placeholders = vec!["?"; fields.len()].join(", ");
        let query = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
            T::TABLE,
            columns.join(", "),
            placeholders
        );
        tracing::debug!("insert: {}", query);

        let mut q = sqlx::query_as::<_, T>(&query);
        for (_, value) in fields.iter() {
            q = bind_param_query_as(q, value);
        }
        q.fetch_one(&mut *conn)
            .await
            .map_err(|e| DatabaseError::from_write(e, unique_keys))
    }

    /// Overwrite only the supplied columns. Returns `None` when the row is gone.
    pub async fn update(&self, id: i64, fields: FieldValues, unique_keys: UniqueKeys) -> Result<Option<T>, DatabaseError> {
        if fields.is_empty() {
            tracing::debug!("No changes for {} {}, skipping update", T::TABLE, id);
            return self.select_id(id).await;
        }

        let set_clauses: Vec<String> = fields.iter().map(|(c, _)| format!("\"{}\" = ?", c)).collect();
        let query = format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ? RETURNING *",
            T::TABLE,
            set_clauses.join(", ")
        );
        tracing::debug!("update: {}", query);

        let mut q = sqlx::query_as::<_, T>(&query);
        for (_, value) in fields.iter() {
            q = bind_param_query_as(q, value);
        }
        q.bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, unique_keys))
    }

    /// Returns whether a row was removed
    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let query = format!("DELETE FROM \"{}\" WHERE \"id\" = ?", T::TABLE);
        let q = bind_param_query(sqlx::query(&query), &Value::from(id));
        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
