//! Generic CRUD execution against SQLite.

use crate::error::AppError;
use crate::model::Model;
use crate::registry::Registry;
use crate::sql::{insert, select_by_id, select_exists, select_list, update, QueryBuf, SqliteBindValue};
use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Sqlite, SqlitePool};
use std::collections::HashMap;

pub struct CrudService;

impl CrudService {
    /// List rows (list-visible columns in field order), optionally searched with `q`.
    pub async fn list(
        pool: &SqlitePool,
        model: &Model,
        q: Option<&str>,
    ) -> Result<Vec<Vec<Value>>, AppError> {
        let q = select_list(model, q);
        let rows = Self::bound(&q).fetch_all(pool).await.map_err(log_db)?;
        Ok(rows.iter().map(row_to_values).collect())
    }

    /// Fetch one row (every column in field order) by identifier.
    pub async fn read(pool: &SqlitePool, model: &Model, id: i64) -> Result<Vec<Value>, AppError> {
        let q = select_by_id(model, id);
        let row = Self::bound(&q)
            .fetch_optional(pool)
            .await
            .map_err(log_db)?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", model.name(), id)))?;
        Ok(row_to_values(&row))
    }

    /// Insert one row from validated data. Returns the new row id.
    pub async fn create(
        pool: &SqlitePool,
        model: &Model,
        data: &HashMap<String, Value>,
    ) -> Result<i64, AppError> {
        let q = insert(model, data);
        let result = Self::bound(&q).execute(pool).await.map_err(log_db)?;
        Ok(result.last_insert_rowid())
    }

    /// Whether a row with this identifier exists.
    pub async fn exists(pool: &SqlitePool, model: &Model, id: i64) -> Result<bool, AppError> {
        let q = select_exists(model, id);
        let row = Self::bound(&q).fetch_optional(pool).await.map_err(log_db)?;
        Ok(row.is_some())
    }

    /// Names of foreign key fields in `data` whose target row does not exist.
    pub async fn missing_references(
        pool: &SqlitePool,
        registry: &Registry,
        model: &Model,
        data: &HashMap<String, Value>,
    ) -> Result<Vec<String>, AppError> {
        let mut missing = Vec::new();
        for field in model.fields() {
            let Some(link) = field.foreign_key().and_then(|fk| fk.target()) else {
                continue;
            };
            let Some(id) = data.get(field.name()).and_then(Value::as_i64) else {
                continue;
            };
            let Some(target) = registry.model_at(link.index) else {
                continue;
            };
            if !Self::exists(pool, target, id).await? {
                missing.push(field.name().to_string());
            }
        }
        Ok(missing)
    }

    /// Update one row from validated data. Nothing submitted leaves the row as is.
    pub async fn update(
        pool: &SqlitePool,
        model: &Model,
        id: i64,
        data: &HashMap<String, Value>,
    ) -> Result<(), AppError> {
        let Some(q) = update(model, id, data) else {
            return if Self::exists(pool, model, id).await? {
                Ok(())
            } else {
                Err(AppError::NotFound(format!("{} {}", model.name(), id)))
            };
        };
        let result = Self::bound(&q).execute(pool).await.map_err(log_db)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {}", model.name(), id)));
        }
        Ok(())
    }

    fn bound(q: &QueryBuf) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(SqliteBindValue::from_json(p));
        }
        query
    }
}

fn log_db(e: sqlx::Error) -> AppError {
    tracing::error!(error = %e, "query failed");
    AppError::Db(e)
}

fn row_to_values(row: &SqliteRow) -> Vec<Value> {
    use sqlx::Row;
    (0..row.len()).map(|i| cell_to_value(row, i)).collect()
}

fn cell_to_value(row: &SqliteRow, index: usize) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(index) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(index) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(index) {
        return Value::String(s);
    }
    if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return Value::String(String::from_utf8_lossy(&bytes).into_owned());
    }
    Value::Null
}
