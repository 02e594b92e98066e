//! Table creation for registered models.

use crate::error::AppError;
use crate::registry::Registry;
use crate::sql::create_table;
use sqlx::SqlitePool;

/// CREATE TABLE IF NOT EXISTS for every registered model, in registration order.
pub async fn ensure_tables(pool: &SqlitePool, registry: &Registry) -> Result<(), AppError> {
    for model in registry.models() {
        let ddl = create_table(model);
        tracing::debug!(sql = %ddl, "ensure table");
        sqlx::query(&ddl).execute(pool).await?;
        tracing::info!(model = %model.name(), table = %model.table_name(), "table ready");
    }
    Ok(())
}
