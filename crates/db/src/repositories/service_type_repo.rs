//! Repository for the `service_types` table (read-mostly pricing
//! catalog, seeded by migration).

use sqlx::PgPool;

use crate::models::service_type::ServiceType;

/// Column list for `service_types` queries.
const COLUMNS: &str = "id, name, description, credit_cost, is_active, created_at, updated_at";

/// Lookup operations for the persisted service catalog.
pub struct ServiceTypeRepo;

impl ServiceTypeRepo {
    /// List active service types, cheapest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<ServiceType>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_types
             WHERE is_active = true
             ORDER BY credit_cost ASC"
        );
        sqlx::query_as::<_, ServiceType>(&query).fetch_all(pool).await
    }

    /// Find a service type by its unique name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<ServiceType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_types WHERE name = $1");
        sqlx::query_as::<_, ServiceType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
