//! License persistence operations.
//!
//! [`PgLicenseStore`] implements [`LicenseStore`] over the `licenses` table.
//! Ids come from the table's `BIGSERIAL` sequence.

use async_trait::async_trait;
use sqlx::PgPool;
use tm_core::{License, LicenseFields, LicenseId, LicenseStore, LicenseStoreError};

/// Postgres-backed license store.
#[derive(Debug, Clone)]
pub struct PgLicenseStore {
    pool: PgPool,
}

impl PgLicenseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> LicenseStoreError {
    LicenseStoreError::Backend(err.to_string())
}

#[async_trait]
impl LicenseStore for PgLicenseStore {
    async fn create(&self, fields: LicenseFields) -> Result<LicenseId, LicenseStoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO licenses (name, description, plain_text)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.plain_text)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(LicenseId::new(id))
    }

    async fn get(&self, id: LicenseId) -> Result<License, LicenseStoreError> {
        let row = sqlx::query_as::<_, LicenseRow>(
            "SELECT id, name, description, plain_text FROM licenses WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(LicenseRow::into_license)
            .ok_or(LicenseStoreError::NotFound(id))
    }

    async fn update(
        &self,
        id: LicenseId,
        fields: LicenseFields,
    ) -> Result<License, LicenseStoreError> {
        // NULL parameters keep the stored value.
        let row = sqlx::query_as::<_, LicenseRow>(
            "UPDATE licenses
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 plain_text = COALESCE($4, plain_text)
             WHERE id = $1
             RETURNING id, name, description, plain_text",
        )
        .bind(id.get())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.plain_text)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(LicenseRow::into_license)
            .ok_or(LicenseStoreError::NotFound(id))
    }

    async fn delete(&self, id: LicenseId) -> Result<(), LicenseStoreError> {
        let result = sqlx::query("DELETE FROM licenses WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(LicenseStoreError::NotFound(id));
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<License>, LicenseStoreError> {
        let rows = sqlx::query_as::<_, LicenseRow>(
            "SELECT id, name, description, plain_text FROM licenses ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(LicenseRow::into_license).collect())
    }

    async fn ping(&self) -> Result<(), LicenseStoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct LicenseRow {
    id: i64,
    name: Option<String>,
    description: Option<String>,
    plain_text: Option<String>,
}

impl LicenseRow {
    fn into_license(self) -> License {
        License {
            id: LicenseId::new(self.id),
            name: self.name,
            description: self.description,
            plain_text: self.plain_text,
        }
    }
}
