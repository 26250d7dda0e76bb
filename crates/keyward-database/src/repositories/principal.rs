//! PostgreSQL principal repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::{AppResult, PrincipalId};
use keyward_entity::principal::{CreatePrincipal, Principal};

use crate::store::PrincipalStore;

/// [`PrincipalStore`] backed by the `principals` table.
#[derive(Debug, Clone)]
pub struct PrincipalRepository {
    pool: PgPool,
}

impl PrincipalRepository {
    /// Create a new principal repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PrincipalRepository {
    async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find principal by id", e)
            })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE email = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find principal by email", e)
            })
    }

    async fn create(&self, data: &CreatePrincipal) -> AppResult<Principal> {
        let now = Utc::now();
        sqlx::query_as::<_, Principal>(
            r#"
            INSERT INTO principals (id, email, name, password_hash, role, created_at, updated_at)
            VALUES ($1, LOWER($2), $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(PrincipalId::generate())
        .bind(&data.email)
        .bind(&data.name)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict("Email already exists")
            }
            other => {
                AppError::with_source(ErrorKind::Database, "Failed to create principal", other)
            }
        })
    }

    async fn set_refresh_token(&self, id: PrincipalId, token: Option<&str>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE principals SET refresh_token = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to store refresh token", e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}
