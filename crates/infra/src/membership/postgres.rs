//! Postgres-backed membership store.
//!
//! ## Schema
//!
//! See `migrations/0001_memberships.sql`. `talent_id IS NULL` marks an
//! organization-wide grant.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (undefined table) | `42P01` | `SchemaMissing` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolTimedOut / PoolClosed / Io | N/A | `Unavailable` |
//! | Decode errors | N/A | `Corrupt` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use talentdesk_auth::{Membership, PrincipalId, Role};
use talentdesk_core::{MembershipId, ScopeId};

use super::store::{MembershipStore, NewMembership, StoreError};

const UNDEFINED_TABLE: &str = "42P01";

#[derive(Debug, Clone)]
pub struct PostgresMembershipStore {
    pool: Arc<PgPool>,
}

impl PostgresMembershipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Lazily connect; the first query opens the connection.
    ///
    /// Keeps process startup independent of database availability: lookups
    /// made while the database is down resolve to the fallback role.
    pub fn connect_lazy(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid database url: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Create the table and indexes if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(include_str!("../../migrations/0001_memberships.sql"))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl MembershipStore for PostgresMembershipStore {
    #[instrument(
        skip(self),
        fields(principal_id = %principal_id, membership_count = tracing::field::Empty),
        err
    )]
    async fn list_for_principal(&self, principal_id: PrincipalId) -> Result<Vec<Membership>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, role, talent_id, created_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(principal_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_for_principal", e))?;

        let mut memberships = Vec::with_capacity(rows.len());
        for row in &rows {
            match membership_from_row(row) {
                Ok(m) => memberships.push(m),
                // Skip rather than fail the whole lookup: an unreadable grant
                // confers nothing.
                Err(e) => tracing::warn!(error = %e, "skipping unreadable membership row"),
            }
        }

        tracing::Span::current().record("membership_count", memberships.len());
        Ok(memberships)
    }

    #[instrument(skip(self), fields(membership_id = %id), err)]
    async fn get(&self, id: MembershipId) -> Result<Option<Membership>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, role, talent_id, created_at
            FROM memberships
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(membership_from_row).transpose()
    }

    #[instrument(skip(self), fields(principal_id = %new.principal_id, role = %new.role), err)]
    async fn grant(&self, new: NewMembership) -> Result<Membership, StoreError> {
        let scope = new.scope.as_ref().map(ScopeId::as_str);

        // The unique index on (user_id, role, COALESCE(talent_id, '')) makes
        // the insert a no-op for a duplicate grant; the existing row is then
        // returned by the second branch.
        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO memberships (id, user_id, role, talent_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT DO NOTHING
                RETURNING id, user_id, role, talent_id, created_at
            )
            SELECT id, user_id, role, talent_id, created_at FROM inserted
            UNION ALL
            SELECT id, user_id, role, talent_id, created_at
            FROM memberships
            WHERE user_id = $2
              AND role = $3
              AND talent_id IS NOT DISTINCT FROM $4
              AND NOT EXISTS (SELECT 1 FROM inserted)
            LIMIT 1
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(new.principal_id.as_uuid())
        .bind(new.role.as_str())
        .bind(scope)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("grant", e))?;

        if let Some(row) = row {
            return membership_from_row(&row);
        }

        // A concurrent identical grant won the insert after this statement's
        // snapshot was taken; its row is visible to a fresh statement.
        tracing::debug!("concurrent identical grant; re-reading existing membership");
        let row = sqlx::query(
            r#"
            SELECT id, user_id, role, talent_id, created_at
            FROM memberships
            WHERE user_id = $1
              AND role = $2
              AND talent_id IS NOT DISTINCT FROM $3
            LIMIT 1
            "#,
        )
        .bind(new.principal_id.as_uuid())
        .bind(new.role.as_str())
        .bind(scope)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("grant", e))?;

        match row {
            Some(row) => membership_from_row(&row),
            // Revoked between the two statements.
            None => Err(StoreError::Unavailable(
                "grant raced with a concurrent revoke; retry".to_string(),
            )),
        }
    }

    #[instrument(skip(self), fields(membership_id = %id), err)]
    async fn revoke(&self, id: MembershipId) -> Result<Option<Membership>, StoreError> {
        let row = sqlx::query(
            r#"
            DELETE FROM memberships
            WHERE id = $1
            RETURNING id, user_id, role, talent_id, created_at
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke", e))?;

        row.as_ref().map(membership_from_row).transpose()
    }
}

fn membership_from_row(row: &PgRow) -> Result<Membership, StoreError> {
    let id: Uuid = row.try_get("id").map_err(decode_error)?;
    let user_id: Uuid = row.try_get("user_id").map_err(decode_error)?;
    let role: String = row.try_get("role").map_err(decode_error)?;
    let talent_id: Option<String> = row.try_get("talent_id").map_err(decode_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode_error)?;

    let role: Role = role
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("membership {id}: {e}")))?;
    let scope = talent_id
        .map(ScopeId::new)
        .transpose()
        .map_err(|e| StoreError::Corrupt(format!("membership {id}: {e}")))?;

    Ok(Membership {
        id: MembershipId::from_uuid(id),
        principal_id: PrincipalId::from_uuid(user_id),
        role,
        scope,
        granted_at: created_at,
    })
}

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Corrupt(err.to_string())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some(UNDEFINED_TABLE) => StoreError::SchemaMissing(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(format!("decode error in {operation}: {err}"))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}
