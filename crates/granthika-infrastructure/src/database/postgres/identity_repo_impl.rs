// ============================================================================
// Granthika Infrastructure - PostgreSQL Identity Repository
// File: crates/granthika-infrastructure/src/database/postgres/identity_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use granthika_core::domain::AdminIdentity;
use granthika_core::error::DomainError;
use granthika_core::repositories::IdentityRepository;

use crate::database::constraints::{read_error, write_error, WriteSubject};

const IDENTITY_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     is_active, last_login, created_at, modified_at";

pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct AdminIdentityRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    modified_at: Option<DateTime<Utc>>,
}

impl From<AdminIdentityRow> for AdminIdentity {
    fn from(row: AdminIdentityRow) -> Self {
        AdminIdentity {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

/// Inserts an identity through any executor, so account creation can run it
/// inside its transaction.
pub(crate) async fn insert_identity<'e, E>(executor: E, identity: &AdminIdentity) -> Result<(), DomainError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO admin_identities (
            id, username, email, password_hash, first_name, last_name,
            is_active, last_login, created_at, modified_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(identity.id)
    .bind(&identity.username)
    .bind(&identity.email)
    .bind(&identity.password_hash)
    .bind(&identity.first_name)
    .bind(&identity.last_name)
    .bind(identity.is_active)
    .bind(identity.last_login)
    .bind(identity.created_at)
    .bind(identity.modified_at)
    .execute(executor)
    .await
    .map_err(|e| {
        write_error(
            "inserting identity",
            e,
            WriteSubject {
                identity: Some(identity),
                ..Default::default()
            },
        )
    })?;
    Ok(())
}

impl PgIdentityRepository {
    async fn find_one(&self, filter: &str, value: &str, context: &str) -> Result<Option<AdminIdentity>, DomainError> {
        let sql = format!("SELECT {} FROM admin_identities WHERE {}", IDENTITY_COLUMNS, filter);
        let row: Option<AdminIdentityRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error(context, e))?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl IdentityRepository for PgIdentityRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AdminIdentity>, DomainError> {
        let sql = format!("SELECT {} FROM admin_identities WHERE id = $1", IDENTITY_COLUMNS);
        let row: Option<AdminIdentityRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("finding identity by id", e))?;
        Ok(row.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminIdentity>, DomainError> {
        self.find_one("username = $1", username, "finding identity by username")
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminIdentity>, DomainError> {
        self.find_one("LOWER(email) = LOWER($1)", email, "finding identity by email")
            .await
    }

    async fn update(&self, identity: &AdminIdentity) -> Result<AdminIdentity, DomainError> {
        let sql = format!(
            r#"
            UPDATE admin_identities SET
                email = $2, password_hash = $3, first_name = $4, last_name = $5,
                is_active = $6, last_login = $7, modified_at = $8
            WHERE id = $1
            RETURNING {}
            "#,
            IDENTITY_COLUMNS
        );
        let row: Option<AdminIdentityRow> = sqlx::query_as(&sql)
            .bind(identity.id)
            .bind(&identity.email)
            .bind(&identity.password_hash)
            .bind(&identity.first_name)
            .bind(&identity.last_name)
            .bind(identity.is_active)
            .bind(identity.last_login)
            .bind(identity.modified_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    "updating identity",
                    e,
                    WriteSubject {
                        identity: Some(identity),
                        ..Default::default()
                    },
                )
            })?;

        row.map(Into::into).ok_or(DomainError::IdentityNotFound)
    }
}
