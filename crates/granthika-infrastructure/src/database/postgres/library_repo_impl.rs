// ============================================================================
// Granthika Infrastructure - PostgreSQL Library Repository
// File: crates/granthika-infrastructure/src/database/postgres/library_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

use granthika_core::domain::{InstituteType, Library};
use granthika_core::error::DomainError;
use granthika_core::repositories::LibraryRepository;

use crate::database::constraints::{read_error, write_error, WriteSubject};

const LIBRARY_COLUMNS: &str = "id, user_id, library_code, library_name, institute_name, \
     institute_type, institute_email, phone_number, address, district, state, country, \
     library_logo, created_at, updated_at";

pub struct PgLibraryRepository {
    pool: PgPool,
}

impl PgLibraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LibraryRow {
    id: Uuid,
    user_id: Uuid,
    library_code: String,
    library_name: String,
    institute_name: String,
    institute_type: String,
    institute_email: String,
    phone_number: Option<String>,
    address: String,
    district: String,
    state: String,
    country: String,
    library_logo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LibraryRow> for Library {
    fn from(row: LibraryRow) -> Self {
        Library {
            id: row.id,
            user_id: row.user_id,
            library_code: row.library_code,
            library_name: row.library_name,
            institute_name: row.institute_name,
            institute_type: InstituteType::from_str(&row.institute_type).unwrap_or_default(),
            institute_email: row.institute_email,
            phone_number: row.phone_number,
            address: row.address,
            district: row.district,
            state: row.state,
            country: row.country,
            library_logo: row.library_logo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn library_subject(library: &Library) -> WriteSubject<'_> {
    WriteSubject {
        library: Some(library),
        ..Default::default()
    }
}

pub(crate) async fn insert_library<'e, E>(executor: E, library: &Library) -> Result<(), DomainError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO libraries (
            id, user_id, library_code, library_name, institute_name, institute_type,
            institute_email, phone_number, address, district, state, country,
            library_logo, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(library.id)
    .bind(library.user_id)
    .bind(&library.library_code)
    .bind(&library.library_name)
    .bind(&library.institute_name)
    .bind(library.institute_type.as_str())
    .bind(&library.institute_email)
    .bind(&library.phone_number)
    .bind(&library.address)
    .bind(&library.district)
    .bind(&library.state)
    .bind(&library.country)
    .bind(&library.library_logo)
    .bind(library.created_at)
    .bind(library.updated_at)
    .execute(executor)
    .await
    .map_err(|e| write_error("inserting library", e, library_subject(library)))?;
    Ok(())
}

impl PgLibraryRepository {
    async fn find_one(&self, filter: &str, value: &str, context: &str) -> Result<Option<Library>, DomainError> {
        let sql = format!("SELECT {} FROM libraries WHERE {}", LIBRARY_COLUMNS, filter);
        let row: Option<LibraryRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error(context, e))?;
        Ok(row.map(Into::into))
    }

    async fn find_by_uuid(&self, column: &str, value: &Uuid, context: &str) -> Result<Option<Library>, DomainError> {
        let sql = format!("SELECT {} FROM libraries WHERE {} = $1", LIBRARY_COLUMNS, column);
        let row: Option<LibraryRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error(context, e))?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl LibraryRepository for PgLibraryRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Library>, DomainError> {
        self.find_by_uuid("id", id, "finding library by id").await
    }

    async fn find_by_user_id(&self, user_id: &Uuid) -> Result<Option<Library>, DomainError> {
        self.find_by_uuid("user_id", user_id, "finding library by user").await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Library>, DomainError> {
        self.find_one("library_code = $1", code, "finding library by code").await
    }

    async fn find_by_institute_email(&self, email: &str) -> Result<Option<Library>, DomainError> {
        self.find_one("LOWER(institute_email) = LOWER($1)", email, "finding library by email")
            .await
    }

    async fn update(&self, library: &Library) -> Result<Library, DomainError> {
        let sql = format!(
            r#"
            UPDATE libraries SET
                library_name = $2, institute_name = $3, institute_type = $4,
                institute_email = $5, phone_number = $6, address = $7, district = $8,
                state = $9, country = $10, library_logo = $11, updated_at = $12
            WHERE id = $1
            RETURNING {}
            "#,
            LIBRARY_COLUMNS
        );
        let row: Option<LibraryRow> = sqlx::query_as(&sql)
            .bind(library.id)
            .bind(&library.library_name)
            .bind(&library.institute_name)
            .bind(library.institute_type.as_str())
            .bind(&library.institute_email)
            .bind(&library.phone_number)
            .bind(&library.address)
            .bind(&library.district)
            .bind(&library.state)
            .bind(&library.country)
            .bind(&library.library_logo)
            .bind(library.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error("updating library", e, library_subject(library)))?;

        let updated: Library = row.map(Into::into).ok_or(DomainError::LibraryNotFound)?;
        info!("Library {} updated", updated.library_code);
        Ok(updated)
    }
}
