/// PostgreSQL-backed refresh record store
///
/// Schema lives in `migrations/`. The digest column carries a unique index,
/// so duplicate inserts come back as SQLSTATE 23505.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::TokenDigest;
use crate::error::StoreError;
use crate::store::{RefreshRecord, RefreshRecordStore};

type RecordRow = (Uuid, String, Vec<u8>, bool);

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_record((id, subject, digest, used): RecordRow) -> Result<RefreshRecord, StoreError> {
    let token_digest = TokenDigest::try_from(digest.as_slice())
        .map_err(|_| StoreError::Backend(format!("record {} has a corrupt digest", id)))?;

    Ok(RefreshRecord {
        id: Some(id),
        subject,
        token_digest,
        used,
    })
}

#[async_trait::async_trait]
impl RefreshRecordStore for PostgresStore {
    async fn create(&self, record: &RefreshRecord) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, subject, token_digest, used, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(&record.subject)
        .bind(&record.token_digest.as_bytes()[..])
        .bind(record.used)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_by_digest(&self, digest: &TokenDigest) -> Result<RefreshRecord, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, subject, token_digest, used
            FROM refresh_tokens
            WHERE token_digest = $1
            "#,
        )
        .bind(&digest.as_bytes()[..])
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        into_record(row)
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Vec<RefreshRecord>, StoreError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, subject, token_digest, used
            FROM refresh_tokens
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(into_record).collect()
    }

    async fn mark_used(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET used = true, used_at = $1
            WHERE id = $2 AND used = false
            "#,
        )
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing flipped: tell a lost race apart from an unknown id.
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM refresh_tokens WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            Err(StoreError::AlreadyUsed)
        } else {
            Err(StoreError::NotFound)
        }
    }
}
