/// Refresh Record Store
///
/// Persistence contract for issued refresh tokens. The rotation use cases only
/// talk to `RefreshRecordStore`; adapters live in the submodules.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

use uuid::Uuid;

use crate::auth::TokenDigest;
use crate::error::StoreError;

/// Durable record of one issued refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRecord {
    /// Storage-assigned id, `None` until persisted
    pub id: Option<Uuid>,
    pub subject: String,
    pub token_digest: TokenDigest,
    pub used: bool,
}

impl RefreshRecord {
    /// A fresh, unused record for a just-issued refresh token
    pub fn issued(subject: &str, token_digest: TokenDigest) -> Self {
        Self {
            id: None,
            subject: subject.to_string(),
            token_digest,
            used: false,
        }
    }
}

#[async_trait::async_trait]
pub trait RefreshRecordStore: Send + Sync {
    /// Insert a record and return its id. A duplicate digest is `StoreError::Conflict`.
    async fn create(&self, record: &RefreshRecord) -> Result<Uuid, StoreError>;

    /// Fetch the record for a digest, or `StoreError::NotFound`.
    async fn find_by_digest(&self, digest: &TokenDigest) -> Result<RefreshRecord, StoreError>;

    /// All records issued to a subject, in no particular order.
    async fn find_by_subject(&self, subject: &str) -> Result<Vec<RefreshRecord>, StoreError>;

    /// Flip `used` to true only if it is currently false.
    ///
    /// `StoreError::AlreadyUsed` when another caller got there first,
    /// `StoreError::NotFound` when no record has this id.
    async fn mark_used(&self, id: Uuid) -> Result<(), StoreError>;
}
