/// Login and Refresh Use Cases
///
/// Issues token pairs and rotates them. Every issued refresh token gets a
/// record keyed by its digest; a refresh redeems that record exactly once
/// and issues a new pair in its place.
///
/// All credential failures leave this module as `AppError::Unauthorized`.
/// The precise reason is only logged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::auth::jwt::TokenCodec;
use crate::auth::pair::{ensure_pair, PairGenerator, TokenPair};
use crate::auth::refresh_token::TokenDigest;
use crate::configuration::{JwtSettings, ReusePolicy};
use crate::error::{AppError, StoreError, TokenError};
use crate::store::{RefreshRecord, RefreshRecordStore};

pub struct TokenService {
    codec: TokenCodec,
    pairs: PairGenerator,
    store: Arc<dyn RefreshRecordStore>,
    reuse_policy: ReusePolicy,
    store_timeout: Duration,
}

impl TokenService {
    pub fn new(
        config: &JwtSettings,
        store: Arc<dyn RefreshRecordStore>,
        reuse_policy: ReusePolicy,
        store_timeout: Duration,
    ) -> Self {
        let codec = TokenCodec::new(config);
        Self {
            pairs: PairGenerator::new(codec.clone(), config),
            codec,
            store,
            reuse_policy,
            store_timeout,
        }
    }

    /// Issue a fresh pair for `subject`
    ///
    /// # Errors
    /// - `InvalidInput` if the subject is empty
    /// - `Conflict` if the refresh digest already exists
    /// - `Internal` on signing or store failure
    pub async fn login(&self, subject: &str) -> Result<TokenPair, AppError> {
        if subject.is_empty() {
            return Err(AppError::InvalidInput("guid is required".to_string()));
        }

        let pair = self.pairs.generate_pair(subject)?;
        self.save(subject, &pair).await?;

        tracing::info!(operation = "login", subject = %subject, "Tokens generated");
        Ok(pair)
    }

    /// Exchange a paired access/refresh token for a new pair
    ///
    /// The access token may be expired; the refresh token may not.
    ///
    /// # Errors
    /// - `InvalidInput` if either token is empty
    /// - `Unauthorized` for any decode, pairing, ownership or replay failure
    /// - `Conflict` if the new refresh digest already exists
    /// - `Internal` on signing or store failure
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<TokenPair, AppError> {
        if refresh_token.is_empty() {
            return Err(AppError::InvalidInput("refresh token is required".to_string()));
        }
        if access_token.is_empty() {
            return Err(AppError::InvalidInput("access token is required".to_string()));
        }

        let refresh_claims = self.codec.decode(refresh_token).map_err(|e| {
            tracing::warn!(operation = "refresh", error = %e, "Refresh token rejected");
            AppError::Unauthorized
        })?;

        let access_claims = match self.codec.decode(access_token) {
            Ok(claims) => claims,
            Err(TokenError::Expired(claims)) => *claims,
            Err(e) => {
                tracing::warn!(operation = "refresh", error = %e, "Access token rejected");
                return Err(AppError::Unauthorized);
            }
        };

        ensure_pair(&access_claims, &refresh_claims).map_err(|e| {
            tracing::warn!(operation = "refresh", error = %e, "Tokens do not match");
            AppError::Unauthorized
        })?;

        let subject = refresh_claims.sub;
        let digest = TokenDigest::of(refresh_token);

        let record = match self
            .bounded("find_by_digest", self.store.find_by_digest(&digest))
            .await
        {
            Ok(record) => record,
            Err(StoreError::NotFound) => {
                tracing::warn!(operation = "refresh", digest = ?digest, "Refresh token not found");
                return Err(AppError::Unauthorized);
            }
            Err(e) => {
                tracing::error!(operation = "refresh", error = %e, "Failed to get refresh token");
                return Err(AppError::Internal(e.to_string()));
            }
        };

        if record.subject != subject {
            tracing::warn!(operation = "refresh", subject = %subject, "Refresh token owner mismatch");
            return Err(AppError::Unauthorized);
        }
        if record.used {
            tracing::warn!(operation = "refresh", subject = %subject, "Refresh token replayed");
            self.on_reuse(&subject).await;
            return Err(AppError::Unauthorized);
        }

        let id = record
            .id
            .ok_or_else(|| AppError::Internal("stored refresh record has no id".to_string()))?;

        let pair = self.pairs.generate_pair(&subject)?;

        // Burn the old token before the new one exists.
        match self.bounded("mark_used", self.store.mark_used(id)).await {
            Ok(()) => {}
            Err(StoreError::AlreadyUsed) => {
                tracing::warn!(operation = "refresh", subject = %subject, "Refresh token redeemed concurrently");
                self.on_reuse(&subject).await;
                return Err(AppError::Unauthorized);
            }
            Err(e) => {
                tracing::error!(operation = "refresh", error = %e, "Failed to update refresh token");
                return Err(AppError::Internal(e.to_string()));
            }
        }

        self.save(&subject, &pair).await?;

        tracing::info!(operation = "refresh", subject = %subject, "Tokens refreshed");
        Ok(pair)
    }

    /// Mark every unused refresh record of `subject` as used
    ///
    /// Returns how many records this call burned.
    pub async fn revoke_subject(&self, subject: &str) -> Result<usize, AppError> {
        let records = self
            .bounded("find_by_subject", self.store.find_by_subject(subject))
            .await?;

        let mut revoked = 0;
        for id in records.iter().filter(|r| !r.used).filter_map(|r| r.id) {
            match self.bounded("mark_used", self.store.mark_used(id)).await {
                Ok(()) => revoked += 1,
                Err(StoreError::AlreadyUsed) => {}
                Err(e) => return Err(AppError::Internal(e.to_string())),
            }
        }

        tracing::info!(subject = %subject, revoked, "Refresh tokens revoked for subject");
        Ok(revoked)
    }

    async fn on_reuse(&self, subject: &str) {
        if self.reuse_policy != ReusePolicy::RevokeSubject {
            return;
        }
        if let Err(e) = self.revoke_subject(subject).await {
            tracing::error!(subject = %subject, error = %e, "Failed to revoke tokens after reuse");
        }
    }

    async fn save(&self, subject: &str, pair: &TokenPair) -> Result<Uuid, AppError> {
        let record = RefreshRecord::issued(subject, TokenDigest::of(&pair.refresh_token));

        self.bounded("create", self.store.create(&record))
            .await
            .map_err(|e| {
                tracing::error!(subject = %subject, error = %e, "Failed to save refresh token");
                AppError::from(e)
            })
    }

    /// Run a store call under the configured deadline
    async fn bounded<T, F>(&self, op: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(op))?
    }
}
