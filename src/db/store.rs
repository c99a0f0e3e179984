use crate::db::models::{DeliveryMethod, Identity, IdentityChanges, PendingOtp, PendingReset};
use crate::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Store of registered users. A missing row is `Ok(None)`; only
/// infrastructure trouble is an `Err`.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>>;
    async fn create(&self, identity: &Identity) -> Result<Identity>;
    /// Merge-update; returns the updated record, `None` if the id is gone.
    async fn update(&self, id: Uuid, changes: IdentityChanges) -> Result<Option<Identity>>;
}

/// Pending OTP codes, keyed by receiver. `upsert` must be a single atomic
/// conditional write at the store level — never read-then-write from the
/// orchestrator, or two concurrent sends for one receiver race into two
/// live codes.
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn upsert(&self, receiver: &str, method: DeliveryMethod, code: i32) -> Result<()>;
    /// Exact match on receiver AND code; anything else is `None`.
    async fn find_by_receiver_and_code(
        &self,
        receiver: &str,
        code: i32,
    ) -> Result<Option<PendingOtp>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Pending password resets, keyed by owning identity; the token is the
/// lookup key at redemption time. Same atomic upsert requirement as OTPs.
#[async_trait]
pub trait ResetStore: Send + Sync {
    async fn upsert(&self, identity_id: Uuid, token: &str) -> Result<()>;
    async fn find_by_token(&self, token: &str) -> Result<Option<PendingReset>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}
