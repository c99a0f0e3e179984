//! Durable storage: identities plus the pending-credential stores.
//!
//! Store access goes through the traits in [`store`]; the Postgres
//! implementations live in [`operations`]. Upserts are single conditional
//! writes at the database level.

pub mod models;
pub mod operations;
pub mod store;

pub use models::{
    DeliveryMethod, Identity, IdentityChanges, PendingOtp, PendingReset, StoredMedia,
};
pub use operations::{connect_pool, PgIdentityStore, PgOtpStore, PgResetStore};
pub use store::{IdentityStore, OtpStore, ResetStore};
