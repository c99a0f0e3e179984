use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user. Never hard-deleted; password reset and profile update
/// mutate it in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub media_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(
        name: String,
        email: String,
        phone: Option<String>,
        password_hash: String,
        avatar: Option<StoredMedia>,
    ) -> Self {
        let now = Utc::now();
        let (avatar_url, media_id) = match avatar {
            Some(media) => (Some(media.url), Some(media.media_id)),
            None => (None, None),
        };
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            password_hash,
            avatar_url,
            media_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field-wise merge applied by profile update and password reset. `None`
/// leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
    pub media_id: Option<String>,
}

impl IdentityChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.password_hash.is_none()
            && self.avatar_url.is_none()
            && self.media_id.is_none()
    }
}

/// How an OTP leaves the system: `email` or `number` (SMS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Email,
    Number,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Email => "email",
            DeliveryMethod::Number => "number",
        }
    }
}

/// A pending verification code. The receiver is the natural key: at most one
/// live code per receiver, a newer request overwrites the old one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingOtp {
    pub id: Uuid,
    pub receiver: String,
    pub method: String,
    pub code: i32,
    pub updated_at: DateTime<Utc>,
}

/// A single-use password-reset capability, keyed by the owning identity.
/// Lookup at reset time goes through the token, not the identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingReset {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Handle returned by the media collaborator for an uploaded object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMedia {
    pub url: String,
    pub media_id: String,
}
