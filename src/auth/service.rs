use crate::auth::password::PasswordHasher;
use crate::auth::secrets::{generate_opaque_token, generate_otp};
use crate::auth::tokens::{TokenIssuer, TokenKind};
use crate::clients::{MediaStore, MessageDispatcher};
use crate::db::models::{DeliveryMethod, Identity, IdentityChanges};
use crate::db::store::{IdentityStore, OtpStore, ResetStore};
use crate::error::AppError;
use crate::{Result, Settings};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub avatar: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<Vec<u8>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.password.is_none()
            && self.avatar.is_none()
    }
}

#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub renewal: String,
}

/// The user-facing credential flows, composed from the generator, the
/// stores, the hasher, the token issuer and the external collaborators.
///
/// Every flow validates before it mutates and performs at most one durable
/// write, ordered last, so a crash mid-flow leaves no half-applied state.
pub struct AuthService {
    identities: Arc<dyn IdentityStore>,
    otps: Arc<dyn OtpStore>,
    resets: Arc<dyn ResetStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    dispatcher: Arc<dyn MessageDispatcher>,
    media: Arc<dyn MediaStore>,
    otp_ttl: Duration,
    reset_ttl: Duration,
    client_app_url: String,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: &Settings,
        issuer: TokenIssuer,
        identities: Arc<dyn IdentityStore>,
        otps: Arc<dyn OtpStore>,
        resets: Arc<dyn ResetStore>,
        dispatcher: Arc<dyn MessageDispatcher>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            identities,
            otps,
            resets,
            hasher: PasswordHasher::new(settings.auth.bcrypt_cost),
            issuer,
            dispatcher,
            media,
            otp_ttl: Duration::minutes(settings.auth.otp_ttl_minutes),
            reset_ttl: Duration::minutes(settings.auth.reset_ttl_minutes),
            client_app_url: settings.services.client_app_url.clone(),
        }
    }

    /// Generate a fresh code, upsert it under the receiver (replacing any
    /// prior code) and hand it to the matching delivery collaborator. The
    /// code never appears in the response; it only travels out of band.
    pub async fn send_otp(&self, method: DeliveryMethod, receiver: &str) -> Result<()> {
        let code = generate_otp();
        self.otps.upsert(receiver, method, code).await?;

        // The code is durably stored; a delivery hiccup is not fatal.
        let delivery = match method {
            DeliveryMethod::Email => self.dispatcher.send_email("", receiver, None, Some(code)).await,
            DeliveryMethod::Number => self.dispatcher.send_sms(receiver, code).await,
        };
        if let Err(err) = delivery {
            warn!("otp delivery to {} failed: {}", receiver, err);
        }

        Ok(())
    }

    /// Consume-once verification: an exact (receiver, code) hit deletes the
    /// record, so the same code can never verify twice.
    pub async fn verify_otp(&self, receiver: &str, code: i32) -> Result<()> {
        let entry = self
            .otps
            .find_by_receiver_and_code(receiver, code)
            .await?
            .ok_or_else(|| AppError::Conflict("Code is incorrect!".into()))?;

        if Utc::now() - entry.updated_at > self.otp_ttl {
            // A stale match is consumed as well, so it cannot be replayed.
            self.otps.delete(entry.id).await?;
            return Err(AppError::Conflict("Code has expired!".into()));
        }

        self.otps.delete(entry.id).await?;
        Ok(())
    }

    pub async fn register(&self, input: RegisterInput) -> Result<Identity> {
        if self.identities.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(
                "User already exists with the same email".into(),
            ));
        }

        let password_hash = self.hasher.hash(&input.password)?;

        let avatar = match input.avatar {
            Some(bytes) => Some(self.media.upload(bytes).await?),
            None => None,
        };

        // Durable write last.
        let identity = Identity::new(
            input.name,
            input.email,
            input.phone,
            password_hash,
            avatar,
        );
        self.identities.create(&identity).await
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Identity, TokenPair)> {
        let identity = self
            .identities
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.hasher.verify(password, &identity.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let pair = self.issue_session(identity.id)?;
        Ok((identity, pair))
    }

    pub fn issue_session(&self, identity_id: Uuid) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.issuer.issue(TokenKind::Access, identity_id)?,
            renewal: self.issuer.issue(TokenKind::Renewal, identity_id)?,
        })
    }

    pub async fn current_identity(&self, id: Uuid) -> Result<Identity> {
        self.identities
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found!".into()))
    }

    /// Mint a single-use reset token for the account behind `email` and mail
    /// a link carrying it. A newer request supersedes the previous token.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let identity = self.identities.find_by_email(email).await?.ok_or_else(|| {
            AppError::NotFound("User does not exist with the provided email!".into())
        })?;

        let token = generate_opaque_token();
        self.resets.upsert(identity.id, &token).await?;

        let link = format!("{}/resetpassword/{}", self.client_app_url, token);
        if let Err(err) = self
            .dispatcher
            .send_email(&identity.name, email, Some(&link), None)
            .await
        {
            warn!("reset link delivery to {} failed: {}", email, err);
        }

        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        if token.is_empty() {
            return Err(AppError::Forbidden);
        }
        if new_password.is_empty() {
            return Err(AppError::Validation("New password is missing!".into()));
        }

        let entry = self.resets.find_by_token(token).await?.ok_or_else(|| {
            AppError::NotFound("Looks like the reset password link has expired!".into())
        })?;

        if Utc::now() - entry.created_at > self.reset_ttl {
            self.resets.delete(entry.id).await?;
            return Err(AppError::NotFound(
                "Looks like the reset password link has expired!".into(),
            ));
        }

        let password_hash = self.hasher.hash(new_password)?;
        self.identities
            .update(
                entry.identity_id,
                IdentityChanges {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("User not found!".into()))?;

        // Single use: the capability dies with the successful reset.
        self.resets.delete(entry.id).await?;
        Ok(())
    }

    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Identity> {
        if update.is_empty() {
            return Err(AppError::Validation(
                "No data found to update the profile".into(),
            ));
        }

        let previous = self
            .identities
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found!".into()))?;

        let mut changes = IdentityChanges {
            name: update.name,
            email: update.email,
            phone: update.phone,
            ..Default::default()
        };

        if let Some(password) = update.password {
            changes.password_hash = Some(self.hasher.hash(&password)?);
        }

        let replaced_avatar = match update.avatar {
            Some(bytes) => {
                let media = self.media.upload(bytes).await?;
                changes.avatar_url = Some(media.url);
                changes.media_id = Some(media.media_id);
                true
            }
            None => false,
        };

        let updated = self
            .identities
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found!".into()))?;

        // The profile update is already durable; losing the orphaned media
        // object is a cleanup problem, not a request failure.
        if replaced_avatar {
            if let Some(old_media_id) = previous.media_id.as_deref() {
                if let Err(err) = self.media.destroy(old_media_id).await {
                    warn!("failed to destroy replaced media {}: {}", old_media_id, err);
                }
            }
        }

        Ok(updated)
    }
}
