use crate::config::AuthConfig;
use crate::error::AppError;
use crate::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Identity ID
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

/// Which of the two signing secrets a token belongs to. Access tokens are
/// short-lived; renewal tokens outlive them and gate their use (see the
/// session pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Renewal,
}

/// Issues and verifies the signed, time-bounded token pair. Each kind is
/// signed with its own secret, so one can never stand in for the other.
#[derive(Clone)]
pub struct TokenIssuer {
    access_secret: String,
    renewal_secret: String,
    access_ttl: Duration,
    renewal_ttl: Duration,
}

impl TokenIssuer {
    pub fn from_settings(auth: &AuthConfig) -> Self {
        Self {
            access_secret: auth.access_secret.clone(),
            renewal_secret: auth.renewal_secret.clone(),
            access_ttl: Duration::minutes(auth.access_ttl_minutes),
            renewal_ttl: Duration::days(auth.renewal_ttl_days),
        }
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Renewal => self.renewal_ttl,
        }
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.access_secret.as_bytes(),
            TokenKind::Renewal => self.renewal_secret.as_bytes(),
        }
    }

    pub fn issue(&self, kind: TokenKind, identity_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity_id.to_string(),
            exp: (now + self.ttl(kind)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret(kind)),
        )
        .map_err(|e| AppError::Infrastructure(format!("token signing: {}", e)))
    }

    /// Verifies signature and expiry. Every failure mode, including a subject
    /// that is not a well-formed id, collapses into `Unauthenticated`.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret(kind)),
            &validation,
        )?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthenticated)
    }
}
