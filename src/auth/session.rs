use crate::auth::cookies::{ACCESS_COOKIE, RENEWAL_COOKIE};
use crate::auth::tokens::{TokenIssuer, TokenKind};
use crate::error::AppError;
use crate::{AppState, Result};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Two-stage verification pipeline run for every protected request.
///
/// Stage R validates the renewal token; stage A validates the access token.
/// R strictly gates A: a stale or rotated renewal token kills the session
/// even while a technically-valid access token is still in hand. Both
/// tokens must name the same identity. Verification is pure and stateless;
/// there is no server-side session table.
#[derive(Clone)]
pub struct SessionVerifier {
    issuer: TokenIssuer,
}

impl SessionVerifier {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }

    /// Stage R. The identity extracted here is not yet used for
    /// authorization; it only gates stage A.
    pub fn check_renewal(&self, token: Option<&str>) -> Result<Uuid> {
        let token = token.ok_or(AppError::Unauthenticated)?;
        self.issuer.verify(TokenKind::Renewal, token)
    }

    /// Stage A. The identity extracted here is the one bound for handlers.
    pub fn check_access(&self, token: Option<&str>) -> Result<Uuid> {
        let token = token.ok_or(AppError::Unauthenticated)?;
        self.issuer.verify(TokenKind::Access, token)
    }

    pub fn authenticate(&self, renewal: Option<&str>, access: Option<&str>) -> Result<Uuid> {
        let renewal_id = self.check_renewal(renewal)?;
        let access_id = self.check_access(access)?;
        if renewal_id != access_id {
            return Err(AppError::Unauthenticated);
        }
        Ok(access_id)
    }
}

/// Extractor that reads both token cookies and runs the pipeline. Handlers
/// taking this parameter are reachable only with a fully verified session.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedIdentity(pub Uuid);

impl FromRequest for AuthenticatedIdentity {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state,
            None => {
                return ready(Err(AppError::Infrastructure(
                    "application state not configured".into(),
                )))
            }
        };

        let renewal = req.cookie(RENEWAL_COOKIE).map(|c| c.value().to_string());
        let access = req.cookie(ACCESS_COOKIE).map(|c| c.value().to_string());

        ready(
            state
                .verifier
                .authenticate(renewal.as_deref(), access.as_deref())
                .map(AuthenticatedIdentity),
        )
    }
}
