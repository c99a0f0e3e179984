use crate::auth::tokens::{TokenIssuer, TokenKind};
use crate::Settings;
use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const RENEWAL_COOKIE: &str = "refreshToken";

/// Builds the cookies that carry the token pair. Both are http-only; in
/// production they are Secure with SameSite=None (the client app lives on
/// another origin), elsewhere SameSite=Lax over plain HTTP.
#[derive(Clone)]
pub struct CookiePolicy {
    production: bool,
    access_max_age: Duration,
    renewal_max_age: Duration,
}

impl CookiePolicy {
    pub fn new(settings: &Settings, issuer: &TokenIssuer) -> Self {
        Self {
            production: settings.is_production(),
            access_max_age: Duration::seconds(issuer.ttl(TokenKind::Access).num_seconds()),
            renewal_max_age: Duration::seconds(issuer.ttl(TokenKind::Renewal).num_seconds()),
        }
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .secure(self.production)
            .same_site(if self.production {
                SameSite::None
            } else {
                SameSite::Lax
            })
            .max_age(max_age)
            .finish()
    }

    pub fn access(&self, token: String) -> Cookie<'static> {
        self.build(ACCESS_COOKIE, token, self.access_max_age)
    }

    pub fn renewal(&self, token: String) -> Cookie<'static> {
        self.build(RENEWAL_COOKIE, token, self.renewal_max_age)
    }

    /// Immediate expiry, used by logout.
    pub fn expire(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), Duration::ZERO);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }
}
