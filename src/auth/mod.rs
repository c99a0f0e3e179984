//! Credential lifecycle: secret generation, password hashing, the signed
//! token pair, the two-stage session pipeline and the user-facing flows.

mod cookies;
mod password;
mod secrets;
mod service;
mod session;
mod tokens;

pub mod handlers;

pub use cookies::{CookiePolicy, ACCESS_COOKIE, RENEWAL_COOKIE};
pub use password::PasswordHasher;
pub use secrets::{generate_opaque_token, generate_otp};
pub use service::{AuthService, ProfileUpdate, RegisterInput, TokenPair};
pub use session::{AuthenticatedIdentity, SessionVerifier};
pub use tokens::{Claims, TokenIssuer, TokenKind};
