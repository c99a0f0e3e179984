pub mod auth;
pub mod clients;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpResponse;

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

use auth::{AuthService, CookiePolicy, SessionVerifier, TokenIssuer};
use clients::{HttpMediaStore, HttpMessageDispatcher, MediaStore, MessageDispatcher};
use db::{IdentityStore, OtpStore, PgIdentityStore, PgOtpStore, PgResetStore, ResetStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all handlers, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub service: Arc<AuthService>,
    pub verifier: SessionVerifier,
    pub cookies: CookiePolicy,
}

impl AppState {
    /// Wires the Postgres stores and the HTTP collaborators.
    pub async fn new(config: Settings) -> Result<Self> {
        let pool = db::connect_pool(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(5),
        )
        .await?;

        let identities = Arc::new(PgIdentityStore::new(pool.clone()));
        let otps = Arc::new(PgOtpStore::new(pool.clone()));
        let resets = Arc::new(PgResetStore::new(pool));

        let http = reqwest::Client::new();
        let dispatcher = Arc::new(HttpMessageDispatcher::new(http.clone(), &config.services));
        let media = Arc::new(HttpMediaStore::new(http, &config.services));

        Ok(Self::with_parts(
            config, identities, otps, resets, dispatcher, media,
        ))
    }

    /// Assembly seam: tests inject in-memory stores and recording
    /// collaborators here.
    pub fn with_parts(
        config: Settings,
        identities: Arc<dyn IdentityStore>,
        otps: Arc<dyn OtpStore>,
        resets: Arc<dyn ResetStore>,
        dispatcher: Arc<dyn MessageDispatcher>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let issuer = TokenIssuer::from_settings(&config.auth);
        let cookies = CookiePolicy::new(&config, &issuer);
        let verifier = SessionVerifier::new(issuer.clone());
        let service = AuthService::new(
            &config, issuer, identities, otps, resets, dispatcher, media,
        );

        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            verifier,
            cookies,
        }
    }
}
