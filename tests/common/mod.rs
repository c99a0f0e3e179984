//! Shared test fixtures: in-memory stores and recording collaborators
//! wired into an `AppState`, plus the route table under test.

use actix_web::web;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use gatehouse_server::auth::handlers::{
    current_identity, forgot_password, login, logout, register, reset_password, send_otp,
    update_profile, verify_otp,
};
use gatehouse_server::clients::{MediaStore, MessageDispatcher};
use gatehouse_server::db::{
    DeliveryMethod, Identity, IdentityChanges, IdentityStore, OtpStore, PendingOtp, PendingReset,
    ResetStore, StoredMedia,
};
use gatehouse_server::error::AppError;
use gatehouse_server::{AppState, Result, Settings};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryIdentityStore {
    rows: Mutex<HashMap<Uuid, Identity>>,
}

impl MemoryIdentityStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<Identity> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn get_by_email(&self, email: &str) -> Option<Identity> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .find(|i| i.email == email)
            .cloned()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|i| i.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, identity: &Identity) -> Result<Identity> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|i| i.email == identity.email) {
            return Err(AppError::Conflict(
                "User already exists with the same email".into(),
            ));
        }
        rows.insert(identity.id, identity.clone());
        Ok(identity.clone())
    }

    async fn update(&self, id: Uuid, changes: IdentityChanges) -> Result<Option<Identity>> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(email) = &changes.email {
            if rows.values().any(|i| i.id != id && &i.email == email) {
                return Err(AppError::Conflict(
                    "User already exists with the same email".into(),
                ));
            }
        }
        let Some(identity) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            identity.name = name;
        }
        if let Some(email) = changes.email {
            identity.email = email;
        }
        if let Some(phone) = changes.phone {
            identity.phone = Some(phone);
        }
        if let Some(hash) = changes.password_hash {
            identity.password_hash = hash;
        }
        if let Some(url) = changes.avatar_url {
            identity.avatar_url = Some(url);
        }
        if let Some(media_id) = changes.media_id {
            identity.media_id = Some(media_id);
        }
        identity.updated_at = Utc::now();
        Ok(Some(identity.clone()))
    }
}

#[derive(Default)]
pub struct MemoryOtpStore {
    rows: Mutex<HashMap<String, PendingOtp>>,
}

impl MemoryOtpStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn code_for(&self, receiver: &str) -> Option<i32> {
        self.rows.lock().unwrap().get(receiver).map(|o| o.code)
    }

    /// Backdates a stored code, for exercising the TTL path.
    pub fn age(&self, receiver: &str, by: Duration) {
        if let Some(row) = self.rows.lock().unwrap().get_mut(receiver) {
            row.updated_at -= by;
        }
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn upsert(&self, receiver: &str, method: DeliveryMethod, code: i32) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(receiver) {
            Some(row) => {
                row.method = method.as_str().to_string();
                row.code = code;
                row.updated_at = Utc::now();
            }
            None => {
                rows.insert(
                    receiver.to_string(),
                    PendingOtp {
                        id: Uuid::new_v4(),
                        receiver: receiver.to_string(),
                        method: method.as_str().to_string(),
                        code,
                        updated_at: Utc::now(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn find_by_receiver_and_code(
        &self,
        receiver: &str,
        code: i32,
    ) -> Result<Option<PendingOtp>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(receiver)
            .filter(|o| o.code == code)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.rows.lock().unwrap().retain(|_, o| o.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryResetStore {
    rows: Mutex<HashMap<Uuid, PendingReset>>,
}

impl MemoryResetStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn token_for(&self, identity_id: Uuid) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .get(&identity_id)
            .map(|r| r.token.clone())
    }

    pub fn age(&self, identity_id: Uuid, by: Duration) {
        if let Some(row) = self.rows.lock().unwrap().get_mut(&identity_id) {
            row.created_at -= by;
        }
    }
}

#[async_trait]
impl ResetStore for MemoryResetStore {
    async fn upsert(&self, identity_id: Uuid, token: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&identity_id) {
            Some(row) => {
                row.token = token.to_string();
                row.created_at = Utc::now();
            }
            None => {
                rows.insert(
                    identity_id,
                    PendingReset {
                        id: Uuid::new_v4(),
                        identity_id,
                        token: token.to_string(),
                        created_at: Utc::now(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<PendingReset>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|r| r.token == token)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.rows.lock().unwrap().retain(|_, r| r.id != id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Email {
        name: String,
        address: String,
        link: Option<String>,
        code: Option<i32>,
    },
    Sms {
        number: String,
        code: i32,
    },
}

/// Records outbound messages; can be flipped to fail every dispatch to
/// exercise the fire-and-forget paths.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<SentMessage>>,
    pub failing: AtomicBool,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Infrastructure("relay down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageDispatcher for RecordingDispatcher {
    async fn send_email(
        &self,
        name: &str,
        address: &str,
        link: Option<&str>,
        code: Option<i32>,
    ) -> Result<()> {
        self.check()?;
        self.sent.lock().unwrap().push(SentMessage::Email {
            name: name.to_string(),
            address: address.to_string(),
            link: link.map(str::to_string),
            code,
        });
        Ok(())
    }

    async fn send_sms(&self, number: &str, code: i32) -> Result<()> {
        self.check()?;
        self.sent.lock().unwrap().push(SentMessage::Sms {
            number: number.to_string(),
            code,
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMediaStore {
    uploads: AtomicUsize,
    pub destroyed: Mutex<Vec<String>>,
}

impl RecordingMediaStore {
    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(&self, _bytes: Vec<u8>) -> Result<StoredMedia> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(StoredMedia {
            url: format!("https://cdn.test/{}.png", n),
            media_id: format!("media-{}", n),
        })
    }

    async fn destroy(&self, media_id: &str) -> Result<()> {
        self.destroyed.lock().unwrap().push(media_id.to_string());
        Ok(())
    }
}

pub struct TestContext {
    pub data: web::Data<AppState>,
    pub settings: Settings,
    pub identities: Arc<MemoryIdentityStore>,
    pub otps: Arc<MemoryOtpStore>,
    pub resets: Arc<MemoryResetStore>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub media: Arc<RecordingMediaStore>,
}

pub fn test_context() -> TestContext {
    let settings = Settings::new_for_test().expect("Failed to load test config");
    let identities = Arc::new(MemoryIdentityStore::default());
    let otps = Arc::new(MemoryOtpStore::default());
    let resets = Arc::new(MemoryResetStore::default());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let media = Arc::new(RecordingMediaStore::default());

    let state = AppState::with_parts(
        settings.clone(),
        identities.clone(),
        otps.clone(),
        resets.clone(),
        dispatcher.clone(),
        media.clone(),
    );

    TestContext {
        data: web::Data::new(state),
        settings,
        identities,
        otps,
        resets,
        dispatcher,
        media,
    }
}

/// The same route table `main.rs` serves.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(gatehouse_server::health_check))
        .service(
            web::scope("/auth")
                .route("/otp", web::put().to(send_otp))
                .route("/otp", web::delete().to(verify_otp))
                .route("/register", web::post().to(register))
                .route("/login", web::post().to(login))
                .route("/logout", web::get().to(logout))
                .route("/password/forgot", web::put().to(forgot_password))
                .route("/password/reset/{token}", web::patch().to(reset_password))
                .route("/me", web::get().to(current_identity))
                .route("/profile", web::put().to(update_profile)),
        );
}
