use crate::config::ServicesConfig;
use crate::db::models::StoredMedia;
use crate::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

/// External object store for avatars. Upload hands back a public URL and an
/// object id; destroy removes a previously stored object by that id.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>) -> Result<StoredMedia>;
    async fn destroy(&self, media_id: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct UploadPayload {
    content: String,
}

#[derive(Debug, Serialize)]
struct DestroyPayload<'a> {
    media_id: &'a str,
}

pub struct HttpMediaStore {
    client: reqwest::Client,
    media_url: String,
}

impl HttpMediaStore {
    pub fn new(client: reqwest::Client, services: &ServicesConfig) -> Self {
        Self {
            client,
            media_url: services.media_url.clone(),
        }
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(&self, bytes: Vec<u8>) -> Result<StoredMedia> {
        let media = self
            .client
            .post(format!("{}/upload", self.media_url))
            .json(&UploadPayload {
                content: STANDARD.encode(bytes),
            })
            .send()
            .await?
            .error_for_status()?
            .json::<StoredMedia>()
            .await?;

        Ok(media)
    }

    async fn destroy(&self, media_id: &str) -> Result<()> {
        self.client
            .post(format!("{}/destroy", self.media_url))
            .json(&DestroyPayload { media_id })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
