use crate::config::ServicesConfig;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Outbound message delivery. Fire-and-forget from the core's point of
/// view: flows whose durable write already happened log a failure here
/// instead of failing the request.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn send_email(
        &self,
        name: &str,
        address: &str,
        link: Option<&str>,
        code: Option<i32>,
    ) -> Result<()>;

    async fn send_sms(&self, number: &str, code: i32) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    name: &'a str,
    address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<i32>,
}

#[derive(Debug, Serialize)]
struct SmsPayload<'a> {
    number: &'a str,
    code: i32,
}

/// JSON client for the mail/SMS relay service.
pub struct HttpMessageDispatcher {
    client: reqwest::Client,
    email_url: String,
    sms_url: String,
}

impl HttpMessageDispatcher {
    pub fn new(client: reqwest::Client, services: &ServicesConfig) -> Self {
        Self {
            client,
            email_url: services.email_url.clone(),
            sms_url: services.sms_url.clone(),
        }
    }
}

#[async_trait]
impl MessageDispatcher for HttpMessageDispatcher {
    async fn send_email(
        &self,
        name: &str,
        address: &str,
        link: Option<&str>,
        code: Option<i32>,
    ) -> Result<()> {
        self.client
            .post(&self.email_url)
            .json(&EmailPayload {
                name,
                address,
                link,
                code,
            })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn send_sms(&self, number: &str, code: i32) -> Result<()> {
        self.client
            .post(&self.sms_url)
            .json(&SmsPayload { number, code })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
