use crate::config::AppConfig;
use crate::error::ScreeningError;
use crate::report::DiagnosisRequest;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ReplyBody {
    reply: String,
}

/// The external screening service. Calls are user-triggered and never retried.
#[async_trait]
pub trait ScreeningApi: Send + Sync {
    async fn ask_math(&self, request: &DiagnosisRequest) -> Result<String, ScreeningError>;

    async fn ask_handwriting(
        &self,
        age: u8,
        image: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<String, ScreeningError>;
}

pub struct HttpScreeningApi {
    client: Client,
    base_url: String,
}

impl HttpScreeningApi {
    pub fn new(config: &AppConfig) -> Result<Self, ScreeningError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn read_reply(response: reqwest::Response) -> Result<String, ScreeningError> {
        if !response.status().is_success() {
            log::error!("Screening API error: {}", response.status());
            return Err(ScreeningError::Status(response.status().as_u16()));
        }
        let body: ReplyBody = response.json().await?;
        Ok(body.reply)
    }
}

#[async_trait]
impl ScreeningApi for HttpScreeningApi {
    async fn ask_math(&self, request: &DiagnosisRequest) -> Result<String, ScreeningError> {
        log::info!("Requesting diagnosis for {} games", request.scores.len());
        let response = self
            .client
            .post(self.url("askmath"))
            .json(request)
            .send()
            .await?;
        Self::read_reply(response).await
    }

    async fn ask_handwriting(
        &self,
        age: u8,
        image: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<String, ScreeningError> {
        log::info!("Sending handwriting sample ({} bytes)", image.len());
        let part = Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().text("age", age.to_string()).part("image", part);
        let response = self
            .client
            .post(self.url("ask"))
            .multipart(form)
            .send()
            .await?;
        Self::read_reply(response).await
    }
}
