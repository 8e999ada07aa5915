//! HTTP backend implementation for Searchlens
//!
//! Talks to the backend over `reqwest`: JSON for chat, multipart for image
//! analysis. Every failure is classified into an [`ApiError`] and logged.

use crate::api::{AnalysisReply, ApiError, Backend, ChatReply, ChatRequest, ErrorBody, HealthReply};
use crate::config::BackendConfig;
use crate::error::{Result, SearchlensError};
use crate::image_file::ImageFile;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend reached over HTTP
///
/// # Examples
///
/// ```
/// use searchlens::api::HttpBackend;
/// use searchlens::config::BackendConfig;
///
/// let backend = HttpBackend::new(BackendConfig::default()).unwrap();
/// assert_eq!(backend.endpoint("/api/chat"), "http://localhost:5000/api/chat");
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    /// Create a new HTTP backend
    ///
    /// No timeout is applied unless `request_timeout_seconds` is set.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: BackendConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| {
            SearchlensError::Backend(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    /// Resolve an endpoint path against the configured base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Read a response, mapping non-2xx statuses and bad bodies to `ApiError`
    async fn read_json<T: DeserializeOwned>(
        response: Response,
        endpoint: &str,
    ) -> std::result::Result<T, ApiError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body from {}: {}", endpoint, e);
            ApiError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .unwrap_or_default()
                .error;
            tracing::error!(
                "{} returned error {}: {}",
                endpoint,
                status,
                message.as_deref().unwrap_or("<no error field>")
            );
            return Err(ApiError::Application {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("Failed to parse response from {}: {}", endpoint, e);
            ApiError::Malformed(e.to_string())
        })
    }
}

fn transport_error(endpoint: &str, e: reqwest::Error) -> ApiError {
    tracing::error!("Request to {} failed: {}", endpoint, e);
    ApiError::Transport(e.to_string())
}

#[async_trait]
impl Backend for HttpBackend {
    async fn chat(&self, message: &str) -> std::result::Result<ChatReply, ApiError> {
        let url = self.endpoint("/api/chat");
        tracing::debug!("Sending chat request: {} chars", message.len());

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let reply: ChatReply = Self::read_json(response, &url).await?;
        tracing::debug!(
            "Chat reply: {} chars, {} sources, web_search={}",
            reply.response.len(),
            reply.sources.len(),
            reply.web_search_performed
        );
        Ok(reply)
    }

    async fn analyze_image(
        &self,
        image: &ImageFile,
        question: &str,
    ) -> std::result::Result<AnalysisReply, ApiError> {
        let url = self.endpoint("/api/analyze-image");
        tracing::debug!(
            "Uploading {} ({}, {} bytes) for analysis",
            image.name(),
            image.mime_type(),
            image.len()
        );

        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_string())
            .mime_str(image.mime_type())
            .map_err(|e| ApiError::Transport(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new()
            .part("image", part)
            .text("question", question.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        Self::read_json(response, &url).await
    }

    async fn health(&self) -> std::result::Result<HealthReply, ApiError> {
        let url = self.endpoint("/api/health");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        Self::read_json(response, &url).await
    }
}
