use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::NotewrightError;
use crate::types::{Document, DocumentId, ErrorBody, GenerateResponse};
use crate::upload::{UploadEntry, validate_prompt};

/// Fallback message when the service gives no `detail`.
pub const GENERIC_ERROR: &str = "An error occurred";

/// Thin client for the generation service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub client: reqwest::Client,
    pub config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// All documents, most recent first.
    pub async fn list_documents(&self) -> Result<Vec<Document>, NotewrightError> {
        let mut documents: Vec<Document> = self.get_json("articles").await?;
        // the service returns creation order
        documents.reverse();
        tracing::debug!(count = documents.len(), "fetched document list");
        Ok(documents)
    }

    pub async fn get_document(&self, id: &DocumentId) -> Result<Document, NotewrightError> {
        let url = self.config.document_endpoint(id.as_str())?;
        let document: Document = self.fetch_json("articles/{id}", url).await?;
        tracing::debug!(%id, title = %document.title, "fetched document");
        Ok(document)
    }

    /// Submit a prompt and its uploads. Returns the id of the new document.
    pub async fn generate(
        &self,
        prompt: &str,
        files: &[UploadEntry],
    ) -> Result<GenerateResponse, NotewrightError> {
        let prompt = validate_prompt(prompt)?;
        let endpoint = "generate-article";
        let url = self.config.endpoint(endpoint)?;

        let mut form = Form::new().text("prompt", prompt.to_string());
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.mime)
                .map_err(|e| NotewrightError::network(endpoint, e))?;
            form = form.part("files", part);
        }

        tracing::info!(files = files.len(), prompt_chars = prompt.chars().count(), "requesting generation");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| NotewrightError::network(endpoint, e))?;
        let created: GenerateResponse = decode(endpoint, response).await?;
        tracing::info!(id = %created.id, "generation finished");
        Ok(created)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, NotewrightError> {
        let url = self.config.endpoint(endpoint)?;
        self.fetch_json(endpoint, url).await
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: url::Url,
    ) -> Result<T, NotewrightError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NotewrightError::network(endpoint, e))?;
        decode(endpoint, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, NotewrightError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| NotewrightError::network(endpoint, e))?;
    if !status.is_success() {
        let err = status_error(endpoint, status, &body);
        tracing::warn!(endpoint, status = status.as_u16(), error = %err, "request failed");
        return Err(err);
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Map a non-2xx response onto the error taxonomy.
pub fn status_error(endpoint: &str, status: StatusCode, body: &[u8]) -> NotewrightError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return NotewrightError::QuotaExceeded;
    }
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| GENERIC_ERROR.to_string());
    NotewrightError::Http {
        endpoint: endpoint.into(),
        status: status.as_u16(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_quota() {
        let err = status_error(
            "generate-article",
            StatusCode::TOO_MANY_REQUESTS,
            br#"{"detail": "slow down"}"#,
        );
        assert!(err.is_quota());
        assert_eq!(err.to_string(), "Daily quota exceeded");
    }

    #[test]
    fn detail_is_surfaced() {
        let err = status_error("articles/3", StatusCode::NOT_FOUND, br#"{"detail": "Article not found"}"#);
        match err {
            NotewrightError::Http { status, ref detail, .. } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Article not found");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_or_garbled_body_uses_generic_message() {
        let err = status_error("articles", StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(err.to_string(), GENERIC_ERROR);
        let err = status_error("articles", StatusCode::BAD_GATEWAY, b"");
        assert_eq!(err.to_string(), GENERIC_ERROR);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_sending() {
        // unroutable base; validation must fail first
        let client = ApiClient::new(ApiConfig::new("http://127.0.0.1:9/api/").unwrap());
        let err = client.generate("   ", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            NotewrightError::Validation(crate::error::ValidationError::EmptyPrompt)
        ));
    }
}
