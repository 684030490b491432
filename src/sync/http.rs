use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::TaskGateway;
use super::keyring::CredentialProvider;
use crate::core::form::StagedFile;
use crate::core::person::Person;
use crate::core::task::{Task, TaskId, TaskPayload};
use crate::error::GatewayError;

/// `TaskGateway` over the todo REST API.
#[derive(Clone)]
pub struct HttpTaskGateway {
    base_url: String,
    http: Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpTaskGateway {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialProvider>) -> Result<Self, String> {
        let http = Client::builder()
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self::with_client(base_url, http, credentials))
    }

    pub fn with_client(base_url: &str, http: Client, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request with the bearer token attached when one is available.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.credentials.bearer_token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, GatewayError> {
        builder.send().await.map_err(|e| {
            log::debug!("{} transport failure: {}", what, e);
            GatewayError::Network(format!("{} failed: {}", what, e))
        })
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<Vec<T>, GatewayError> {
        let builder = self.request(Method::GET, path).await;
        let resp = self.send(builder, &format!("GET /{}", path)).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            log::warn!("GET /{} returned {}", path, status);
            return Err(GatewayError::Network(message_from_text(&text, fallback)));
        }

        let value: serde_json::Value = decode(resp).await?;
        if !value.is_array() {
            log::warn!("GET /{} returned a non-array body; treating it as empty", path);
            return Ok(Vec::new());
        }
        serde_json::from_value(value)
            .map_err(|e| GatewayError::Decode(format!("Failed to parse response: {}", e)))
    }

    async fn send_task(
        &self,
        method: Method,
        path: &str,
        payload: &TaskPayload,
        files: &[StagedFile],
        fallback: &str,
    ) -> Result<Task, GatewayError> {
        let form = todo_form(payload, files)?;
        let what = format!("{} /{}", method, path);
        let builder = self.request(method, path).await.multipart(form);
        let resp = self.send(builder, &what).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            log::warn!("{} returned {}", what, status);
            return Err(GatewayError::Rejected(message_from_json(&text, fallback)));
        }

        decode(resp).await
    }
}

#[async_trait]
impl TaskGateway for HttpTaskGateway {
    async fn list_tasks(&self) -> Result<Vec<Task>, GatewayError> {
        self.fetch_list("todo", "Failed to fetch todos").await
    }

    async fn list_persons(&self) -> Result<Vec<Person>, GatewayError> {
        self.fetch_list("person", "Failed to fetch persons").await
    }

    async fn create_task(
        &self,
        payload: &TaskPayload,
        files: &[StagedFile],
    ) -> Result<Task, GatewayError> {
        self.send_task(Method::POST, "todo", payload, files, "Failed to create todo")
            .await
    }

    async fn update_task(
        &self,
        id: TaskId,
        payload: &TaskPayload,
        files: &[StagedFile],
    ) -> Result<Task, GatewayError> {
        let path = format!("todo/{}", id);
        self.send_task(Method::PUT, &path, payload, files, "Failed to update todo")
            .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), GatewayError> {
        let path = format!("todo/{}", id);
        let builder = self.request(Method::DELETE, &path).await;
        let resp = self.send(builder, &format!("DELETE /{}", path)).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            log::warn!("DELETE /{} returned {}", path, status);
            return Err(GatewayError::Network(message_from_text(&text, "Failed to delete todo")));
        }

        Ok(())
    }
}

/// Multipart body: a `todo` JSON part followed by one `files` part per attachment.
fn todo_form(payload: &TaskPayload, files: &[StagedFile]) -> Result<Form, GatewayError> {
    let json = serde_json::to_string(payload)
        .map_err(|e| GatewayError::Decode(format!("Failed to encode todo: {}", e)))?;
    let todo = Part::text(json)
        .mime_str("application/json")
        .map_err(|e| GatewayError::Network(format!("Invalid todo part: {}", e)))?;

    let mut form = Form::new().part("todo", todo);
    for file in files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.mime {
            part = part
                .mime_str(mime)
                .map_err(|e| GatewayError::Network(format!("Invalid MIME type {}: {}", mime, e)))?;
        }
        form = form.part("files", part);
    }
    Ok(form)
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    let text = resp
        .text()
        .await
        .map_err(|e| GatewayError::Network(format!("Failed to read response: {}", e)))?;
    serde_json::from_str(&text)
        .map_err(|e| GatewayError::Decode(format!("Failed to parse response: {}", e)))
}

/// Error text from a plain-text body, or `fallback` when the body is blank.
pub(crate) fn message_from_text(body: &str, fallback: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        fallback.to_string()
    } else {
        body.to_string()
    }
}

/// The `message` field of a JSON error body, or `fallback`.
pub(crate) fn message_from_json(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
