use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use url::Url;

use crate::routes;
use crate::types::{
    map_transport_error, ApiError, DownloadFormat, ErrorBody, RegenerateResponse, SessionPayload,
    SubmitResponse, TaskStatusResponse, UploadPayload, Workflow,
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Upper bound on a downloaded document's size.
    pub max_download_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_download_bytes: 10 * 1024 * 1024,
        }
    }
}

/// The backend operations the engine drives. One method per route so
/// tests can substitute a scripted double.
#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    async fn submit(
        &self,
        workflow: Workflow,
        upload: UploadPayload,
    ) -> Result<SubmitResponse, ApiError>;

    async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError>;

    async fn session(
        &self,
        workflow: Workflow,
        session_id: &str,
    ) -> Result<SessionPayload, ApiError>;

    async fn regenerate(
        &self,
        workflow: Workflow,
        session_id: &str,
    ) -> Result<RegenerateResponse, ApiError>;

    async fn download(
        &self,
        workflow: Workflow,
        format: DownloadFormat,
        session_id: &str,
    ) -> Result<Bytes, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    base: Url,
    client: reqwest::Client,
    max_download_bytes: u64,
}

impl HttpBackendClient {
    /// Builds a client for the given backend. The base URL is validated
    /// once here so later route joins cannot fail.
    pub fn new(base_url: &str, settings: ClientSettings) -> Result<Self, ApiError> {
        let mut base =
            Url::parse(base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "cannot append routes to {base_url}"
            )));
        }
        // Url::join drops the last path segment unless it ends in '/'.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        Ok(Self {
            base,
            client,
            max_download_bytes: settings.max_download_bytes,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }
}

#[async_trait::async_trait]
impl BackendClient for HttpBackendClient {
    async fn submit(
        &self,
        workflow: Workflow,
        upload: UploadPayload,
    ) -> Result<SubmitResponse, ApiError> {
        let part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        let form = multipart::Form::new()
            .part("resume", part)
            .text("job_description", upload.job_description);

        let response = self
            .client
            .post(self.endpoint(routes::submit(workflow))?)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError> {
        self.get_json(&routes::task_status(task_id)).await
    }

    async fn session(
        &self,
        workflow: Workflow,
        session_id: &str,
    ) -> Result<SessionPayload, ApiError> {
        let path = routes::session(workflow, session_id);
        match workflow {
            Workflow::Ats => Ok(SessionPayload::Resume(self.get_json(&path).await?)),
            Workflow::CoverLetter => Ok(SessionPayload::CoverLetter(self.get_json(&path).await?)),
        }
    }

    async fn regenerate(
        &self,
        workflow: Workflow,
        session_id: &str,
    ) -> Result<RegenerateResponse, ApiError> {
        self.post_json(&routes::regenerate(workflow, session_id))
            .await
    }

    /// Streams the document body, refusing anything over the size cap
    /// whether or not the server announced a length up front.
    async fn download(
        &self,
        workflow: Workflow,
        format: DownloadFormat,
        session_id: &str,
    ) -> Result<Bytes, ApiError> {
        let limit = self.max_download_bytes;
        let response = self
            .client
            .get(self.endpoint(&routes::download(workflow, format, session_id))?)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response).await?;

        if let Some(length) = response.content_length() {
            if length > limit {
                return Err(ApiError::TooLarge { limit });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_transport_error)?;
            if (bytes.len() + chunk.len()) as u64 > limit {
                return Err(ApiError::TooLarge { limit });
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(bytes))
    }
}

/// Rejects non-2xx responses, preferring the backend's `error` field
/// over a generic status line.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let code = status.as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| format!("Server error: {code}"));
    Err(ApiError::Backend {
        status: code,
        message,
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}
