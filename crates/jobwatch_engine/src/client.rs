use std::time::Duration;

use jobwatch_core::{ResultOutcome, StatusSnapshot};
use jobwatch_logging::jw_debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::envelope::{decode_result, decode_snapshot, decode_submit_reply, error_message};
use crate::{ClientError, SubmitReply, Tool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The three backend calls a job goes through.
#[async_trait::async_trait]
pub trait JobApi<T: Tool>: Send + Sync {
    async fn submit(&self, request: &T::Request) -> Result<SubmitReply<T::Output>, ClientError>;

    async fn poll(&self, poll_url: &str) -> Result<StatusSnapshot, ClientError>;

    async fn fetch_result(&self, result_url: &str)
        -> Result<ResultOutcome<T::Output>, ClientError>;
}

/// `JobApi` over HTTP; one instance serves every tool.
#[derive(Debug, Clone)]
pub struct HttpJobApi {
    client: reqwest::Client,
    base: Url,
}

impl HttpJobApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::ClientSetup(err.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves a path below the base URL (`/summarize` keeps any base prefix).
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::InvalidUrl(format!("{path}: {err}")))
    }

    /// Resolves a backend-issued URL, which may be absolute or host-relative.
    fn resolve(&self, url: &str) -> Result<Url, ClientError> {
        self.base
            .join(url)
            .map_err(|err| ClientError::InvalidUrl(format!("{url}: {err}")))
    }

    async fn read_success(&self, response: reqwest::Response) -> Result<Vec<u8>, ClientError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.map_reqwest_error(err))?;
        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body.to_vec())
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, ClientError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| self.map_reqwest_error(err))?;
        self.read_success(response).await
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            return ClientError::Timeout;
        }
        if err.is_builder() {
            return ClientError::InvalidUrl(err.to_string());
        }
        ClientError::Unreachable {
            base_url: self.base.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl<T: Tool> JobApi<T> for HttpJobApi {
    async fn submit(&self, request: &T::Request) -> Result<SubmitReply<T::Output>, ClientError> {
        let missing = T::missing_fields(request);
        if !missing.is_empty() {
            return Err(ClientError::MissingFields(missing));
        }

        let url = self.endpoint(T::SUBMIT_PATH)?;
        let body = serde_json::to_vec(request)
            .map_err(|err| ClientError::InvalidResponse(format!("request encoding: {err}")))?;
        jw_debug!("{} submit url={}", T::NAME, url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| self.map_reqwest_error(err))?;
        let body = self.read_success(response).await?;
        decode_submit_reply(&body, T::INLINE_RESULTS)
    }

    async fn poll(&self, poll_url: &str) -> Result<StatusSnapshot, ClientError> {
        let url = self.resolve(poll_url)?;
        let body = self.get(url).await?;
        decode_snapshot(&body)
    }

    async fn fetch_result(
        &self,
        result_url: &str,
    ) -> Result<ResultOutcome<T::Output>, ClientError> {
        let url = self.resolve(result_url)?;
        let body = self.get(url).await?;
        decode_result(&body)
    }
}
