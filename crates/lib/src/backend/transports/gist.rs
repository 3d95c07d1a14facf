//! GitHub-gist-shaped remote document transport.
//!
//! The store lives in one file of a gist. Loading is a `GET /gists/{id}` and
//! reading `files.<name>.content`; saving is a `PATCH` replacing that file's
//! content. Errors carry status codes only, never response bodies.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{
    Result,
    backend::{BackendConfig, DocumentTransport, PersistenceError},
};

/// Remote transport speaking the gist API.
pub struct GistTransport {
    client: reqwest::Client,
    api_base: reqwest::Url,
    url: String,
    file_name: String,
    timeout: Duration,
    token: Zeroizing<String>,
}

impl fmt::Debug for GistTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GistTransport")
            .field("url", &self.url)
            .field("file_name", &self.file_name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct GistEnvelope {
    #[serde(default)]
    files: HashMap<String, Option<GistFile>>,
}

#[derive(Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    raw_url: Option<String>,
}

#[derive(Serialize)]
struct GistUpdate<'a> {
    files: HashMap<&'a str, GistFileUpdate<'a>>,
}

#[derive(Serialize)]
struct GistFileUpdate<'a> {
    content: &'a str,
}

impl GistTransport {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("prefstore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PersistenceError::InvalidConfig {
                reason: e.without_url().to_string(),
            })?;
        let api_base =
            reqwest::Url::parse(&config.api_base).map_err(|e| PersistenceError::InvalidConfig {
                reason: format!("invalid api base: {e}"),
            })?;

        Ok(Self {
            client,
            api_base,
            url: format!("{}/gists/{}", config.api_base, config.document_id),
            file_name: config.file_name.clone(),
            timeout: config.timeout,
            token: Zeroizing::new(config.token().to_string()),
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(self.token.as_str())
        }
    }

    /// Send a request and turn anything but a success status into an error.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Document backend returned error status");
            return Err(PersistenceError::Status {
                status: status.as_u16(),
            }
            .into());
        }
        Ok(response)
    }

    fn map_send_error(&self, err: reqwest::Error) -> crate::Error {
        if err.is_timeout() {
            PersistenceError::Timeout {
                timeout: self.timeout,
            }
            .into()
        } else {
            PersistenceError::Transport {
                reason: err.without_url().to_string(),
            }
            .into()
        }
    }

    async fn read_text(&self, response: reqwest::Response) -> Result<String> {
        response.text().await.map_err(|e| self.map_send_error(e))
    }

    /// Whether `url` points at the configured API origin.
    fn is_api_origin(&self, url: &str) -> bool {
        reqwest::Url::parse(url).is_ok_and(|url| url.origin() == self.api_base.origin())
    }

    /// Large files come back truncated; their full text sits behind `raw_url`.
    ///
    /// The token is only sent when the raw URL shares the API origin.
    async fn fetch_raw(&self, raw_url: &str) -> Result<String> {
        let authenticated = self.is_api_origin(raw_url);
        tracing::debug!(authenticated, "Fetching full document content from raw URL");
        let request = if authenticated {
            self.request(reqwest::Method::GET, raw_url)
        } else {
            self.client.get(raw_url)
        };
        let response = self.send(request).await?;
        self.read_text(response).await
    }
}

#[async_trait]
impl DocumentTransport for GistTransport {
    fn name(&self) -> &'static str {
        "gist"
    }

    async fn fetch(&self) -> Result<Option<String>> {
        let response = self.send(self.request(reqwest::Method::GET, &self.url)).await?;
        let body = self.read_text(response).await?;
        let envelope: GistEnvelope =
            serde_json::from_str(&body).map_err(|e| PersistenceError::malformed(&e))?;

        let Some(Some(file)) = envelope.files.get(&self.file_name) else {
            return Ok(None);
        };
        match (&file.content, file.truncated, &file.raw_url) {
            (_, true, Some(raw_url)) => self.fetch_raw(raw_url).await.map(Some),
            (Some(content), _, _) => Ok(Some(content.clone())),
            (None, _, _) => Ok(None),
        }
    }

    async fn store(&self, contents: String) -> Result<()> {
        let update = GistUpdate {
            files: HashMap::from([(
                self.file_name.as_str(),
                GistFileUpdate { content: &contents },
            )]),
        };
        self.send(self.request(reqwest::Method::PATCH, &self.url).json(&update))
            .await?;
        Ok(())
    }
}
