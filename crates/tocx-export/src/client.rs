//! Jupyter server REST client.
//!
//! Provides the remote collaborators of an export:
//! - `GET {base}/nbconvert/html/{path}?download=false` renders a notebook
//! - `GET {base}/{stylesheet_path}` fetches the ToC stylesheet (see
//!   [`StylesheetSource`] for the local alternatives)
//! - `PUT {base}/api/contents/{path}` stores notebook edits
//!
//! Requests use a blocking [`ureq::Agent`] and run on tokio's blocking pool,
//! so the export task suspends while a request is in flight.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::collaborators::RenderService;
use crate::error::{ExportError, Resource};
use crate::stylesheet::{self, BUNDLED_STYLESHEET, StylesheetSource};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Upper bound on response bodies (rendered notebooks embed their images).
const MAX_BODY_SIZE: u64 = 256 * 1024 * 1024;

/// Characters kept verbatim in path segments (same set as `encodeURIComponent`).
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Jupyter server REST client.
#[derive(Clone)]
pub struct JupyterClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
    stylesheet: StylesheetSource,
}

impl JupyterClient {
    /// Create a client for the server at `base_url`.
    ///
    /// The stylesheet is fetched from the default server route until
    /// [`with_stylesheet`](Self::with_stylesheet) picks another source.
    pub fn new(base_url: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: None,
            stylesheet: StylesheetSource::default(),
        }
    }

    /// Choose where the ToC stylesheet comes from.
    #[must_use]
    pub fn with_stylesheet(mut self, source: StylesheetSource) -> Self {
        self.stylesheet = source;
        self
    }

    /// Authenticate requests with an API token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        self
    }

    /// URL rendering `path` to HTML without a download disposition.
    pub fn nbconvert_url(&self, path: &str) -> String {
        format!(
            "{}/nbconvert/html/{}?download=false",
            self.base_url,
            encode_path(path)
        )
    }

    /// URL of the ToC stylesheet, if it is fetched from the server.
    pub fn stylesheet_url(&self) -> Option<String> {
        match &self.stylesheet {
            StylesheetSource::Server(path) => Some(format!("{}/{}", self.base_url, path)),
            StylesheetSource::File(_) | StylesheetSource::Bundled => None,
        }
    }

    /// Contents API URL for `path`.
    pub fn contents_url(&self, path: &str) -> String {
        format!("{}/api/contents/{}", self.base_url, encode_path(path))
    }

    /// Store notebook JSON at `path` through the contents API.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Transport`] or [`ExportError::Response`].
    pub async fn save_notebook(
        &self,
        path: &str,
        notebook: serde_json::Value,
    ) -> Result<(), ExportError> {
        let client = self.clone();
        let url = self.contents_url(path);
        info!("Saving {} before export", path);
        run_blocking(Resource::Contents, move || {
            client.put_notebook_blocking(&url, &notebook)
        })
        .await
    }

    /// GET `url` and return the body text.
    pub(crate) fn get_text_blocking(
        &self,
        url: &str,
        resource: Resource,
    ) -> Result<String, ExportError> {
        debug!("GET {}", url);

        let mut request = self.agent.get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("token {token}"));
        }
        let response = request.call().map_err(|e| transport(resource, &e))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();
        let text = body
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_string()
            .map_err(|e| transport(resource, &e))?;

        if status >= 400 {
            return Err(ExportError::response(resource, status, &text));
        }

        info!("Fetched {} ({} bytes)", resource, text.len());
        Ok(text)
    }

    /// PUT notebook JSON to the contents API.
    pub(crate) fn put_notebook_blocking(
        &self,
        url: &str,
        notebook: &serde_json::Value,
    ) -> Result<(), ExportError> {
        debug!("PUT {}", url);

        let payload = serde_json::json!({
            "type": "notebook",
            "format": "json",
            "content": notebook,
        });

        let mut request = self.agent.put(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("token {token}"));
        }
        let response = request
            .send_json(&payload)
            .map_err(|e| transport(Resource::Contents, &e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ExportError::response(
                Resource::Contents,
                status,
                &error_body,
            ));
        }

        Ok(())
    }
}

impl RenderService for JupyterClient {
    async fn render_html(&self, path: &str) -> Result<String, ExportError> {
        let client = self.clone();
        let url = self.nbconvert_url(path);
        run_blocking(Resource::Document, move || {
            client.get_text_blocking(&url, Resource::Document)
        })
        .await
    }

    async fn stylesheet(&self) -> Result<String, ExportError> {
        match &self.stylesheet {
            StylesheetSource::Server(path) => {
                let client = self.clone();
                let url = format!("{}/{}", self.base_url, path);
                let fetched = run_blocking(Resource::Stylesheet, move || {
                    client.get_text_blocking(&url, Resource::Stylesheet)
                })
                .await;
                match fetched {
                    Err(ExportError::Response { status: 404, .. }) => {
                        warn!(path = %path, "Server has no ToC stylesheet, falling back to the bundled one");
                        Ok(BUNDLED_STYLESHEET.to_owned())
                    }
                    other => other,
                }
            }
            StylesheetSource::File(path) => {
                let path = path.clone();
                run_blocking(Resource::Stylesheet, move || stylesheet::read_file(&path)).await
            }
            StylesheetSource::Bundled => Ok(BUNDLED_STYLESHEET.to_owned()),
        }
    }
}

/// Run a blocking request on tokio's blocking pool.
async fn run_blocking<T, F>(resource: Resource, request: F) -> Result<T, ExportError>
where
    F: FnOnce() -> Result<T, ExportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(request)
        .await
        .map_err(|e| ExportError::Transport {
            resource,
            message: format!("request task failed: {e}"),
        })?
}

fn transport(resource: Resource, error: &ureq::Error) -> ExportError {
    ExportError::Transport {
        resource,
        message: error.to_string(),
    }
}

/// Percent-encode each segment of a document path, keeping separators.
fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
