//! Project service client
//!
//! Provides `ProjectClient` for making API requests to the remote testing
//! service. One client holds one cookie session, shared by every clone.

use super::api::{Envelope, ProjectApi, overwrite_flag};
use super::{Auth, RemoteNode};
use crate::storage::{base_name, media_mime};
use eyre::{Context, Result, eyre};
use owo_colors::OwoColorize;
use reqwest::{Client, Method, StatusCode, multipart};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};
use url::Url;

/// HTTP client for the project file and test-run endpoints.
///
/// Cloning is cheap; clones share the connection pool and the session
/// cookie established by [`ProjectClient::login`].
///
/// # Example
/// ```no_run
/// use scriptsync::client::{Auth, ProjectClient, ProjectApi};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://api.example.com/v3.0/")?;
/// let auth = Auth::Login("alice".to_string(), "secret".to_string());
/// let client = ProjectClient::connect(url, &auth).await?;
///
/// let files = client.list_files("project-123").await?;
/// println!("{} nodes", files.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ProjectClient {
    client: Client,
    url: Url,
}

enum Payload<'a> {
    Empty,
    Json(&'a Value),
    Form(multipart::Form),
}

impl ProjectClient {
    /// Create a new client from a base URL and authentication method.
    ///
    /// API keys are attached as a default header. Login credentials are not
    /// used here; call [`ProjectClient::login`] or use
    /// [`ProjectClient::connect`].
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn try_new(mut url: Url, auth: &Auth) -> Result<Self> {
        // Url::join drops the last segment of a base without a trailing slash
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, "application/json".parse()?);
        if let Auth::Apikey(apikey) = auth {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("ApiKey {}", apikey).parse()?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self { client, url })
    }

    /// Create a client and establish the session for `Auth::Login`.
    pub async fn connect(url: Url, auth: &Auth) -> Result<Self> {
        let client = Self::try_new(url, auth)?;
        if let Auth::Login(username, password) = auth {
            client.login(username, password).await?;
        }
        Ok(client)
    }

    /// Log in and keep the session cookie for every following request.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        log::debug!("Logging in as {}", username.cyan());
        let body = json!({"loginName": username, "password": password});
        let response = self
            .request(Method::POST, "/account/login", &[], Payload::Json(&body))
            .await?;
        Self::read_ack(response)
            .await
            .with_context(|| format!("Failed to log in as {}", username))
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Payload<'_>,
    ) -> Result<reqwest::Response> {
        // Strip leading slash from path so it stays relative to the base
        let path_stripped = path.strip_prefix('/').unwrap_or(path);
        let url = self
            .url
            .join(path_stripped)
            .with_context(|| format!("Invalid API path: {}", path))?;

        log::trace!("{} {}", method.as_str().green(), url.path());

        let mut builder = self.client.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let builder = match payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(value),
            Payload::Form(form) => builder.multipart(form),
        };

        builder
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request: {}", e))
    }

    /// Unwrap the `result` member of a response, or turn its `ERROR`
    /// member into a [`RemoteError`](super::RemoteError).
    async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| "Failed to read response body")?;
        parse_envelope(status, &body)
    }

    /// Like [`Self::read_envelope`], for calls whose `result` carries nothing.
    async fn read_ack(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| "Failed to read response body")?;
        parse_ack(status, &body)
    }

    /// Helper for GET requests returning an enveloped result.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .request(Method::GET, path, query, Payload::Empty)
            .await?;
        Self::read_envelope(response).await
    }

    /// Helper for POST requests with a JSON body.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self
            .request(Method::POST, path, &[], Payload::Json(body))
            .await?;
        Self::read_envelope(response).await
    }
}

impl ProjectApi for ProjectClient {
    async fn list_files(&self, project_id: &str) -> Result<Vec<RemoteNode>> {
        self.get_json(
            "/project/file/query",
            &[("projectID", project_id), ("type", "list")],
        )
        .await
        .with_context(|| format!("Failed to list files of project {}", project_id))
    }

    async fn get_file(&self, project_id: &str, path: &str) -> Result<String> {
        self.get_json(
            "/project/file",
            &[("projectID", project_id), ("filePath", path)],
        )
        .await
        .with_context(|| format!("Failed to download {}", path))
    }

    async fn put_file(
        &self,
        project_id: &str,
        path: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<()> {
        let body = json!({
            "projectID": project_id,
            "filePath": path,
            "content": content,
            "overwrite": overwrite_flag(overwrite),
        });
        let response = self
            .request(Method::PUT, "/project/file", &[], Payload::Json(&body))
            .await?;
        Self::read_ack(response)
            .await
            .with_context(|| format!("Failed to upload {}", path))
    }

    async fn upload_raw_file(
        &self,
        project_id: &str,
        path: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<()> {
        let part = multipart::Part::bytes(content)
            .file_name(base_name(path).to_string())
            .mime_str(media_mime(path))?;
        let form = multipart::Form::new()
            .text("projectID", project_id.to_string())
            .text("filePath", path.to_string())
            .text("overwrite", overwrite_flag(overwrite))
            .part("content", part);

        let response = self
            .request(Method::POST, "/project/file/put", &[], Payload::Form(form))
            .await?;
        Self::read_ack(response)
            .await
            .with_context(|| format!("Failed to upload {}", path))
    }
}

fn parse_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(envelope) => envelope.into_result(),
        Err(_) if !status.is_success() => eyre::bail!("Request failed ({}): {}", status, body),
        Err(e) => Err(e).with_context(|| format!("Failed to parse response: {}", body)),
    }
}

// Only an ERROR member or a failed status rejects an acknowledgement
fn parse_ack(status: StatusCode, body: &str) -> Result<()> {
    match serde_json::from_str::<Envelope<IgnoredAny>>(body) {
        Ok(envelope) => envelope.into_ack(),
        Err(_) if !status.is_success() => eyre::bail!("Request failed ({}): {}", status, body),
        Err(_) if body.trim().is_empty() => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to parse response: {}", body)),
    }
}

impl std::fmt::Display for ProjectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
