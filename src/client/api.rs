//! Project file API seam
//!
//! [`ProjectApi`] is the set of remote calls the sync engines rely on.
//! [`ProjectClient`](super::ProjectClient) implements it over HTTP; tests
//! implement it in memory.

use super::RemoteNode;
use eyre::{Result, eyre};
use serde::Deserialize;
use std::future::Future;

/// Error code the service returns when a file is already present and the
/// request did not ask to overwrite it.
pub const FILE_ALREADY_EXISTS: &str = "FILE_ALREADY_EXISTS";

/// Placeholder content uploaded for empty script files.
pub const EMPTY_FILE_PLACEHOLDER: &str = "//an empty file";

/// Remote calls needed to import and export project files.
///
/// Every future is `Send` so the engines can spawn one task per file.
pub trait ProjectApi: Send + Sync {
    /// Flat listing of every node in the project
    fn list_files(&self, project_id: &str)
    -> impl Future<Output = Result<Vec<RemoteNode>>> + Send;

    /// Content of a single remote file
    fn get_file(&self, project_id: &str, path: &str) -> impl Future<Output = Result<String>> + Send;

    /// Store text content as a JSON body
    fn put_file(
        &self,
        project_id: &str,
        path: &str,
        content: &str,
        overwrite: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Store raw bytes through the multipart upload endpoint
    fn upload_raw_file(
        &self,
        project_id: &str,
        path: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Error reported by the service inside the `ERROR` member of a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct RemoteError {
    pub code: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn already_exists(path: &str) -> Self {
        Self::new(FILE_ALREADY_EXISTS, format!("File already exists: {}", path))
    }

    pub fn is_already_exists(&self) -> bool {
        self.code == FILE_ALREADY_EXISTS
    }
}

/// Check whether a report carries a `FILE_ALREADY_EXISTS` remote error
/// anywhere in its chain.
pub fn is_already_exists(report: &eyre::Report) -> bool {
    report.chain().any(|cause| {
        cause
            .downcast_ref::<RemoteError>()
            .is_some_and(RemoteError::is_already_exists)
    })
}

/// Wire literal for the overwrite flag.
///
/// Both upload endpoints receive the same literal for the same boolean.
pub fn overwrite_flag(overwrite: bool) -> &'static str {
    if overwrite { "True" } else { "false" }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Response envelope: `{"result": ...}` or `{"ERROR": {"code": ...}}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    result: Option<T>,
    #[serde(rename = "ERROR")]
    error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(RemoteError::new(error.code, error.message).into());
        }
        self.result
            .ok_or_else(|| eyre!("Response has neither a result nor an ERROR member"))
    }

    /// Succeed unless the service reported an `ERROR`; `result` may be
    /// missing or null.
    pub fn into_ack(self) -> Result<()> {
        match self.error {
            Some(error) => Err(RemoteError::new(error.code, error.message).into()),
            None => Ok(()),
        }
    }
}
