//! In-memory project service shared by the integration tests

#![allow(dead_code)]

use eyre::{Result, eyre};
use scriptsync::client::{ProjectApi, RemoteError, RemoteNode};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

/// A call the engines made against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Put { path: String, overwrite: bool },
    Raw { path: String, overwrite: bool },
    Get { path: String },
    List,
}

/// Project service that stores files in memory and records every call.
///
/// Uploads without overwrite of an existing path fail with
/// `FILE_ALREADY_EXISTS`, like the real service.
#[derive(Default)]
pub struct MockProject {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    listing: Mutex<Vec<RemoteNode>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<String, RemoteError>>,
    upload_delay: Option<Duration>,
}

impl MockProject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay successful uploads so failures resolve first
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = Some(delay);
        self
    }

    pub fn with_file(self, path: &str, content: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_vec());
        self
    }

    pub fn with_listing(self, nodes: Vec<RemoteNode>) -> Self {
        *self.listing.lock().unwrap() = nodes;
        self
    }

    /// Make every upload and download of `path` fail with `code`
    pub fn fail_on(self, path: &str, code: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(path.to_string(), RemoteError::new(code, "injected failure"));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(&self, path: &str) -> Option<RemoteError> {
        self.failures.lock().unwrap().get(path).cloned()
    }

    async fn store(&self, path: &str, content: Vec<u8>, overwrite: bool) -> Result<()> {
        if let Some(error) = self.injected(path) {
            return Err(error.into());
        }
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }

        let mut files = self.files.lock().unwrap();
        if files.contains_key(path) && !overwrite {
            return Err(RemoteError::already_exists(path).into());
        }
        files.insert(path.to_string(), content);
        Ok(())
    }
}

impl ProjectApi for MockProject {
    async fn list_files(&self, _project_id: &str) -> Result<Vec<RemoteNode>> {
        self.record(Call::List);
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn get_file(&self, _project_id: &str, path: &str) -> Result<String> {
        self.record(Call::Get {
            path: path.to_string(),
        });
        if let Some(error) = self.injected(path) {
            return Err(error.into());
        }
        self.file(path)
            .map(|bytes| bytes.iter().map(|&b| char::from(b)).collect())
            .ok_or_else(|| eyre!("FILE_NOT_FOUND: {}", path))
    }

    async fn put_file(
        &self,
        _project_id: &str,
        path: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<()> {
        self.record(Call::Put {
            path: path.to_string(),
            overwrite,
        });
        self.store(path, content.as_bytes().to_vec(), overwrite)
            .await
    }

    async fn upload_raw_file(
        &self,
        _project_id: &str,
        path: &str,
        content: Vec<u8>,
        overwrite: bool,
    ) -> Result<()> {
        self.record(Call::Raw {
            path: path.to_string(),
            overwrite,
        });
        self.store(path, content, overwrite).await
    }
}
