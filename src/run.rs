//! Test run dispatch
//!
//! Starts a test script on the remote service, polls until it reaches a
//! terminal status, and optionally keeps the result on disk.

use crate::client::ProjectClient;
use crate::storage::validate_file_name;
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Parameters of one test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub project_id: String,
    pub script_path: String,
    pub browser: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl RunRequest {
    pub fn new(project_id: impl Into<String>, script_path: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            script_path: script_path.into(),
            browser: None,
            width: None,
            height: None,
        }
    }

    pub fn with_browser(mut self, browser: Option<String>) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// JSON body of the start request; unset options are left out
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "projectID": self.project_id,
            "scriptPath": self.script_path,
        });
        if let Some(browser) = &self.browser {
            body["browser"] = json!(browser);
        }
        if let Some(width) = self.width {
            body["width"] = json!(width);
        }
        if let Some(height) = self.height {
            body["height"] = json!(height);
        }
        body
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RunHandle {
    #[serde(rename = "runID")]
    run_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Failure,
    Error,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Error)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", status)
    }
}

/// Result of a run as reported by the service.
///
/// Everything besides the id and status is kept verbatim in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(rename = "runID", default)]
    pub run_id: String,
    pub status: RunStatus,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Remote calls needed to start a test and read its result.
pub trait RunApi: Send + Sync {
    /// Start a run and return its id
    fn start_run(&self, request: &RunRequest) -> impl Future<Output = Result<String>> + Send;

    /// Current state of a run
    fn run_result(
        &self,
        project_id: &str,
        run_id: &str,
    ) -> impl Future<Output = Result<RunResult>> + Send;
}

impl RunApi for ProjectClient {
    async fn start_run(&self, request: &RunRequest) -> Result<String> {
        let handle: RunHandle = self
            .post_json("/project/runTest", &request.to_body())
            .await
            .with_context(|| format!("Failed to start test {}", request.script_path))?;
        Ok(handle.run_id)
    }

    async fn run_result(&self, project_id: &str, run_id: &str) -> Result<RunResult> {
        self.get_json(
            "/project/getResult",
            &[("projectID", project_id), ("runID", run_id)],
        )
        .await
        .with_context(|| format!("Failed to get result of run {}", run_id))
    }
}

/// Starts runs and waits for them to finish.
pub struct TestRunner<C> {
    client: C,
    poll_interval: Duration,
}

impl<C: RunApi> TestRunner<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start a run and return its id.
    pub async fn start(&self, request: &RunRequest) -> Result<String> {
        self.client.start_run(request).await
    }

    /// Current result of a run. A missing id in the reply is filled in.
    pub async fn result(&self, project_id: &str, run_id: &str) -> Result<RunResult> {
        let mut result = self.client.run_result(project_id, run_id).await?;
        if result.run_id.is_empty() {
            result.run_id = run_id.to_string();
        }
        Ok(result)
    }

    /// Start a run and poll until it reaches a terminal status.
    pub async fn run(&self, request: &RunRequest) -> Result<RunResult> {
        let run_id = self.start(request).await?;
        log::info!(
            "Started test {} (run {})",
            request.script_path.cyan(),
            run_id.bright_black()
        );

        loop {
            tokio::time::sleep(self.poll_interval).await;
            let result = self.result(&request.project_id, &run_id).await?;
            log::debug!("Run {} is {}", run_id.bright_black(), result.status);
            if result.status.is_terminal() {
                return Ok(result);
            }
        }
    }
}

/// Save a run result as `<directory>/<runID>.json`.
///
/// The run id must be a plain file name.
pub async fn save_result(directory: impl AsRef<Path>, result: &RunResult) -> Result<PathBuf> {
    let directory = directory.as_ref();
    validate_file_name(&result.run_id)
        .with_context(|| format!("Refusing to save test log for run {:?}", result.run_id))?;

    tokio::fs::create_dir_all(directory)
        .await
        .with_context(|| format!("Unable to create directory {}", directory.display()))?;

    let path = directory.join(format!("{}.json", result.run_id));
    let json = serde_json::to_string_pretty(result)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Unable to save test log {}", path.display()))?;
    Ok(path)
}
