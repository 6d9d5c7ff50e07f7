//! Folder import: local tree to remote project
//!
//! FolderReader -> UploadPlanner -> ProjectUploader

use super::context::{ErrorPolicy, FileClass, SyncContext};
use super::join::spawn_all;
use crate::client::{EMPTY_FILE_PLACEHOLDER, ProjectApi, is_already_exists};
use crate::etl::{Loader, Pipeline, Transformer};
use crate::storage::{FolderReader, LocalFile, is_media_file};
use async_trait::async_trait;
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// One upload of one local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub project_id: String,
    pub local_path: PathBuf,
    pub remote_path: String,
    pub overwrite: bool,
    pub class: FileClass,
}

/// How a single upload ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// The file was already in the project
    Skipped,
    /// The service rejected it and the best-effort policy let it go
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportReport {
    pub fn processed(&self) -> usize {
        self.uploaded + self.skipped + self.failed
    }

    fn merge(&mut self, other: &ImportReport) {
        self.uploaded += other.uploaded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    fn record(&mut self, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Uploaded => self.uploaded += 1,
            UploadOutcome::Skipped => self.skipped += 1,
            UploadOutcome::Failed => self.failed += 1,
        }
    }
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} uploaded, {} skipped, {} failed",
            self.uploaded, self.skipped, self.failed
        )
    }
}

/// Turns walked files into upload tasks, picking the upload route by name.
pub struct UploadPlanner {
    project_id: String,
    overwrite: bool,
}

impl UploadPlanner {
    pub fn new(project_id: impl Into<String>, overwrite: bool) -> Self {
        Self {
            project_id: project_id.into(),
            overwrite,
        }
    }
}

impl Transformer for UploadPlanner {
    type Input = LocalFile;
    type Output = UploadTask;

    fn transform(&self, file: Self::Input) -> Result<Self::Output> {
        let class = if is_media_file(file.name()) {
            FileClass::Media
        } else {
            FileClass::Text
        };

        Ok(UploadTask {
            project_id: self.project_id.clone(),
            local_path: file.path,
            remote_path: file.remote_path,
            overwrite: self.overwrite,
            class,
        })
    }
}

/// Uploads every task concurrently and fails on the first hard error.
///
/// Outcomes of every successful load are added to [`ProjectUploader::report`].
pub struct ProjectUploader<C> {
    context: SyncContext<C>,
    report: Mutex<ImportReport>,
}

impl<C: ProjectApi + 'static> ProjectUploader<C> {
    pub fn new(context: SyncContext<C>) -> Self {
        Self {
            context,
            report: Mutex::new(ImportReport::default()),
        }
    }

    /// Totals of every load so far
    pub fn report(&self) -> ImportReport {
        *self.report.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn upload_all(&self, tasks: Vec<UploadTask>) -> Result<ImportReport> {
        let outcomes = spawn_all(
            tasks
                .into_iter()
                .map(|task| upload_task(self.context.clone(), task)),
        )
        .await?;

        let mut report = ImportReport::default();
        for outcome in outcomes {
            report.record(outcome);
        }
        Ok(report)
    }
}

#[async_trait]
impl<C: ProjectApi + 'static> Loader for ProjectUploader<C> {
    type Item = UploadTask;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let report = self.upload_all(items).await?;
        self.report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(&report);
        Ok(report.processed())
    }
}

/// Read a text file for upload. Empty files get a placeholder body.
async fn read_text(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Unable to read file {}", path.display()))?;

    if bytes.is_empty() {
        return Ok(EMPTY_FILE_PLACEHOLDER.to_string());
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Run one upload.
///
/// Local read failures always fail the task. Remote `FILE_ALREADY_EXISTS`
/// is a skip; other remote failures follow the policy of the file class.
pub async fn upload_task<C: ProjectApi>(
    context: SyncContext<C>,
    task: UploadTask,
) -> Result<UploadOutcome> {
    let client = context.client();
    let result = match task.class {
        FileClass::Text => {
            let content = read_text(&task.local_path).await?;
            client
                .put_file(&task.project_id, &task.remote_path, &content, task.overwrite)
                .await
        }
        FileClass::Media => {
            let content = tokio::fs::read(&task.local_path)
                .await
                .with_context(|| format!("Unable to read file {}", task.local_path.display()))?;
            client
                .upload_raw_file(&task.project_id, &task.remote_path, content, task.overwrite)
                .await
        }
    };

    match result {
        Ok(()) => {
            if task.overwrite {
                log::debug!(
                    "Uploading test script ({}) with overwrite mode enabled",
                    task.remote_path.cyan()
                );
            } else {
                log::debug!("Uploading test script ({})", task.remote_path.cyan());
            }
            Ok(UploadOutcome::Uploaded)
        }
        Err(e) if is_already_exists(&e) => {
            log::info!(
                "Existing file found, skipping {}",
                task.remote_path.bright_black()
            );
            Ok(UploadOutcome::Skipped)
        }
        Err(e) => match context.options().policy_for(task.class) {
            ErrorPolicy::Strict => Err(e.wrap_err(format!(
                "An error occurred while uploading the test script {}",
                task.remote_path
            ))),
            ErrorPolicy::BestEffort => {
                log::warn!("Unable to upload {}: {:#}", task.remote_path.yellow(), e);
                Ok(UploadOutcome::Failed)
            }
        },
    }
}

/// Import every visible file below `folder_path` into a project.
///
/// Direct children keep their name as remote path; files in subfolders
/// keep their path relative to `folder_path`. All uploads run concurrently
/// and the first hard failure is returned, while uploads already issued run
/// to completion.
///
/// # Example
/// ```no_run
/// use scriptsync::client::{Auth, ProjectClient};
/// use scriptsync::sync::{SyncContext, SyncOptions, import_folder_contents};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://api.example.com/v3.0/")?;
/// let client = ProjectClient::connect(url, &Auth::None).await?;
/// let context = SyncContext::new(client).with_options(SyncOptions::default().with_overwrite(true));
///
/// let report = import_folder_contents(&context, "project-123", "./tests").await?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub async fn import_folder_contents<C: ProjectApi + 'static>(
    context: &SyncContext<C>,
    project_id: &str,
    folder_path: impl AsRef<Path>,
) -> Result<ImportReport> {
    let folder_path = folder_path.as_ref();
    let overwrite = context.options().overwrite;

    let pipeline = Pipeline::new(
        FolderReader::new(folder_path),
        UploadPlanner::new(project_id, overwrite),
        ProjectUploader::new(context.clone()),
    )
    .with_label("import");

    let processed = pipeline.run().await?;
    log::debug!(
        "Processed {} file(s) from {}",
        processed,
        folder_path.display().bright_black()
    );

    Ok(pipeline.loader().report())
}
