//! Tree export: remote project to local folder

use super::context::SyncContext;
use super::join::spawn_all;
use crate::client::{NodeType, ProjectApi, RemoteNode};
use crate::etl::{Extractor, IdentityTransformer, Loader, Pipeline};
use crate::storage::{export_test_file, validate_file_name};
use async_trait::async_trait;
use eyre::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// One download of one remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub project_id: String,
    pub remote_path: String,
    pub destination: PathBuf,
}

/// Lists the project and plans a download for every file node.
pub struct ProjectListing<C> {
    context: SyncContext<C>,
    project_id: String,
    destination: PathBuf,
}

impl<C: ProjectApi> ProjectListing<C> {
    pub fn new(
        context: SyncContext<C>,
        project_id: impl Into<String>,
        destination: impl AsRef<Path>,
    ) -> Self {
        Self {
            context,
            project_id: project_id.into(),
            destination: destination.as_ref().to_path_buf(),
        }
    }
}

impl<C: ProjectApi> Extractor for ProjectListing<C> {
    type Item = DownloadTask;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let nodes = self.context.client().list_files(&self.project_id).await?;
        log::debug!(
            "Project {} lists {} node(s)",
            self.project_id.cyan(),
            nodes.len()
        );

        Ok(nodes
            .into_iter()
            .filter(RemoteNode::is_file)
            .map(|node| DownloadTask {
                project_id: self.project_id.clone(),
                remote_path: node.path,
                destination: self.destination.clone(),
            })
            .collect())
    }
}

/// Downloads every task concurrently and fails on the first error.
pub struct FileDownloader<C> {
    context: SyncContext<C>,
}

impl<C: ProjectApi + 'static> FileDownloader<C> {
    pub fn new(context: SyncContext<C>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl<C: ProjectApi + 'static> Loader for FileDownloader<C> {
    type Item = DownloadTask;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let saved = spawn_all(
            items
                .into_iter()
                .map(|task| download_task(self.context.clone(), task)),
        )
        .await?;
        Ok(saved.len())
    }
}

/// Fetch one file and write it below the task's destination.
pub async fn download_task<C: ProjectApi>(
    context: SyncContext<C>,
    task: DownloadTask,
) -> Result<String> {
    log::debug!("Downloading test script ({})", task.remote_path.cyan());

    let content = context
        .client()
        .get_file(&task.project_id, &task.remote_path)
        .await?;
    let message = export_test_file(&task.destination, &task.remote_path, &content)
        .await
        .with_context(|| "An error occurred while saving the file to local directory")?;

    log::debug!("{}", message);
    Ok(message)
}

/// Export every file of a project into `directory`, mirroring remote folders.
///
/// Returns the number of files written.
pub async fn export_test_directory<C: ProjectApi + 'static>(
    context: &SyncContext<C>,
    project_id: &str,
    directory: impl AsRef<Path>,
) -> Result<usize> {
    let directory = directory.as_ref();

    let count = Pipeline::new(
        ProjectListing::new(context.clone(), project_id, directory),
        IdentityTransformer::<DownloadTask>::new(),
        FileDownloader::new(context.clone()),
    )
    .with_label("export")
    .run()
    .await?;

    log::debug!(
        "Saved {} test script(s) to {}",
        count,
        directory.display().bright_black()
    );
    Ok(count)
}

/// Export a hierarchical remote tree below `local_dir`.
///
/// A folder node becomes `local_dir/<folder name>` and its children are
/// exported into it concurrently; a file node is written into `local_dir`
/// under its base name. Names that are not a single path segment are
/// rejected before anything is written. Resolves once the whole subtree is written and
/// returns the number of files written.
pub fn export_directory_node_to_directory_path<C: ProjectApi + 'static>(
    context: SyncContext<C>,
    project_id: String,
    node: RemoteNode,
    local_dir: PathBuf,
) -> BoxFuture<'static, Result<usize>> {
    async move {
        match node.node_type {
            NodeType::Folder => {
                let name = node.base_name();
                validate_file_name(name)
                    .with_context(|| format!("Refusing to export folder {}", node.path))?;
                let folder = local_dir.join(name);
                tokio::fs::create_dir_all(&folder)
                    .await
                    .with_context(|| format!("Unable to create folder {}", folder.display()))?;
                log::debug!("Creating folder if it does not exist at <{}>", folder.display());

                let written = spawn_all(node.children.into_iter().map(|child| {
                    export_directory_node_to_directory_path(
                        context.clone(),
                        project_id.clone(),
                        child,
                        folder.clone(),
                    )
                }))
                .await?;
                Ok(written.into_iter().sum())
            }
            NodeType::File => {
                let name = node.base_name();
                validate_file_name(name)
                    .with_context(|| format!("Refusing to export file {}", node.path))?;

                log::debug!("Downloading test script ({})", node.path.cyan());
                let content = context.client().get_file(&project_id, &node.path).await?;
                let message = export_test_file(&local_dir, name, &content).await?;
                log::debug!("{}", message);
                Ok(1)
            }
            NodeType::Other => {
                log::debug!("Ignoring remote node {}", node.path.bright_black());
                Ok(0)
            }
        }
    }
    .boxed()
}
