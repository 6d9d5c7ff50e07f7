//! CLI helper functions

use crate::{
    client::{Auth, AuthType, ProjectClient},
    run::{RunRequest, RunResult, RunStatus, TestRunner, save_result},
    sync::{
        ImportReport, SyncContext, SyncOptions, export_test_directory, import_folder_contents,
    },
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use url::Url;

pub const URL_VAR: &str = "SCRIPTSYNC_URL";
pub const USER_VAR: &str = "SCRIPTSYNC_USER";
pub const PASS_VAR: &str = "SCRIPTSYNC_PASS";
pub const APIKEY_VAR: &str = "SCRIPTSYNC_APIKEY";

/// Connection settings resolved from the environment and the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url: Url,
    pub auth: Auth,
}

/// Credentials given on the command line, which win over the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub user: Option<String>,
    pub pass: Option<String>,
    pub auth_type: Option<AuthType>,
}

/// Source a dotenv file into the environment if it exists.
///
/// Variables already set in the environment are kept. Returns whether the
/// file was found.
pub fn load_dotenv(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }
    dotenvy::from_filename(path)
        .with_context(|| format!("Unable to load dotenv file {}", path.display()))?;
    Ok(true)
}

/// Load connection settings from environment variables
///
/// Expected environment variables:
/// - SCRIPTSYNC_URL: service base URL (required)
/// - SCRIPTSYNC_USER: login name (optional, overridden by --user)
/// - SCRIPTSYNC_PASS: password (optional, overridden by --pass)
/// - SCRIPTSYNC_APIKEY: API key (optional, used when no login is given)
pub fn load_settings(credentials: &Credentials) -> Result<Settings> {
    let url_str = std::env::var(URL_VAR)
        .with_context(|| format!("{} environment variable not set", URL_VAR))?;
    let url = Url::parse(&url_str).with_context(|| format!("Invalid {}: {}", URL_VAR, url_str))?;

    let user = credentials.user.clone().or_else(|| std::env::var(USER_VAR).ok());
    let pass = credentials.pass.clone().or_else(|| std::env::var(PASS_VAR).ok());
    let apikey = std::env::var(APIKEY_VAR).ok();

    let auth = match &credentials.auth_type {
        Some(auth_type) => Auth::new(auth_type, user, pass, apikey),
        None => Auth::detect(user, pass, apikey),
    };

    Ok(Settings { url, auth })
}

/// Build a client from the environment and log in if needed
pub async fn load_project_client(credentials: &Credentials) -> Result<ProjectClient> {
    let settings = load_settings(credentials)?;
    log::debug!(
        "Connecting to {} with {} auth",
        settings.url.as_str().bright_black(),
        settings.auth
    );
    ProjectClient::connect(settings.url, &settings.auth)
        .await
        .with_context(|| "Failed to create project client")
}

/// Resolve a user-supplied path, failing if nothing exists there
pub fn check_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Unable to resolve path {}", path.display()))?;
    if !absolute.exists() {
        eyre::bail!("This path does not exist! ({})", path.display());
    }
    Ok(absolute)
}

/// Make sure a folder can be listed and return its name
pub fn check_folder_contents(folder: impl AsRef<Path>) -> Result<String> {
    let folder = folder.as_ref();
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string());

    let mut entries = std::fs::read_dir(folder)
        .with_context(|| format!("An error occurred while reading from folder <{}>", name))?;
    if entries.next().is_none() {
        log::warn!("Folder <{}> is empty, nothing to import", name.cyan());
    }
    Ok(name)
}

/// Import a local folder into a project
pub async fn import_folder(
    credentials: &Credentials,
    project_id: &str,
    folder: impl AsRef<Path>,
    overwrite: bool,
) -> Result<ImportReport> {
    let folder = check_path(folder)?;
    let name = check_folder_contents(&folder)?;

    let client = load_project_client(credentials).await?;
    let context =
        SyncContext::new(client).with_options(SyncOptions::default().with_overwrite(overwrite));

    log::info!(
        "Importing folder <{}> into project {}",
        name.cyan(),
        project_id.cyan()
    );
    let report = import_folder_contents(&context, project_id, &folder).await?;
    log::info!("✓ Imported folder <{}>: {}", name.cyan(), report);

    Ok(report)
}

/// Create `<directory>/<folder>`, failing if it already exists
pub async fn make_export_folder(directory: impl AsRef<Path>, folder: &str) -> Result<PathBuf> {
    let target = directory.as_ref().join(folder);
    if target.exists() {
        eyre::bail!("This folder <{}> exists. Please use another directory.", folder);
    }
    tokio::fs::create_dir_all(&target)
        .await
        .with_context(|| format!("Unable to create directory {}", target.display()))?;
    Ok(target)
}

/// Export a project into a new folder under `directory`
pub async fn export_folder(
    credentials: &Credentials,
    project_id: &str,
    folder: &str,
    directory: impl AsRef<Path>,
) -> Result<usize> {
    let client = load_project_client(credentials).await?;
    let target = make_export_folder(directory, folder).await?;

    log::info!(
        "Exporting project {} to {}",
        project_id.cyan(),
        target.display().bright_black()
    );
    let context = SyncContext::new(client);
    let count = export_test_directory(&context, project_id, &target).await?;
    log::info!(
        "✓ Exported {} file(s) to {}",
        count,
        target.display().bright_black()
    );

    Ok(count)
}

/// Run a test script and wait for its result
pub async fn run_test(
    credentials: &Credentials,
    request: &RunRequest,
    save: Option<&Path>,
) -> Result<RunResult> {
    let client = load_project_client(credentials).await?;
    let result = TestRunner::new(client).run(request).await?;

    if let Some(directory) = save {
        let path = save_result(directory, &result).await?;
        log::info!("Saved test log to {}", path.display().bright_black());
    }

    match result.status {
        RunStatus::Success => log::info!("✓ Test {} passed", request.script_path.cyan()),
        status => eyre::bail!(
            "Test {} finished with status {}",
            request.script_path,
            status
        ),
    }

    Ok(result)
}
