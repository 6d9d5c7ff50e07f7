//! Writing exported files to disk

use super::paths::{is_script_file, split_remote_path, validate_remote_folder};
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the folder and file name a remote path lands on below `directory`.
///
/// A single trailing separator on `directory` is ignored, and the folder part
/// of `remote_path` becomes nested folders under it.
pub fn resolve_export_target(directory: &Path, remote_path: &str) -> Result<(PathBuf, String)> {
    let directory = strip_trailing_separator(directory);
    let (folder, file_name) = split_remote_path(remote_path);

    let target_dir = match folder {
        Some(folder) => {
            let folder = folder.trim_start_matches('/');
            validate_remote_folder(folder)?;
            directory.join(folder)
        }
        None => directory,
    };

    if file_name.is_empty() || file_name == "." || file_name == ".." {
        eyre::bail!("Remote path has no file name: {}", remote_path);
    }

    Ok((target_dir, file_name.to_string()))
}

fn strip_trailing_separator(directory: &Path) -> PathBuf {
    let raw = directory.to_string_lossy();
    match raw.strip_suffix(std::path::MAIN_SEPARATOR).or(raw.strip_suffix('/')) {
        Some(stripped) if !stripped.is_empty() => PathBuf::from(stripped),
        _ => directory.to_path_buf(),
    }
}

/// Bytes written for a non-script file.
///
/// Content that fits in single bytes per char is written one byte per char,
/// anything else falls back to its UTF-8 encoding.
pub fn binary_content(content: &str) -> Vec<u8> {
    if content.chars().all(|c| u32::from(c) <= 0xFF) {
        content.chars().map(|c| u32::from(c) as u8).collect()
    } else {
        content.as_bytes().to_vec()
    }
}

/// Write one exported file below `directory`, creating folders as needed.
///
/// Returns a confirmation line naming the file and the folder it landed in.
///
/// # Example
/// ```no_run
/// use scriptsync::storage::export_test_file;
///
/// # async fn example() -> eyre::Result<()> {
/// let message = export_test_file("/out/", "sub/dir/file.js", "I.goTo('/')").await?;
/// assert_eq!(message, "File <file.js> successfully saved in /out/sub/dir");
/// # Ok(())
/// # }
/// ```
pub async fn export_test_file(
    directory: impl AsRef<Path>,
    remote_path: &str,
    content: &str,
) -> Result<String> {
    let (target_dir, file_name) = resolve_export_target(directory.as_ref(), remote_path)?;

    tokio::fs::create_dir_all(&target_dir)
        .await
        .with_context(|| format!("Unable to create directory {}", target_dir.display()))?;

    let file_path = target_dir.join(&file_name);
    let bytes = if is_script_file(&file_name) {
        content.as_bytes().to_vec()
    } else {
        binary_content(content)
    };

    tokio::fs::write(&file_path, bytes)
        .await
        .with_context(|| format!("Unable to save file {}", file_path.display()))?;

    Ok(format!(
        "File <{}> successfully saved in {}",
        file_name,
        target_dir.display()
    ))
}
