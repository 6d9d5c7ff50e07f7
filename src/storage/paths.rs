//! Path and file name classification

use eyre::{Result, eyre};
use regex::Regex;
use std::path::{Component, Path};
use std::sync::LazyLock;

/// A segment that starts with a dot followed by anything but a dot or slash.
static HIDDEN_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/)\.[^/.]").expect("hidden path pattern is valid"));

const MEDIA_EXTENSIONS: [&str; 2] = [".jpg", ".png"];
const SCRIPT_EXTENSION: &str = ".js";

/// True if any segment of a `/`-separated relative path is hidden.
pub fn is_hidden_path(relative: &str) -> bool {
    HIDDEN_PATH.is_match(relative)
}

/// True for a top-level entry name starting with a dot.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Media files go through the raw multipart upload.
pub fn is_media_file(name: &str) -> bool {
    MEDIA_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Script files are written back as UTF-8 text on export.
pub fn is_script_file(name: &str) -> bool {
    name.ends_with(SCRIPT_EXTENSION)
}

pub fn media_mime(name: &str) -> &'static str {
    if name.ends_with(".png") {
        "image/png"
    } else if name.ends_with(".jpg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

/// Last segment of a `/`-separated remote path, ignoring trailing slashes.
pub fn base_name(remote_path: &str) -> &str {
    let trimmed = remote_path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, name)) => name,
        None => trimmed,
    }
}

/// Split a remote path into its parent folder (if any) and file name.
///
/// ```
/// use scriptsync::storage::split_remote_path;
///
/// assert_eq!(split_remote_path("sub/dir/file.js"), (Some("sub/dir"), "file.js"));
/// assert_eq!(split_remote_path("file.js"), (None, "file.js"));
/// ```
pub fn split_remote_path(remote_path: &str) -> (Option<&str>, &str) {
    match remote_path.rsplit_once('/') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, remote_path),
    }
}

/// Path of `path` relative to `root`, joined with `/` whatever the platform.
pub fn relative_remote_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| eyre!("{} is not inside {}", path.display(), root.display()))?;

    let segments: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Ok(segments.join("/"))
}

/// Reject remote folder paths that would escape the export directory.
pub fn validate_remote_folder(folder: &str) -> Result<()> {
    if folder.contains('\0') {
        eyre::bail!("Remote path contains a null byte: {:?}", folder);
    }
    for component in Path::new(folder).components() {
        if matches!(component, Component::ParentDir) {
            eyre::bail!("Remote path escapes the export directory: {}", folder);
        }
    }
    Ok(())
}

/// Reject a single path segment that could land outside its parent folder.
///
/// The name must be non-empty, must not be `.` or `..`, and must not carry a
/// separator, a root or a null byte.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        eyre::bail!("Invalid file name: {:?}", name);
    }
    if name.contains(['/', '\\', '\0']) || Path::new(name).is_absolute() {
        eyre::bail!("File name must be a single path segment: {:?}", name);
    }
    let mut components = Path::new(name).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        eyre::bail!("File name must be a single path segment: {:?}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_hidden_path() {
        assert!(is_hidden_path(".env"));
        assert!(is_hidden_path(".git/config"));
        assert!(is_hidden_path("sub/.DS_Store"));
        assert!(is_hidden_path("a/.cache/b/c.js"));

        assert!(!is_hidden_path("login.js"));
        assert!(!is_hidden_path("sub/login.test.js"));
        assert!(!is_hidden_path("sub/..weird"));
        assert!(!is_hidden_path("sub./file.js"));
    }

    #[test]
    fn test_hidden_name() {
        assert!(is_hidden_name(".gitignore"));
        assert!(is_hidden_name("..weird"));
        assert!(!is_hidden_name("visible.js"));
    }

    #[test]
    fn test_media_and_script() {
        assert!(is_media_file("x.jpg"));
        assert!(is_media_file("img/logo.png"));
        assert!(!is_media_file("x.txt"));
        assert!(!is_media_file("x.jpeg"));
        assert!(!is_media_file("X.PNG"));

        assert!(is_script_file("a/b.js"));
        assert!(!is_script_file("data.json"));
    }

    #[test]
    fn test_media_mime() {
        assert_eq!(media_mime("x.png"), "image/png");
        assert_eq!(media_mime("x.jpg"), "image/jpeg");
        assert_eq!(media_mime("x.csv"), "application/octet-stream");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("a/b/c.js"), "c.js");
        assert_eq!(base_name("c.js"), "c.js");
        assert_eq!(base_name("a/b/"), "b");
    }

    #[test]
    fn test_split_remote_path() {
        assert_eq!(split_remote_path("a/b.js"), (Some("a"), "b.js"));
        assert_eq!(split_remote_path("/b.js"), (Some(""), "b.js"));
    }

    #[test]
    fn test_relative_remote_path() {
        let root = PathBuf::from("/tmp/project");
        let nested = root.join("sub").join("dir").join("file.js");
        assert_eq!(
            relative_remote_path(&root, &nested).unwrap(),
            "sub/dir/file.js"
        );
        assert!(relative_remote_path(&root, Path::new("/elsewhere/file.js")).is_err());
    }

    #[test]
    fn test_validate_remote_folder() {
        assert!(validate_remote_folder("sub/dir").is_ok());
        assert!(validate_remote_folder("").is_ok());
        assert!(validate_remote_folder("../outside").is_err());
        assert!(validate_remote_folder("sub/../../outside").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("login.js").is_ok());
        assert!(validate_file_name("..weird").is_ok());
        assert!(validate_file_name("r-42.json").is_ok());

        assert!(validate_file_name("").is_err());
        assert!(validate_file_name(".").is_err());
        assert!(validate_file_name("..").is_err());
        assert!(validate_file_name("sub/file.js").is_err());
        assert!(validate_file_name("sub\\file.js").is_err());
        assert!(validate_file_name("/tmp/abs_escape").is_err());
        assert!(validate_file_name("a\0b").is_err());
    }
}
