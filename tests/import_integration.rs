//! Integration tests for folder import
//!
//! These drive `import_folder_contents` against an in-memory project over a
//! real temporary folder tree.

mod common;

use common::{Call, MockProject};
use eyre::Result;
use scriptsync::client::{EMPTY_FILE_PLACEHOLDER, FILE_ALREADY_EXISTS};
use scriptsync::etl::{Loader, Pipeline, Transformer};
use scriptsync::storage::FolderReader;
use scriptsync::sync::{
    ErrorPolicy, FileClass, ProjectUploader, SyncContext, SyncOptions, UploadPlanner,
    import_folder_contents,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Create a small project folder with scripts, media and hidden files
fn create_test_folder(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir.join("flows/checkout"))?;
    std::fs::create_dir_all(dir.join(".git"))?;

    std::fs::write(dir.join("login.js"), "I.goTo('https://example.com')")?;
    std::fs::write(dir.join("logo.png"), [0x89, b'P', b'N', b'G'])?;
    std::fs::write(dir.join(".env"), "SECRET=1")?;
    std::fs::write(dir.join(".git/HEAD"), "ref: refs/heads/main")?;
    std::fs::write(dir.join("flows/search.js"), "I.fill('q', 'shoes')")?;
    std::fs::write(dir.join("flows/checkout/pay.js"), "")?;
    std::fs::write(dir.join("flows/checkout/card.jpg"), [0xFF, 0xD8])?;
    std::fs::write(dir.join("flows/.draft.js"), "wip")?;

    Ok(())
}

fn context(mock: &Arc<MockProject>, overwrite: bool) -> SyncContext<MockProject> {
    SyncContext::from_arc(mock.clone())
        .with_options(SyncOptions::default().with_overwrite(overwrite))
}

#[tokio::test]
async fn test_only_hidden_files_uploads_nothing() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join(".env"), "A=1")?;
    std::fs::write(temp.path().join(".gitignore"), "target")?;
    std::fs::create_dir_all(temp.path().join(".github/workflows"))?;
    std::fs::write(temp.path().join(".github/workflows/ci.yml"), "on: push")?;

    let mock = Arc::new(MockProject::new());
    let report = import_folder_contents(&context(&mock, false), "p1", temp.path()).await?;

    assert_eq!(report.processed(), 0);
    assert!(mock.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_import_folder_tree() -> Result<()> {
    let temp = TempDir::new()?;
    create_test_folder(temp.path())?;

    let mock = Arc::new(MockProject::new());
    let report = import_folder_contents(&context(&mock, false), "p1", temp.path()).await?;

    assert_eq!(report.uploaded, 5);
    assert_eq!(report.skipped, 0);
    assert_eq!(
        mock.file_paths(),
        vec![
            "flows/checkout/card.jpg",
            "flows/checkout/pay.js",
            "flows/search.js",
            "login.js",
            "logo.png",
        ]
    );

    // Empty scripts are sent with a placeholder body
    assert_eq!(
        mock.file("flows/checkout/pay.js").unwrap(),
        EMPTY_FILE_PLACEHOLDER.as_bytes()
    );
    assert_eq!(
        mock.file("logo.png").unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
    Ok(())
}

#[tokio::test]
async fn test_media_routed_to_raw_upload() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join("x.jpg"), [0xFF, 0xD8, 0xFF])?;
    std::fs::write(temp.path().join("x.txt"), "plain text")?;

    let mock = Arc::new(MockProject::new());
    import_folder_contents(&context(&mock, false), "p1", temp.path()).await?;

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&Call::Raw {
        path: "x.jpg".to_string(),
        overwrite: false
    }));
    assert!(calls.contains(&Call::Put {
        path: "x.txt".to_string(),
        overwrite: false
    }));
    assert!(!calls.iter().any(|c| matches!(c, Call::Put { path, .. } if path == "x.jpg")));
    assert!(!calls.iter().any(|c| matches!(c, Call::Raw { path, .. } if path == "x.txt")));
    Ok(())
}

#[tokio::test]
async fn test_second_import_skips_existing() -> Result<()> {
    let temp = TempDir::new()?;
    create_test_folder(temp.path())?;

    let mock = Arc::new(MockProject::new());
    let ctx = context(&mock, false);

    let first = import_folder_contents(&ctx, "p1", temp.path()).await?;
    assert_eq!(first.uploaded, 5);

    let second = import_folder_contents(&ctx, "p1", temp.path()).await?;
    assert_eq!(second.uploaded, 0);
    assert_eq!(second.skipped, 5);
    assert_eq!(second.failed, 0);
    Ok(())
}

#[tokio::test]
async fn test_overwrite_replaces_existing() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join("login.js"), "new version")?;

    let mock = Arc::new(MockProject::new().with_file("login.js", b"old version"));
    let report = import_folder_contents(&context(&mock, true), "p1", temp.path()).await?;

    assert_eq!(report.uploaded, 1);
    assert_eq!(mock.file("login.js").unwrap(), b"new version");
    assert_eq!(
        mock.calls(),
        vec![Call::Put {
            path: "login.js".to_string(),
            overwrite: true
        }]
    );
    Ok(())
}

#[tokio::test]
async fn test_text_failure_fails_fast_but_siblings_finish() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join("one.js"), "1")?;
    std::fs::write(temp.path().join("two.js"), "2")?;
    std::fs::write(temp.path().join("three.js"), "3")?;

    let mock = Arc::new(
        MockProject::new()
            .with_upload_delay(Duration::from_millis(50))
            .fail_on("two.js", "NOT_AUTHORIZED"),
    );

    let err = import_folder_contents(&context(&mock, false), "p1", temp.path())
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("NOT_AUTHORIZED"));
    assert!(err.to_string().contains("two.js"));

    // Sibling uploads were not cancelled
    for _ in 0..100 {
        if mock.file_paths().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(mock.file_paths(), vec!["one.js", "three.js"]);
    Ok(())
}

#[tokio::test]
async fn test_media_failure_is_best_effort() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join("logo.png"), [1, 2, 3])?;
    std::fs::write(temp.path().join("login.js"), "I.goTo('/')")?;

    let mock = Arc::new(MockProject::new().fail_on("logo.png", "UPLOAD_FAILED"));
    let report = import_folder_contents(&context(&mock, false), "p1", temp.path()).await?;

    assert_eq!(report.uploaded, 1);
    assert_eq!(report.failed, 1);
    Ok(())
}

#[tokio::test]
async fn test_strict_media_policy() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join("logo.png"), [1, 2, 3])?;

    let mock = Arc::new(MockProject::new().fail_on("logo.png", "UPLOAD_FAILED"));
    let ctx = SyncContext::from_arc(mock.clone()).with_options(
        SyncOptions::default().with_policy(FileClass::Media, ErrorPolicy::Strict),
    );

    assert!(import_folder_contents(&ctx, "p1", temp.path()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_already_exists_is_skip_for_media() -> Result<()> {
    let temp = TempDir::new()?;
    std::fs::write(temp.path().join("logo.png"), [1, 2, 3])?;

    let mock = Arc::new(MockProject::new().fail_on("logo.png", FILE_ALREADY_EXISTS));
    let ctx = SyncContext::from_arc(mock.clone()).with_options(
        SyncOptions::default().with_policy(FileClass::Media, ErrorPolicy::Strict),
    );

    let report = import_folder_contents(&ctx, "p1", temp.path()).await?;
    assert_eq!(report.skipped, 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_folder_is_an_error() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockProject::new());

    let result =
        import_folder_contents(&context(&mock, false), "p1", temp.path().join("missing")).await;
    assert!(result.is_err());
    assert!(mock.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_uploader_report_accumulates_across_loads() -> Result<()> {
    let temp = TempDir::new()?;
    create_test_folder(temp.path())?;

    let mock = Arc::new(MockProject::new());
    let pipeline = Pipeline::new(
        FolderReader::new(temp.path()),
        UploadPlanner::new("p1", false),
        ProjectUploader::new(context(&mock, false)),
    )
    .with_label("import");

    assert_eq!(pipeline.run().await?, 5);
    assert_eq!(pipeline.loader().report().uploaded, 5);

    // Loading the same tasks again only produces skips
    let tasks = UploadPlanner::new("p1", false)
        .transform_many(FolderReader::new(temp.path()).read_all()?)?;
    assert_eq!(pipeline.loader().load(tasks).await?, 5);

    let report = pipeline.loader().report();
    assert_eq!(report.uploaded, 5);
    assert_eq!(report.skipped, 5);
    assert_eq!(mock.file_paths().len(), 5);
    Ok(())
}
