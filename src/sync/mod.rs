//! Folder import and tree export engines
//!
//! Both engines issue one spawned task per file and join them fail-fast:
//! the first failure is reported while tasks already issued keep running.

mod context;
mod export;
mod import;
mod join;

pub use context::{ErrorPolicy, FileClass, SyncContext, SyncOptions};
pub use export::{
    DownloadTask, FileDownloader, ProjectListing, download_task,
    export_directory_node_to_directory_path, export_test_directory,
};
pub use import::{
    ImportReport, ProjectUploader, UploadOutcome, UploadPlanner, UploadTask,
    import_folder_contents, upload_task,
};
pub use join::spawn_all;
