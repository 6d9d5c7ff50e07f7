//! scriptsync
//!
//! Import local test-script folders into a remote testing project, export
//! a project back to disk, and dispatch test runs.

pub mod cli;
pub mod client;
pub mod etl;
pub mod run;
pub mod storage;
pub mod sync;

// Re-exports for convenience
pub use client::{Auth, AuthType, ProjectApi, ProjectClient, RemoteError, RemoteNode};
pub use etl::{Extractor, IdentityTransformer, Loader, Pipeline, Transformer};
pub use storage::{FolderReader, FolderWalker, LocalFile, export_test_file};
pub use sync::{
    ErrorPolicy, SyncContext, SyncOptions, export_directory_node_to_directory_path,
    export_test_directory, import_folder_contents,
};
