//! File system storage operations
//!
//! This module handles all local file I/O:
//! - Classifying paths (hidden, media, script)
//! - Walking import folders
//! - Writing exported files

mod paths;
mod walker;
mod writer;

pub use paths::{
    base_name, is_hidden_name, is_hidden_path, is_media_file, is_script_file, media_mime,
    relative_remote_path, split_remote_path, validate_file_name, validate_remote_folder,
};
pub use walker::{FolderReader, FolderWalker, LocalFile};
pub use writer::{binary_content, export_test_file, resolve_export_target};
