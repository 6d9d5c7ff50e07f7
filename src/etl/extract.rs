//! Extractor trait for data extraction from various sources

use eyre::Result;

/// Extractor trait for extracting data from a source
///
/// Implementors define how to extract items from sources like:
/// - A local folder tree
/// - A remote project listing
///
/// # Example
/// ```no_run
/// use scriptsync::etl::Extractor;
/// use eyre::Result;
/// use std::path::PathBuf;
///
/// struct FileNames {
///     path: PathBuf,
/// }
///
/// impl Extractor for FileNames {
///     type Item = String;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         // Read the folder and return file names
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract items from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, I/O, parsing, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
