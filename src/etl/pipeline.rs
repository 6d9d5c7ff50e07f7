//! Pipeline orchestration for import and export runs

use super::{Extractor, Loader, Transformer};
use eyre::Result;

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
///
/// # Example
/// ```no_run
/// use scriptsync::etl::{IdentityTransformer, Pipeline};
/// # use scriptsync::etl::{Extractor, Loader};
/// # use async_trait::async_trait;
/// # use eyre::Result;
/// # struct RemoteNames;
/// # impl Extractor for RemoteNames {
/// #     type Item = String;
/// #     async fn extract(&self) -> Result<Vec<Self::Item>> { Ok(vec![]) }
/// # }
/// # struct Downloader;
/// # #[async_trait]
/// # impl Loader for Downloader {
/// #     type Item = String;
/// #     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> { Ok(items.len()) }
/// # }
///
/// # async fn example() -> Result<()> {
/// let pipeline = Pipeline::new(RemoteNames, IdentityTransformer::new(), Downloader);
///
/// let count = pipeline.run().await?;
/// println!("Processed {} items", count);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
    label: &'static str,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
            label: "pipeline",
        }
    }

    /// Name used in log lines for this pipeline
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// The loader, for reading back what it recorded during a run
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract items from source
    /// 2. Transform each item
    /// 3. Load items to destination
    ///
    /// Returns the number of items successfully loaded
    ///
    /// # Errors
    /// Returns an error if any stage fails
    pub async fn run(&self) -> Result<usize> {
        let label = self.label;

        let items = self.extractor.extract().await?;
        log::debug!("[{}] extracted {} item(s)", label, items.len());

        if items.is_empty() {
            log::debug!("[{}] nothing to do", label);
            return Ok(0);
        }

        let tasks = self.transformer.transform_many(items)?;
        log::debug!("[{}] planned {} task(s)", label, tasks.len());

        let count = self.loader.load(tasks).await?;
        log::debug!("[{}] loaded {} item(s)", label, count);

        Ok(count)
    }
}
