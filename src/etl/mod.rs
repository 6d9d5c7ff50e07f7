//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Imports and exports are both pipelines: extract nodes from one side,
//! turn them into tasks, and load them into the other side.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::{IdentityTransformer, Transformer};
