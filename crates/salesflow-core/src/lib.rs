pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod transform;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, RunReport};
