pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod schedule;
pub mod store;
pub mod transform;

pub use error::{EtlError, EtlResult};
pub use pipeline::{Pipeline, RunSummary};
