pub mod analyzers;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod join;
pub mod loader;
pub mod output;
pub mod parser;
pub mod records;
pub mod report;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{PipelineError, Result};
