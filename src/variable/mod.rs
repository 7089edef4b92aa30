pub mod capture;
pub mod config;
pub mod resolver;
pub mod types;

pub use capture::{ExtractionScope, VariableExtraction};
pub use config::ConfigLoader;
pub use resolver::VariableResolver;
pub use types::{Environment, EnvironmentStore, VariableConfig, VariableScope, Variables};
