pub mod assertion;
pub mod auth;
pub mod error;
pub mod history;
pub mod http;
pub mod logger;
pub mod model;
pub mod runner;
pub mod utils;
pub mod variable;

// Re-export commonly used types
pub use error::{Result, RuflowError};
