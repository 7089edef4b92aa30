pub mod client;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types for convenient access
pub use client::{HttpTransport, ReqwestTransport};
pub use request::RequestOptions;
pub use response::ResponseData;
pub use types::Method;
