/// 认证模块 - 将认证描述应用到请求上
mod apply;
mod types;

pub use apply::apply_auth;
pub use types::{ApiKeyLocation, AuthConfig};
