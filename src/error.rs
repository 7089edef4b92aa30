use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuflowError {
    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("无效的 Header: {0}")]
    InvalidHeader(String),

    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("未收到响应: {0}")]
    NoResponse(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("配置文件错误: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("无效的 Workflow 文件: {0}")]
    InvalidWorkflow(String),

    #[error("无效的 Collection 文件: {0}")]
    InvalidCollection(String),

    #[error("{0}")]
    Other(String),
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for RuflowError {
    fn from(err: anyhow::Error) -> Self {
        RuflowError::Other(err.to_string())
    }
}

/// Result type for ruflow crate
pub type Result<T> = std::result::Result<T, RuflowError>;
