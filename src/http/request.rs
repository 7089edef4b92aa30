use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::auth::AuthConfig;
use crate::http::types::Method;

/// 默认请求超时（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// 默认最大重定向次数
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// 一次 HTTP 请求的完整描述
///
/// `body` 为 `Value::String` 时按原始文本发送，其余 JSON 值序列化为 JSON 发送。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    pub method: Method,
    pub url: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// 超时（毫秒），未设置时使用 [`DEFAULT_TIMEOUT_MS`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    #[serde(default = "default_true")]
    pub follow_redirects: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_redirects: Option<usize>,

    /// 是否校验 TLS 证书
    #[serde(default = "default_true")]
    pub reject_unauthorized: bool,
}

fn default_true() -> bool {
    true
}

impl RequestOptions {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
            timeout: None,
            auth: None,
            follow_redirects: true,
            max_redirects: None,
            reject_unauthorized: true,
        }
    }

    /// 从字符串形式的方法名构造
    pub fn parse(method: &str, url: &str) -> Result<Self> {
        Ok(Self::new(method.parse()?, url))
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.body = Some(Value::String(text.to_owned()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn effective_timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    pub fn effective_max_redirects(&self) -> usize {
        self.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS)
    }

    /// 是否可以复用默认配置的 HTTP 客户端
    pub fn uses_default_transport_settings(&self) -> bool {
        self.follow_redirects && self.reject_unauthorized && self.max_redirects.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_minimal() {
        let options: RequestOptions =
            serde_json::from_value(json!({"method": "get", "url": "https://example.com"}))
                .unwrap();
        assert_eq!(options.method, Method::Get);
        assert!(options.headers.is_empty());
        assert!(options.body.is_none());
        assert!(options.follow_redirects);
        assert!(options.reject_unauthorized);
        assert_eq!(options.effective_timeout(), DEFAULT_TIMEOUT_MS);
        assert_eq!(options.effective_max_redirects(), DEFAULT_MAX_REDIRECTS);
        assert!(options.uses_default_transport_settings());
    }

    #[test]
    fn test_deserialize_full() {
        let options: RequestOptions = serde_json::from_value(json!({
            "method": "POST",
            "url": "https://example.com/users",
            "headers": {"Content-Type": "application/json"},
            "params": {"page": "1"},
            "body": {"name": "Alice"},
            "timeout": 500,
            "auth": {"type": "bearer", "token": "abc"},
            "followRedirects": false,
            "rejectUnauthorized": false
        }))
        .unwrap();

        assert_eq!(options.timeout, Some(500));
        assert_eq!(options.params.get("page"), Some(&"1".to_string()));
        assert_eq!(options.body, Some(json!({"name": "Alice"})));
        assert_eq!(
            options.auth,
            Some(AuthConfig::Bearer {
                token: "abc".to_string()
            })
        );
        assert!(!options.uses_default_transport_settings());
    }

    #[test]
    fn test_builder() {
        let options = RequestOptions::parse("put", "https://example.com")
            .unwrap()
            .with_header("Accept", "application/json")
            .with_query("q", "search")
            .with_text("raw")
            .with_timeout(1000);

        assert_eq!(options.method, Method::Put);
        assert_eq!(options.headers.len(), 1);
        assert_eq!(options.body, Some(Value::String("raw".to_string())));
        assert_eq!(options.effective_timeout(), 1000);
    }
}
