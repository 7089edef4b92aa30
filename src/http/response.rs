use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP 响应，产生后不再修改
///
/// 响应体能解析为 JSON 时保存为对应的 JSON 值，否则保存为 `Value::String`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub data: Value,
    /// 请求耗时（毫秒）
    pub duration: u64,
}

impl ResponseData {
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        headers: HashMap<String, String>,
        data: Value,
        duration: Duration,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            data,
            duration: duration.as_millis() as u64,
        }
    }

    /// 从原始文本构造，优先解析为 JSON
    pub fn from_text(
        status: u16,
        status_text: impl Into<String>,
        headers: HashMap<String, String>,
        body: String,
        duration: Duration,
    ) -> Self {
        let data = parse_body(body);
        Self::new(status, status_text, headers, data, duration)
    }

    /// 状态码是否落在 [200, 400) 区间
    pub fn is_success_or_redirect(&self) -> bool {
        (200..400).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

fn parse_body(body: String) -> Value {
    if body.trim().is_empty() {
        return Value::String(body);
    }
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}
