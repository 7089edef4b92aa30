use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::Result;
use crate::http::{Method, RequestOptions, ResponseData};

/// 历史记录条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 唯一 ID (UUID)
    pub id: String,

    /// 请求完成时间
    pub timestamp: DateTime<Utc>,

    /// 请求耗时 (毫秒)
    pub duration_ms: u64,

    /// 已解析变量后的请求
    pub request: RequestSnapshot,

    /// 响应元数据
    pub response: ResponseMeta,
}

/// 请求快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub params: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// 响应元数据 (不包含 body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub status: u16,

    #[serde(default)]
    pub status_text: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl HistoryEntry {
    pub fn new(request: &RequestOptions, response: &ResponseData) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            duration_ms: response.duration,
            request: RequestSnapshot::from(request),
            response: ResponseMeta::from(response),
        }
    }

    /// 列表展示用的短 ID
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

impl RequestSnapshot {
    /// 重建请求，用于重放
    ///
    /// 快照中保存的是解析后的值，超时和重定向使用默认设置。
    pub fn to_options(&self) -> Result<RequestOptions> {
        let method: Method = self.method.parse()?;
        let mut options = RequestOptions::new(method, self.url.clone());
        options.headers = self.headers.clone();
        options.params = self.params.clone();
        options.body = self.body.clone();
        Ok(options)
    }
}

impl From<&RequestOptions> for RequestSnapshot {
    fn from(options: &RequestOptions) -> Self {
        Self {
            method: options.method.to_string(),
            url: options.url.clone(),
            headers: options.headers.clone(),
            params: options.params.clone(),
            body: options.body.clone(),
        }
    }
}

impl From<&ResponseData> for ResponseMeta {
    fn from(response: &ResponseData) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
        }
    }
}
