use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::request::RequestTemplate;
use crate::Result;
use crate::auth::AuthConfig;
use crate::error::RuflowError;

/// 请求集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub requests: Vec<CollectionRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<CollectionSettings>,
}

/// 集合级别的默认设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// 所有请求的默认 Header，请求自身的同名 Header 优先
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Collection 作用域变量
    #[serde(default)]
    pub variables: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(flatten)]
    pub request: RequestTemplate,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            requests: Vec::new(),
            settings: None,
        }
    }

    pub fn with_request(mut self, name: impl Into<String>, request: RequestTemplate) -> Self {
        self.requests.push(CollectionRequest {
            id: None,
            name: name.into(),
            request,
        });
        self
    }

    pub fn with_settings(mut self, settings: CollectionSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// 从 JSON 文件加载并校验
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RuflowError::InvalidCollection(format!("无法读取 {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let collection: Collection = serde_json::from_str(content)
            .map_err(|e| RuflowError::InvalidCollection(e.to_string()))?;
        collection.validate()?;
        Ok(collection)
    }

    /// 集合必须有名称；空的 `requests` 是允许的
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RuflowError::InvalidCollection(
                "缺少必填字段 name".to_string(),
            ));
        }
        Ok(())
    }

    pub fn settings(&self) -> Option<&CollectionSettings> {
        self.settings.as_ref()
    }
}

impl CollectionSettings {
    /// 以 base URL 补全相对地址，以 `http` 开头的地址保持不变
    pub fn join_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !base.is_empty() && !url.starts_with("http") => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            _ => url.to_string(),
        }
    }

    /// 默认 Header 与请求 Header 合并，请求优先
    ///
    /// Header 名大小写不敏感，被请求覆盖的默认项整条移除。
    pub fn merge_headers(&self, request_headers: &HashMap<String, String>) -> HashMap<String, String> {
        let mut headers: HashMap<String, String> = self
            .headers
            .iter()
            .filter(|(name, _)| {
                !request_headers
                    .keys()
                    .any(|key| key.eq_ignore_ascii_case(name))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        headers.extend(
            request_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        headers
    }
}
