use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assertion::TestAssertion;
use crate::http::{Method, RequestOptions};

/// 集合与工作流文件中共用的请求定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTemplate {
    pub method: Method,
    pub url: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(default)]
    pub tests: Vec<TestAssertion>,
}

impl RequestTemplate {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
            tests: Vec::new(),
        }
    }

    /// 转为可执行的请求（未解析变量）
    pub fn to_options(&self) -> RequestOptions {
        let mut options = RequestOptions::new(self.method, self.url.clone());
        options.headers = self.headers.clone();
        options.params = self.params.clone();
        options.body = self.body.clone();
        options
    }

    /// 没有断言时返回 `None`
    pub fn tests(&self) -> Option<&[TestAssertion]> {
        if self.tests.is_empty() {
            None
        } else {
            Some(&self.tests)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_minimal() {
        let template: RequestTemplate =
            serde_json::from_value(json!({"method": "get", "url": "/users"})).unwrap();
        assert_eq!(template.method, Method::Get);
        assert!(template.headers.is_empty());
        assert!(template.tests().is_none());
    }

    #[test]
    fn test_to_options_copies_fields() {
        let template: RequestTemplate = serde_json::from_value(json!({
            "method": "POST",
            "url": "{{base}}/users",
            "headers": {"X-Trace": "1"},
            "params": {"dry": "true"},
            "body": {"name": "{{name}}"},
            "tests": [{"name": "created", "assertion": "status", "expected": 201}]
        }))
        .unwrap();

        let options = template.to_options();
        assert_eq!(options.method, Method::Post);
        assert_eq!(options.url, "{{base}}/users");
        assert_eq!(options.headers.get("X-Trace"), Some(&"1".to_string()));
        assert_eq!(options.params.get("dry"), Some(&"true".to_string()));
        assert_eq!(options.body, Some(json!({"name": "{{name}}"})));
        assert_eq!(template.tests().map(|t| t.len()), Some(1));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let result: Result<RequestTemplate, _> =
            serde_json::from_value(json!({"method": "FETCH", "url": "/"}));
        assert!(result.is_err());
    }
}
