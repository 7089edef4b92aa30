use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::json_path::{JsonPath, JsonPathError, PathSegment};

/// 断言错误类型
#[derive(Debug, thiserror::Error)]
pub enum AssertError {
    #[error("Invalid assertion path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: JsonPathError,
    },
}

/// 值路径 - 用于从响应中提取值
#[derive(Debug, Clone, PartialEq)]
pub enum ValuePath {
    /// HTTP 状态码
    Status,
    /// HTTP 状态描述
    StatusText,
    /// 响应 Header（大小写敏感）
    Header(String),
    /// 响应 body 中的路径
    Data(JsonPath),
    /// 响应时间（毫秒）
    Duration,
    /// 无法识别的路径，提取结果总是 undefined
    Unknown(String),
}

impl ValuePath {
    /// 解析断言路径
    ///
    /// 支持的格式：
    /// - `status`、`statusText`、`duration`
    /// - `headers.content-type`
    /// - `data`、`data.user.id`、`data.items[0].id`、`data[0]`
    pub fn parse(input: &str) -> Result<Self, AssertError> {
        let input = input.trim();
        let (head, rest) = match input.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (input, None),
        };

        let path = match head {
            "status" => ValuePath::Status,
            "statusText" => ValuePath::StatusText,
            "duration" => ValuePath::Duration,
            "headers" => match rest {
                Some(name) if !name.is_empty() => ValuePath::Header(name.to_string()),
                _ => ValuePath::Unknown(input.to_string()),
            },
            "data" => ValuePath::Data(Self::parse_data_path(input, rest.unwrap_or(""))?),
            h if h.starts_with("data[") => {
                ValuePath::Data(Self::parse_data_path(input, &input["data".len()..])?)
            }
            _ => ValuePath::Unknown(input.to_string()),
        };

        Ok(path)
    }

    fn parse_data_path(input: &str, rest: &str) -> Result<JsonPath, AssertError> {
        JsonPath::parse(rest).map_err(|source| AssertError::InvalidPath {
            path: input.to_string(),
            source,
        })
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuePath::Status => write!(f, "status"),
            ValuePath::StatusText => write!(f, "statusText"),
            ValuePath::Header(name) => write!(f, "headers.{}", name),
            ValuePath::Data(path) => match path.segments().first() {
                None => write!(f, "data"),
                Some(PathSegment::Key(_)) => write!(f, "data.{}", path),
                Some(_) => write!(f, "data{}", path),
            },
            ValuePath::Duration => write!(f, "duration"),
            ValuePath::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// 单条断言，求值后填充 `actual` 与 `passed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAssertion {
    pub name: String,

    /// 断言路径，例如 `status`、`data.user.id`
    pub assertion: String,

    #[serde(default)]
    pub expected: Value,

    /// 实际值；`None` 表示 undefined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
}

impl TestAssertion {
    pub fn new(name: impl Into<String>, assertion: impl Into<String>, expected: Value) -> Self {
        Self {
            name: name.into(),
            assertion: assertion.into(),
            expected,
            actual: None,
            passed: None,
        }
    }

    /// 填入求值结果，返回新的断言
    pub fn evaluated(&self, actual: Option<Value>, passed: bool) -> Self {
        Self {
            actual,
            passed: Some(passed),
            ..self.clone()
        }
    }

    pub fn is_passed(&self) -> bool {
        self.passed.unwrap_or(false)
    }
}

/// 一组断言的汇总结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,

    /// 所有断言都通过时为 true
    pub passed: bool,

    pub assertions: Vec<TestAssertion>,

    /// 断言求值耗时（毫秒）
    pub duration: u64,
}

impl TestResult {
    pub fn passed_count(&self) -> usize {
        self.assertions.iter().filter(|a| a.is_passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.assertions.len() - self.passed_count()
    }

    pub fn failed_assertions(&self) -> impl Iterator<Item = &TestAssertion> {
        self.assertions.iter().filter(|a| !a.is_passed())
    }
}
