use serde_json::Value;

use crate::assertion::types::{AssertError, ValuePath};
use crate::http::ResponseData;

/// 从响应中提取值，路径不存在时返回 `None`（undefined）
pub fn extract_value(response: &ResponseData, path: &ValuePath) -> Option<Value> {
    match path {
        ValuePath::Status => Some(Value::from(response.status)),
        ValuePath::StatusText => Some(Value::String(response.status_text.clone())),
        ValuePath::Header(name) => response.headers.get(name).cloned().map(Value::String),
        ValuePath::Data(json_path) => json_path.evaluate(&response.data).cloned(),
        ValuePath::Duration => Some(Value::from(response.duration)),
        ValuePath::Unknown(_) => None,
    }
}

/// 解析断言路径并提取实际值
pub fn extract_actual(response: &ResponseData, assertion: &str) -> Result<Option<Value>, AssertError> {
    let path = ValuePath::parse(assertion)?;
    Ok(extract_value(response, &path))
}
