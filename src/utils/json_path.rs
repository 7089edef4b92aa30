use serde_json::Value;
use std::fmt;

/// JSON 路径解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonPathError {
    #[error("Unclosed bracket in path '{0}'")]
    UnclosedBracket(String),

    #[error("Empty bracket in path '{0}'")]
    EmptyBracket(String),

    #[error("Invalid array index '{index}' in path '{path}'")]
    InvalidIndex { path: String, index: String },

    #[error("Unexpected character after ']' in path '{0}'")]
    UnexpectedCharacter(String),
}

/// 路径段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// 对象属性；作用于数组时若为数字则按下标处理
    Key(String),
    /// 数组下标 `[0]`
    Index(usize),
    /// 通配 `[*]`，直接返回整个数组
    Wildcard,
}

/// 简单 JSON 路径
///
/// 支持的语法：
/// - `user.name`
/// - `items[0].id`、`matrix[1][0]`
/// - `items[*]`
/// - 空路径或 `.` 表示根节点，开头的 `.` 会被忽略
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> Result<Self, JsonPathError> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Ok(Self::root());
        }

        let clean = trimmed.strip_prefix('.').unwrap_or(trimmed);
        let mut segments = Vec::new();

        for part in clean.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };

            if rest.is_empty() || !name.is_empty() {
                segments.push(PathSegment::Key(name.to_string()));
            }

            while !rest.is_empty() {
                if !rest.starts_with('[') {
                    return Err(JsonPathError::UnexpectedCharacter(path.to_string()));
                }
                let close = rest
                    .find(']')
                    .ok_or_else(|| JsonPathError::UnclosedBracket(path.to_string()))?;
                let inner = rest[1..close].trim();
                let segment = match inner {
                    "" => return Err(JsonPathError::EmptyBracket(path.to_string())),
                    "*" => PathSegment::Wildcard,
                    index => PathSegment::Index(index.parse().map_err(|_| {
                        JsonPathError::InvalidIndex {
                            path: path.to_string(),
                            index: index.to_string(),
                        }
                    })?),
                };
                segments.push(segment);
                rest = &rest[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// 在 JSON 值上求值，路径不存在时返回 `None`
    pub fn evaluate<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        let mut current = data;

        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Key(key), Value::Array(items)) => {
                    items.get(key.parse::<usize>().ok()?)?
                }
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
                (PathSegment::Wildcard, Value::Array(_)) => return Some(current),
                _ => return None,
            };
        }

        Some(current)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Wildcard => f.write_str("[*]")?,
            }
            first = false;
        }
        Ok(())
    }
}

/// 按路径提取值，路径无效或不存在时返回 `None`
pub fn extract_json_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    JsonPath::parse(path).ok()?.evaluate(data)
}

/// 将提取到的值转换为变量字符串
///
/// 字符串原样返回，其余值使用紧凑 JSON 表示。
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
