use std::fmt;
use std::str::FromStr;

use crate::{Result, RuflowError};
use serde::{Deserialize, Serialize};

/// HTTP 方法
///
/// JSON 中大小写不敏感（`"get"` 与 `"GET"` 等价），序列化时统一输出大写。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl FromStr for Method {
    type Err = RuflowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(RuflowError::ParseError(format!(
                "Invalid HTTP method: {}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = RuflowError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl Method {
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!(Method::parse("get").unwrap(), Method::Get);
        assert_eq!(Method::parse("Patch").unwrap(), Method::Patch);
        assert_eq!(Method::parse(" OPTIONS ").unwrap(), Method::Options);
        assert!(Method::parse("TRACE").is_err());
    }

    #[test]
    fn test_method_serde() {
        let method: Method = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(method, Method::Delete);
        assert_eq!(serde_json::to_string(&Method::Post).unwrap(), "\"POST\"");
        assert!(serde_json::from_str::<Method>("\"FETCH\"").is_err());
    }
}
