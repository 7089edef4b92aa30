use serde::{Deserialize, Serialize};

/// API Key 放置位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

/// 认证描述
///
/// JSON 形如 `{"type": "bearer", "token": "..."}`。
/// 签名类方案（oauth2、aws-sigv4、digest、custom）可以被解析，但不会被应用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthConfig {
    None,
    Bearer {
        token: String,
    },
    Basic {
        username: String,
        password: String,
    },
    #[serde(rename_all = "camelCase")]
    ApiKey {
        api_key: String,
        #[serde(default = "default_api_key_name")]
        api_key_name: String,
        #[serde(default)]
        api_key_location: ApiKeyLocation,
    },
    #[serde(other)]
    Unsupported,
}

pub(crate) fn default_api_key_name() -> String {
    "X-API-Key".to_string()
}

impl AuthConfig {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn api_key(
        api_key: impl Into<String>,
        api_key_name: Option<String>,
        location: ApiKeyLocation,
    ) -> Self {
        Self::ApiKey {
            api_key: api_key.into(),
            api_key_name: api_key_name.unwrap_or_else(default_api_key_name),
            api_key_location: location,
        }
    }

    /// 对凭据的每个字符串字段应用 `resolve`
    ///
    /// Basic 会被编码为 base64，因此占位符必须在写入 Header 之前替换。
    pub fn map_credentials(&self, resolve: impl Fn(&str) -> String) -> Self {
        match self {
            Self::Bearer { token } => Self::Bearer {
                token: resolve(token),
            },
            Self::Basic { username, password } => Self::Basic {
                username: resolve(username),
                password: resolve(password),
            },
            Self::ApiKey {
                api_key,
                api_key_name,
                api_key_location,
            } => Self::ApiKey {
                api_key: resolve(api_key),
                api_key_name: resolve(api_key_name),
                api_key_location: *api_key_location,
            },
            Self::None | Self::Unsupported => self.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer { .. } => "bearer",
            Self::Basic { .. } => "basic",
            Self::ApiKey { .. } => "apikey",
            Self::Unsupported => "unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_bearer() {
        let auth: AuthConfig =
            serde_json::from_value(json!({"type": "bearer", "token": "t0k"})).unwrap();
        assert_eq!(auth, AuthConfig::bearer("t0k"));
    }

    #[test]
    fn test_deserialize_api_key_defaults() {
        let auth: AuthConfig =
            serde_json::from_value(json!({"type": "apikey", "apiKey": "k"})).unwrap();
        assert_eq!(auth, AuthConfig::api_key("k", None, ApiKeyLocation::Header));
    }

    #[test]
    fn test_deserialize_api_key_in_query() {
        let auth: AuthConfig = serde_json::from_value(json!({
            "type": "apikey",
            "apiKey": "k",
            "apiKeyName": "key",
            "apiKeyLocation": "query"
        }))
        .unwrap();
        assert_eq!(
            auth,
            AuthConfig::api_key("k", Some("key".to_string()), ApiKeyLocation::Query)
        );
    }

    #[test]
    fn test_map_credentials() {
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(
            AuthConfig::basic("u", "p").map_credentials(upper),
            AuthConfig::basic("U", "P")
        );
        assert_eq!(
            AuthConfig::api_key("k", Some("name".to_string()), ApiKeyLocation::Query)
                .map_credentials(upper),
            AuthConfig::api_key("K", Some("NAME".to_string()), ApiKeyLocation::Query)
        );
        assert_eq!(AuthConfig::None.map_credentials(upper), AuthConfig::None);
    }

    #[test]
    fn test_deserialize_signature_scheme_is_unsupported() {
        let auth: AuthConfig = serde_json::from_value(json!({"type": "digest"})).unwrap();
        assert_eq!(auth, AuthConfig::Unsupported);
        assert_eq!(auth.kind(), "unsupported");
    }
}
