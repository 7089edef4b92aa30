use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

use crate::auth::types::{ApiKeyLocation, AuthConfig};

/// 将认证信息写入请求 Header 或 Query 参数
///
/// 凭据为空时不做任何修改。
pub fn apply_auth(
    auth: &AuthConfig,
    headers: &mut HashMap<String, String>,
    params: &mut HashMap<String, String>,
) {
    match auth {
        AuthConfig::None => {}
        AuthConfig::Bearer { token } => {
            if !token.is_empty() {
                insert_replacing(headers, "Authorization", format!("Bearer {}", token));
            }
        }
        AuthConfig::Basic { username, password } => {
            if !username.is_empty() && !password.is_empty() {
                let credentials = STANDARD.encode(format!("{}:{}", username, password));
                insert_replacing(headers, "Authorization", format!("Basic {}", credentials));
            }
        }
        AuthConfig::ApiKey {
            api_key,
            api_key_name,
            api_key_location,
        } => {
            if api_key.is_empty() || api_key_name.is_empty() {
                return;
            }
            match api_key_location {
                ApiKeyLocation::Header => insert_replacing(headers, api_key_name, api_key.clone()),
                ApiKeyLocation::Query => {
                    params.insert(api_key_name.clone(), api_key.clone());
                }
            }
        }
        AuthConfig::Unsupported => {
            warn!("Unsupported auth type, request is sent without credentials");
        }
    }
}

/// 写入前移除大小写不同的同名项，避免发送两个同名 Header
fn insert_replacing(map: &mut HashMap<String, String>, name: &str, value: String) {
    map.retain(|key, _| !key.eq_ignore_ascii_case(name));
    map.insert(name.to_string(), value);
}
