use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use serde_json::Value;

use crate::http::request::{DEFAULT_MAX_REDIRECTS, RequestOptions};
use crate::http::response::ResponseData;
use crate::http::types::Method;
use crate::{Result, RuflowError};

/// 发送 HTTP 请求的能力
///
/// 实现方对服务端返回的任何状态码（包括 4xx/5xx）都必须返回 `Ok`，
/// 只有在拿不到响应时（DNS、连接失败、超时）才返回 `Err`。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, options: &RequestOptions) -> Result<ResponseData>;
}

/// 基于 reqwest 的默认传输层
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let inner = reqwest::Client::builder()
            .redirect(Policy::limited(DEFAULT_MAX_REDIRECTS))
            .build()?;
        Ok(Self { inner })
    }

    /// 重定向或证书校验与默认值不同的请求需要单独构建客户端
    fn client_for(&self, options: &RequestOptions) -> Result<reqwest::Client> {
        if options.uses_default_transport_settings() {
            return Ok(self.inner.clone());
        }

        let policy = if options.follow_redirects {
            Policy::limited(options.effective_max_redirects())
        } else {
            Policy::none()
        };

        let client = reqwest::Client::builder()
            .redirect(policy)
            .danger_accept_invalid_certs(!options.reject_unauthorized)
            .build()?;
        Ok(client)
    }

    fn to_reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }

    fn build_url(options: &RequestOptions) -> Result<reqwest::Url> {
        let parsed = if options.params.is_empty() {
            reqwest::Url::parse(&options.url)
        } else {
            reqwest::Url::parse_with_params(&options.url, &options.params)
        };
        parsed.map_err(|e| RuflowError::InvalidUrl(format!("{} ({})", options.url, e)))
    }

    fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| RuflowError::InvalidHeader(key.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| RuflowError::InvalidHeader(format!("{}: {}", key, value)))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = HashMap::new();
        for (name, value) in headers.iter() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            map.entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        map
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, options: &RequestOptions) -> Result<ResponseData> {
        let client = self.client_for(options)?;
        let url = Self::build_url(options)?;
        let headers = Self::build_headers(&options.headers)?;

        let mut req = client
            .request(Self::to_reqwest_method(options.method), url)
            .headers(headers)
            .timeout(Duration::from_millis(options.effective_timeout()));

        match &options.body {
            None => {}
            Some(Value::String(text)) => req = req.body(text.clone()),
            Some(value) => req = req.json(value),
        }

        let start = Instant::now();
        let response = req
            .send()
            .await
            .map_err(|e| RuflowError::NoResponse(e.to_string()))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let headers = Self::collect_headers(response.headers());
        let body = response.text().await?;
        let duration = start.elapsed();

        Ok(ResponseData::from_text(
            status.as_u16(),
            status_text,
            headers,
            body,
            duration,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_with_params() {
        let options = RequestOptions::new(Method::Get, "https://example.com/search")
            .with_query("q", "rust lang");
        let url = ReqwestTransport::build_url(&options).unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?q=rust+lang");
    }

    #[test]
    fn test_build_url_unresolved_placeholder_fails() {
        let options = RequestOptions::new(Method::Get, "{{base_url}}/users");
        let err = ReqwestTransport::build_url(&options).unwrap_err();
        assert!(matches!(err, RuflowError::InvalidUrl(_)));
    }

    #[test]
    fn test_build_headers_rejects_invalid_name() {
        let mut headers = HashMap::new();
        headers.insert("Bad Header".to_string(), "x".to_string());
        assert!(ReqwestTransport::build_headers(&headers).is_err());
    }

    #[test]
    fn test_collect_headers_joins_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        let map = ReqwestTransport::collect_headers(&headers);
        assert_eq!(map.get("set-cookie"), Some(&"a=1, b=2".to_string()));
    }
}
