use crate::http::ResponseData;
use colored::*;
use serde_json::Value;

pub enum ResponseFormat {
    Compact,
    Verbose,
}

pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
    show_body: bool,
    show_headers: bool,
    show_timing: bool,
}

impl ResponseFormatter {
    /// 紧凑模式下直接展示 body 的最大长度
    const COMPACT_BODY_LIMIT: usize = 200;

    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
            show_body: true,
            show_headers: true,
            show_timing: true,
        }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn format(&self, response: &ResponseData) -> String {
        match self.format {
            ResponseFormat::Compact => self.format_compact(response),
            ResponseFormat::Verbose => self.format_verbose(response),
        }
    }

    fn status_line(&self, response: &ResponseData, bold: bool) -> String {
        let status_line = format!("HTTP {} {}", response.status, response.status_text);
        if !self.color {
            return status_line;
        }
        let colored = if response.is_success_or_redirect() {
            status_line.green()
        } else if response.is_client_error() {
            status_line.yellow()
        } else {
            status_line.red()
        };
        if bold {
            colored.bold().to_string()
        } else {
            colored.to_string()
        }
    }

    fn timing_line(&self, response: &ResponseData) -> String {
        let timing = format!("Time: {}ms", response.duration);
        if self.color {
            timing.cyan().to_string()
        } else {
            timing
        }
    }

    fn format_compact(&self, response: &ResponseData) -> String {
        let mut output = vec![self.status_line(response, false)];
        if self.show_timing {
            output.push(self.timing_line(response));
        }

        if self.show_body {
            let body = Self::render_body(&response.data);
            if !body.is_empty() && body.len() < Self::COMPACT_BODY_LIMIT {
                output.push(body);
            } else if !body.is_empty() {
                output.push(format!("Body: {} bytes", body.len()));
            }
        }

        output.join("\n")
    }

    fn format_verbose(&self, response: &ResponseData) -> String {
        let mut output = vec![self.status_line(response, true)];
        if self.show_timing {
            output.push(self.timing_line(response));
        }

        if self.show_headers {
            output.push(String::new());
            output.push(self.heading("Headers:"));
            let mut headers: Vec<_> = response.headers.iter().collect();
            headers.sort();
            for (key, value) in headers {
                let line = format!("   {}: {}", key, value);
                if self.color {
                    output.push(line.blue().to_string());
                } else {
                    output.push(line);
                }
            }
        }

        if self.show_body {
            let body = Self::render_body(&response.data);
            if !body.is_empty() {
                output.push(String::new());
                output.push(self.heading("Body:"));
                output.push(body);
            }
        }

        output.join("\n")
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            text.blue().bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// 文本 body 原样输出，JSON body 美化输出
    fn render_body(data: &Value) -> String {
        match data {
            Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    fn response(status: u16, data: Value) -> ResponseData {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        ResponseData::new(status, "OK", headers, data, Duration::from_millis(35))
    }

    #[test]
    fn test_compact_format() {
        let formatter = ResponseFormatter::new(ResponseFormat::Compact).without_color();
        let output = formatter.format(&response(200, json!({"id": 1})));
        assert!(output.starts_with("HTTP 200 OK"));
        assert!(output.contains("Time: 35ms"));
        assert!(output.contains("\"id\": 1"));
    }

    #[test]
    fn test_compact_format_large_body() {
        let formatter = ResponseFormatter::new(ResponseFormat::Compact).without_color();
        let output = formatter.format(&response(200, Value::String("x".repeat(500))));
        assert!(output.contains("Body: 500 bytes"));
    }

    #[test]
    fn test_verbose_format() {
        let formatter = ResponseFormatter::new(ResponseFormat::Verbose).without_color();
        let output = formatter.format(&response(200, Value::String("hello".to_string())));
        assert!(output.contains("Headers:"));
        assert!(output.contains("content-type: application/json"));
        assert!(output.contains("Body:\nhello"));
    }
}
