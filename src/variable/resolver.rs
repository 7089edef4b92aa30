use crate::variable::types::{VariableScope, Variables};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// 多作用域变量解析器
///
/// 每次请求或每次 workflow 运行各自持有一个实例，不在运行之间共享。
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    scopes: HashMap<VariableScope, Variables>,
}

impl VariableResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换某个作用域的变量（不做合并）
    pub fn set_scope(&mut self, scope: VariableScope, variables: Variables) {
        self.scopes.insert(scope, variables);
    }

    pub fn clear_scope(&mut self, scope: VariableScope) {
        self.scopes.remove(&scope);
    }

    pub fn clear_all(&mut self) {
        self.scopes.clear();
    }

    pub fn scope_variables(&self, scope: VariableScope) -> Option<&Variables> {
        self.scopes.get(&scope)
    }

    /// 按优先级合并所有作用域：Global → Environment → Collection → Local，后者覆盖前者
    pub fn merged_variables(&self) -> Variables {
        let mut merged = Variables::new();
        for scope in VariableScope::ASCENDING {
            if let Some(vars) = self.scopes.get(&scope) {
                merged.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        merged
    }

    /// 获取变量值（遵循作用域优先级）
    pub fn get(&self, name: &str) -> Option<&str> {
        VariableScope::ASCENDING
            .iter()
            .rev()
            .find_map(|scope| self.scopes.get(scope).and_then(|vars| vars.get(name)))
            .map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 替换文本中的 {{variable}}，未定义的变量保持原样
    pub fn resolve(&self, text: &str) -> String {
        Self::substitute(text, &self.merged_variables())
    }

    /// 递归替换 JSON 值中的所有字符串，包括对象的 key
    pub fn resolve_value(&self, value: &Value) -> Value {
        Self::substitute_value(value, &self.merged_variables())
    }

    /// 替换文本中的所有 {{variable}} 占位符
    ///
    /// 只有缺失的变量保持原样，值为空字符串的变量同样会被替换。
    pub fn substitute(text: &str, variables: &Variables) -> String {
        static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = VAR_REGEX.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            let var_name = &caps[1];
            variables
                .get(var_name)
                .map(|s| s.as_str())
                .unwrap_or(&caps[0])
                .to_string()
        })
        .to_string()
    }

    fn substitute_value(value: &Value, variables: &Variables) -> Value {
        match value {
            Value::String(s) => Value::String(Self::substitute(s, variables)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Self::substitute_value(item, variables))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| {
                        (
                            Self::substitute(key, variables),
                            Self::substitute_value(item, variables),
                        )
                    })
                    .collect(),
            ),
            Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
        }
    }

    /// 解析并替换系统环境变量 ${VAR}
    pub fn resolve_env_vars(text: &str) -> String {
        static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

        re.replace_all(text, |caps: &Captures| {
            let env_name = &caps[1];
            std::env::var(env_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_precedence_local_wins() {
        let mut resolver = VariableResolver::new();
        resolver.set_scope(VariableScope::Global, vars(&[("name", "global"), ("g", "1")]));
        resolver.set_scope(VariableScope::Environment, vars(&[("name", "env"), ("e", "2")]));
        resolver.set_scope(VariableScope::Collection, vars(&[("name", "coll"), ("c", "3")]));
        resolver.set_scope(VariableScope::Local, vars(&[("name", "local")]));

        assert_eq!(resolver.resolve("{{name}}"), "local");
        assert_eq!(resolver.resolve("{{g}}-{{e}}-{{c}}"), "1-2-3");
        assert_eq!(resolver.get("name"), Some("local"));

        resolver.clear_scope(VariableScope::Local);
        assert_eq!(resolver.resolve("{{name}}"), "coll");

        resolver.clear_scope(VariableScope::Collection);
        assert_eq!(resolver.resolve("{{name}}"), "env");

        resolver.clear_scope(VariableScope::Environment);
        assert_eq!(resolver.resolve("{{name}}"), "global");
    }

    #[test]
    fn test_merged_variables() {
        let mut resolver = VariableResolver::new();
        resolver.set_scope(VariableScope::Local, vars(&[("a", "local")]));
        resolver.set_scope(VariableScope::Global, vars(&[("a", "global"), ("b", "global")]));

        let merged = resolver.merged_variables();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("a"), Some(&"local".to_string()));
        assert_eq!(merged.get("b"), Some(&"global".to_string()));
    }

    #[test]
    fn test_set_scope_replaces_whole_map() {
        let mut resolver = VariableResolver::new();
        resolver.set_scope(VariableScope::Global, vars(&[("a", "1"), ("b", "2")]));
        resolver.set_scope(VariableScope::Global, vars(&[("a", "3")]));

        assert_eq!(resolver.resolve("{{a}}{{b}}"), "3{{b}}");
        assert!(!resolver.contains("b"));
    }

    #[test]
    fn test_clear_all() {
        let mut resolver = VariableResolver::new();
        resolver.set_scope(VariableScope::Global, vars(&[("a", "1")]));
        resolver.set_scope(VariableScope::Local, vars(&[("b", "2")]));
        resolver.clear_all();

        assert!(resolver.merged_variables().is_empty());
        assert!(resolver.scope_variables(VariableScope::Local).is_none());
    }

    #[test]
    fn test_unknown_placeholder_left_verbatim() {
        let resolver = VariableResolver::new();
        assert_eq!(resolver.resolve("{{x}}"), "{{x}}");

        let once = resolver.resolve("{{missing}}/path");
        assert_eq!(once, "{{missing}}/path");
        assert_eq!(resolver.resolve(&once), once);
    }

    #[test]
    fn test_text_without_variables_is_unchanged() {
        let mut resolver = VariableResolver::new();
        resolver.set_scope(VariableScope::Global, vars(&[("a", "1")]));
        let text = "plain { text } with {single} braces";
        assert_eq!(resolver.resolve(text), text);
    }

    #[test]
    fn test_substitute_multiple() {
        let variables = vars(&[("host", "example.com"), ("port", "8080"), ("path", "api")]);
        let output = VariableResolver::substitute("https://{{host}}:{{port}}/{{path}}/users", &variables);
        assert_eq!(output, "https://example.com:8080/api/users");
    }

    #[test]
    fn test_defined_empty_value_replaces_placeholder() {
        // 已定义的空字符串与未定义不同：占位符被替换为空，而不是保留原样
        let variables = vars(&[("suffix", "")]);
        assert_eq!(VariableResolver::substitute("name{{suffix}}", &variables), "name");
        assert_eq!(VariableResolver::substitute("name{{other}}", &variables), "name{{other}}");
    }

    #[test]
    fn test_resolve_value_preserves_structure() {
        let mut resolver = VariableResolver::new();
        resolver.set_scope(
            VariableScope::Environment,
            vars(&[("id", "42"), ("field", "email"), ("domain", "example.com")]),
        );

        let body = json!({
            "user": {
                "id": "{{id}}",
                "{{field}}": "a@{{domain}}",
                "tags": ["{{id}}", 7, null, true, {"nested": "{{unknown}}"}]
            },
            "count": 3
        });

        let resolved = resolver.resolve_value(&body);
        assert_eq!(
            resolved,
            json!({
                "user": {
                    "id": "42",
                    "email": "a@example.com",
                    "tags": ["42", 7, null, true, {"nested": "{{unknown}}"}]
                },
                "count": 3
            })
        );
    }

    #[test]
    fn test_resolve_value_scalars() {
        let resolver = VariableResolver::new();
        assert_eq!(resolver.resolve_value(&json!(1.5)), json!(1.5));
        assert_eq!(resolver.resolve_value(&Value::Null), Value::Null);
        assert_eq!(resolver.resolve_value(&json!(false)), json!(false));
    }

    #[test]
    fn test_resolve_env_vars() {
        // 设置测试环境变量
        unsafe {
            std::env::set_var("RUFLOW_TEST_VAR", "test_value");
        }

        let output = VariableResolver::resolve_env_vars("Value: ${RUFLOW_TEST_VAR}");
        assert_eq!(output, "Value: test_value");

        // 清理
        unsafe {
            std::env::remove_var("RUFLOW_TEST_VAR");
        }
    }

    #[test]
    fn test_resolve_env_vars_missing() {
        let input = "Value: ${RUFLOW_NONEXISTENT_VAR}";
        let output = VariableResolver::resolve_env_vars(input);
        // 未找到的环境变量保持原样
        assert_eq!(output, "Value: ${RUFLOW_NONEXISTENT_VAR}");
    }
}
