use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// 变量表：变量名 → 字符串值
pub type Variables = HashMap<String, String>;

/// 变量作用域
///
/// 优先级：Local > Collection > Environment > Global（Local 最高）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariableScope {
    Global,
    Environment,
    Collection,
    Local,
}

impl VariableScope {
    /// 按优先级升序排列，后者覆盖前者
    pub const ASCENDING: [VariableScope; 4] = [
        VariableScope::Global,
        VariableScope::Environment,
        VariableScope::Collection,
        VariableScope::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableScope::Global => "global",
            VariableScope::Environment => "environment",
            VariableScope::Collection => "collection",
            VariableScope::Local => "local",
        }
    }
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 环境配置
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Environment {
    /// 环境名称（来自配置文件中的表名）
    #[serde(skip)]
    pub name: String,

    /// 变量映射
    #[serde(flatten)]
    pub variables: Variables,
}

impl Environment {
    pub fn new(name: impl Into<String>, variables: Variables) -> Self {
        Self {
            name: name.into(),
            variables,
        }
    }
}

/// 按名称查找环境
///
/// 找不到时返回 `None`，由调用方决定如何处理。
pub trait EnvironmentStore: Send + Sync {
    fn get_by_name(&self, name: &str) -> Option<Environment>;
}

/// 完整的变量配置文件
#[derive(Debug, Clone, Deserialize, Default)]
pub struct VariableConfig {
    /// 全局变量
    #[serde(default)]
    pub globals: Variables,

    /// 所有环境配置
    #[serde(default)]
    pub environments: HashMap<String, Environment>,
}

impl VariableConfig {
    /// 获取指定环境的变量
    pub fn get_environment(&self, env_name: &str) -> Option<&Environment> {
        self.environments.get(env_name)
    }

    /// 添加或替换一个环境
    pub fn insert_environment(&mut self, environment: Environment) {
        self.environments
            .insert(environment.name.clone(), environment);
    }

    /// 为反序列化得到的环境补齐名称
    pub(crate) fn assign_names(&mut self) {
        for (name, env) in self.environments.iter_mut() {
            env.name = name.clone();
        }
    }
}

impl EnvironmentStore for VariableConfig {
    fn get_by_name(&self, name: &str) -> Option<Environment> {
        self.get_environment(name).cloned()
    }
}
