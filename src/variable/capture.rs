use serde::{Deserialize, Serialize};
use std::fmt;

/// 变量捕获的目标作用域
///
/// 目前只有 `Workflow` 会被写入存储，其余作用域可以声明但会被忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionScope {
    #[default]
    Workflow,
    Environment,
    Global,
}

impl fmt::Display for ExtractionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractionScope::Workflow => "workflow",
            ExtractionScope::Environment => "environment",
            ExtractionScope::Global => "global",
        };
        f.write_str(s)
    }
}

/// 变量捕获配置：从响应 body 中按 JSON 路径提取值
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableExtraction {
    /// 变量名称
    pub name: String,

    /// 响应 body 中的 JSON 路径
    /// 示例: token, user.id, items[0].id
    pub path: String,

    #[serde(default)]
    pub scope: ExtractionScope,
}

impl VariableExtraction {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            scope: ExtractionScope::Workflow,
        }
    }

    pub fn with_scope(mut self, scope: ExtractionScope) -> Self {
        self.scope = scope;
        self
    }

    /// 是否写入 workflow 作用域
    pub fn is_stored(&self) -> bool {
        self.scope == ExtractionScope::Workflow
    }
}
