use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::request::RequestTemplate;
use crate::Result;
use crate::error::RuflowError;
use crate::http::Method;
use crate::variable::capture::VariableExtraction;

/// 工作流：按顺序执行的步骤，步骤之间通过捕获变量传递数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 未在命令行指定环境时使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub name: String,

    pub request: RequestTemplate,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extract_variables: Vec<VariableExtraction>,

    #[serde(default)]
    pub continue_on_error: bool,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            environment: None,
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    /// 从 JSON 文件加载并校验，校验失败时不会执行任何步骤
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RuflowError::InvalidWorkflow(format!(
                "工作流文件不存在: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let workflow: Workflow = serde_json::from_str(content)
            .map_err(|e| RuflowError::InvalidWorkflow(e.to_string()))?;
        workflow.validate()?;
        Ok(workflow)
    }

    /// 必须包含 name 和至少一个步骤
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.steps.is_empty() {
            return Err(RuflowError::InvalidWorkflow(
                "必填字段: name, steps (非空数组)".to_string(),
            ));
        }
        Ok(())
    }

    /// 非空的默认环境名
    pub fn default_environment(&self) -> Option<&str> {
        self.environment.as_deref().filter(|env| !env.is_empty())
    }

    /// 两步示例：第一步捕获 `extractedId`，第二步在 body 中引用它
    pub fn template(name: &str) -> Self {
        let fetch = RequestTemplate::new(Method::Get, "https://api.example.com/data");

        let mut create = RequestTemplate::new(Method::Post, "https://api.example.com/items");
        create
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        create.body = Some(json!({
            "id": "{{extractedId}}",
            "name": "Item from workflow"
        }));

        Self {
            name: name.to_string(),
            description: Some("Workflow description".to_string()),
            environment: None,
            steps: vec![
                WorkflowStep::new("Step 1: Get data", fetch)
                    .with_extraction(VariableExtraction::new("extractedId", "id")),
                WorkflowStep::new("Step 2: Use extracted data", create),
            ],
        }
    }

    /// `My Flow` -> `my-flow.workflow.json`
    pub fn template_file_name(name: &str) -> String {
        let slug = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        format!("{}.workflow.json", slug)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl WorkflowStep {
    pub fn new(name: impl Into<String>, request: RequestTemplate) -> Self {
        Self {
            name: name.into(),
            request,
            extract_variables: Vec::new(),
            continue_on_error: false,
        }
    }

    pub fn with_extraction(mut self, extraction: VariableExtraction) -> Self {
        self.extract_variables.push(extraction);
        self
    }

    pub fn continue_on_error(mut self, value: bool) -> Self {
        self.continue_on_error = value;
        self
    }
}
