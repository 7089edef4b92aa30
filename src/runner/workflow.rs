use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::http::ResponseData;
use crate::model::{Workflow, WorkflowStep};
use crate::runner::executor::RequestExecutor;
use crate::runner::types::{ScopeInputs, StepRunResult, WorkflowRunResult};
use crate::utils::json_path::{extract_json_path, value_to_string};
use crate::variable::types::Variables;

/// 顺序执行工作流步骤，并在步骤之间传递捕获的变量
#[derive(Clone)]
pub struct WorkflowEngine {
    executor: RequestExecutor,
}

impl WorkflowEngine {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// 执行工作流
    ///
    /// 每次运行都从空的 workflow 作用域开始；某一步失败且
    /// `continueOnError` 为 false 时停止，后续步骤不会出现在结果中。
    pub async fn execute_workflow(
        &self,
        workflow: &Workflow,
        environment_name: Option<&str>,
        global: Option<&Variables>,
    ) -> WorkflowRunResult {
        let start = Instant::now();
        let total = workflow.steps.len();
        let environment = environment_name.or_else(|| workflow.default_environment());
        info!(workflow = %workflow.name, steps = total, "Running workflow");

        let mut captured = Variables::new();
        let mut steps = Vec::with_capacity(total);
        let mut completed_steps = 0;
        let mut failed_steps = 0;

        for (index, step) in workflow.steps.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, total, step.name);

            let result = self
                .execute_step(step, environment, global, &mut captured)
                .await;
            let success = result.success;
            steps.push(result);

            if success {
                completed_steps += 1;
            } else {
                failed_steps += 1;
                if !step.continue_on_error {
                    warn!(step = %step.name, "Workflow stopped due to error");
                    break;
                }
            }
        }

        WorkflowRunResult {
            workflow_name: workflow.name.clone(),
            total_steps: total,
            completed_steps,
            failed_steps,
            steps,
            total_duration: start.elapsed(),
            success: failed_steps == 0,
            variables: captured,
        }
    }

    async fn execute_step(
        &self,
        step: &WorkflowStep,
        environment: Option<&str>,
        global: Option<&Variables>,
        captured: &mut Variables,
    ) -> StepRunResult {
        let options = step.request.to_options();
        let local = captured.clone();
        let scopes = ScopeInputs {
            global,
            collection: None,
            local: Some(&local),
        };

        let outcome = match self
            .executor
            .execute_request(&options, environment, step.request.tests(), scopes)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(step = %step.name, "Step execution failed: {}", e);
                return StepRunResult::failed(step.clone(), e.to_string());
            }
        };

        let captured_variables = capture_variables(step, &outcome.response, captured);
        let success = outcome.is_success();

        StepRunResult {
            step: step.clone(),
            response: Some(outcome.response),
            test_results: outcome.test_results,
            error: None,
            success,
            captured_variables,
        }
    }
}

/// 按步骤的提取配置从响应 body 中捕获变量
///
/// 只有 workflow 作用域的变量会写入 `store`，但所有找到的值都会返回。
fn capture_variables(step: &WorkflowStep, response: &ResponseData, store: &mut Variables) -> Variables {
    let mut found = Variables::new();

    for extraction in &step.extract_variables {
        match extract_json_path(&response.data, &extraction.path) {
            Some(value) => {
                let value = value_to_string(value);
                debug!(name = %extraction.name, scope = %extraction.scope, "Captured variable");
                if extraction.is_stored() {
                    store.insert(extraction.name.clone(), value.clone());
                }
                found.insert(extraction.name.clone(), value);
            }
            None => warn!(
                "Failed to extract variable '{}' from path '{}'",
                extraction.name, extraction.path
            ),
        }
    }

    found
}
