use std::collections::HashMap;
use std::time::Duration;

use crate::assertion::TestResult;
use crate::http::ResponseData;
use crate::model::{CollectionRequest, WorkflowStep};
use crate::variable::types::Variables;

/// 单次请求执行的输出
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub response: ResponseData,

    /// 只有提供了断言时才有值
    pub test_results: Option<TestResult>,
}

impl ExecutionOutcome {
    /// 状态码在 [200, 400) 且断言全部通过（或没有断言）
    pub fn is_success(&self) -> bool {
        self.response.is_success_or_redirect()
            && self.test_results.as_ref().is_none_or(|t| t.passed)
    }
}

/// 执行请求时可选的各层变量输入
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeInputs<'a> {
    pub global: Option<&'a Variables>,
    pub collection: Option<&'a Variables>,
    pub local: Option<&'a Variables>,
}

impl<'a> ScopeInputs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(mut self, variables: &'a Variables) -> Self {
        self.global = Some(variables);
        self
    }

    pub fn collection(mut self, variables: &'a Variables) -> Self {
        self.collection = Some(variables);
        self
    }

    pub fn local(mut self, variables: &'a Variables) -> Self {
        self.local = Some(variables);
        self
    }
}

/// 集合中单个请求的结果
#[derive(Debug, Clone)]
pub struct RequestRunResult {
    pub request: CollectionRequest,
    pub response: Option<ResponseData>,
    pub test_results: Option<TestResult>,
    pub error: Option<String>,
    pub success: bool,
}

impl RequestRunResult {
    pub fn completed(request: CollectionRequest, outcome: ExecutionOutcome) -> Self {
        let success = outcome.is_success();
        Self {
            request,
            response: Some(outcome.response),
            test_results: outcome.test_results,
            error: None,
            success,
        }
    }

    pub fn failed(request: CollectionRequest, error: impl Into<String>) -> Self {
        Self {
            request,
            response: None,
            test_results: None,
            error: Some(error.into()),
            success: false,
        }
    }
}

/// 集合运行汇总
#[derive(Debug, Clone)]
pub struct CollectionRunResult {
    pub collection_name: String,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub results: Vec<RequestRunResult>,
    pub total_duration: Duration,
}

impl CollectionRunResult {
    pub fn success(&self) -> bool {
        self.failed_requests == 0
    }

    /// 所有请求的断言统计 (passed, total)
    pub fn assertion_counts(&self) -> (usize, usize) {
        count_assertions(self.results.iter().filter_map(|r| r.test_results.as_ref()))
    }
}

/// 工作流单步结果
#[derive(Debug, Clone)]
pub struct StepRunResult {
    pub step: WorkflowStep,
    pub response: Option<ResponseData>,
    pub test_results: Option<TestResult>,
    pub error: Option<String>,
    pub success: bool,

    /// 本步提取到的所有变量（包括未写入 workflow 作用域的）
    pub captured_variables: Variables,
}

impl StepRunResult {
    pub fn failed(step: WorkflowStep, error: impl Into<String>) -> Self {
        Self {
            step,
            response: None,
            test_results: None,
            error: Some(error.into()),
            success: false,
            captured_variables: HashMap::new(),
        }
    }
}

/// 工作流运行汇总
#[derive(Debug, Clone)]
pub struct WorkflowRunResult {
    pub workflow_name: String,
    pub total_steps: usize,
    pub completed_steps: usize,
    pub failed_steps: usize,

    /// 未执行的步骤不会出现在这里
    pub steps: Vec<StepRunResult>,
    pub total_duration: Duration,
    pub success: bool,

    /// 运行结束时 workflow 作用域中的变量
    pub variables: Variables,
}

impl WorkflowRunResult {
    /// 是否因失败提前停止
    pub fn stopped_early(&self) -> bool {
        self.steps.len() < self.total_steps
    }

    pub fn assertion_counts(&self) -> (usize, usize) {
        count_assertions(self.steps.iter().filter_map(|s| s.test_results.as_ref()))
    }
}

fn count_assertions<'a>(results: impl Iterator<Item = &'a TestResult>) -> (usize, usize) {
    results.fold((0, 0), |(passed, total), r| {
        (passed + r.passed_count(), total + r.assertions.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::TestAssertion;
    use crate::http::Method;
    use crate::model::RequestTemplate;
    use serde_json::{Value, json};

    fn response(status: u16) -> ResponseData {
        ResponseData::new(status, "", HashMap::new(), Value::Null, Duration::ZERO)
    }

    fn test_result(passed: bool) -> TestResult {
        let assertion = TestAssertion::new("status", "status", json!(200));
        TestResult {
            name: "API Tests".to_string(),
            passed,
            assertions: vec![assertion.evaluated(Some(json!(200)), passed)],
            duration: 0,
        }
    }

    #[test]
    fn test_outcome_success_rules() {
        let ok = |status, tests| ExecutionOutcome {
            response: response(status),
            test_results: tests,
        };

        assert!(ok(200, None).is_success());
        assert!(ok(302, None).is_success());
        assert!(!ok(404, None).is_success());
        assert!(!ok(199, None).is_success());
        assert!(ok(201, Some(test_result(true))).is_success());
        assert!(!ok(201, Some(test_result(false))).is_success());
    }

    #[test]
    fn test_collection_result_counts() {
        let request = CollectionRequest {
            id: None,
            name: "r".to_string(),
            request: RequestTemplate::new(Method::Get, "/"),
        };
        let result = CollectionRunResult {
            collection_name: "c".to_string(),
            total_requests: 2,
            successful_requests: 1,
            failed_requests: 1,
            results: vec![
                RequestRunResult::completed(
                    request.clone(),
                    ExecutionOutcome {
                        response: response(200),
                        test_results: Some(test_result(true)),
                    },
                ),
                RequestRunResult::failed(request, "boom"),
            ],
            total_duration: Duration::ZERO,
        };

        assert!(!result.success());
        assert_eq!(result.assertion_counts(), (1, 1));
        assert_eq!(result.results[1].error.as_deref(), Some("boom"));
    }
}
