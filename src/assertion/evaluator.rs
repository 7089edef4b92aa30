use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::assertion::extractor::extract_actual;
use crate::assertion::types::{TestAssertion, TestResult};
use crate::http::ResponseData;

/// 断言执行器
#[derive(Debug, Clone, Default)]
pub struct TestRunner;

impl TestRunner {
    /// 汇总结果的名称
    pub const RESULT_NAME: &'static str = "API Tests";

    pub fn new() -> Self {
        Self
    }

    /// 对响应执行一组断言
    ///
    /// 每次调用都重新求值，单条断言出错只影响它自己。
    pub fn run_tests(&self, assertions: &[TestAssertion], response: &ResponseData) -> TestResult {
        let start = Instant::now();

        let evaluated: Vec<TestAssertion> = assertions
            .iter()
            .map(|assertion| evaluate_assertion(assertion, response))
            .collect();
        let passed = evaluated.iter().all(|a| a.is_passed());

        TestResult {
            name: Self::RESULT_NAME.to_string(),
            passed,
            assertions: evaluated,
            duration: start.elapsed().as_millis() as u64,
        }
    }
}

/// 执行单条断言
pub fn evaluate_assertion(assertion: &TestAssertion, response: &ResponseData) -> TestAssertion {
    match extract_actual(response, &assertion.assertion) {
        Ok(actual) => {
            let passed = compare_values(actual.as_ref(), &assertion.expected);
            debug!(
                name = %assertion.name,
                passed,
                expected = %assertion.expected,
                actual = ?actual,
                "Test assertion"
            );
            assertion.evaluated(actual, passed)
        }
        Err(e) => {
            warn!(name = %assertion.name, "Test assertion failed with error: {}", e);
            assertion.evaluated(Some(Value::String(e.to_string())), false)
        }
    }
}

/// 比较实际值与期望值
///
/// - 实际值为 null/undefined 时，仅当期望值也为 null 时通过
/// - 期望值为数组：实际值必须是等长数组，逐个元素递归比较
/// - 期望值为对象：期望中的每个 key 在实际值中递归相等（子集匹配）
/// - 其余情况严格相等，数字按数值比较
pub fn compare_values(actual: Option<&Value>, expected: &Value) -> bool {
    let actual = match actual {
        None | Some(Value::Null) => return expected.is_null(),
        Some(value) => value,
    };

    match (expected, actual) {
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            expected_items.len() == actual_items.len()
                && expected_items
                    .iter()
                    .zip(actual_items)
                    .all(|(e, a)| compare_values(Some(a), e))
        }
        (Value::Array(_), _) => false,
        (Value::Object(expected_map), Value::Object(actual_map)) => expected_map
            .iter()
            .all(|(key, e)| compare_values(actual_map.get(key), e)),
        (Value::Object(_), _) => false,
        (Value::Number(e), Value::Number(a)) => match (e.as_f64(), a.as_f64()) {
            (Some(e), Some(a)) => e == a,
            _ => e == a,
        },
        (Value::String(e), Value::String(a)) => e == a,
        (Value::Bool(e), Value::Bool(a)) => e == a,
        _ => false,
    }
}
