/// 断言模块 - 提供 API 响应断言能力
mod evaluator;
mod extractor;
mod types;

pub use evaluator::{TestRunner, compare_values, evaluate_assertion};
pub use extractor::{extract_actual, extract_value};
pub use types::{AssertError, TestAssertion, TestResult, ValuePath};
