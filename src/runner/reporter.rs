use colored::{Color, Colorize};

use crate::assertion::TestResult;
use crate::http::ResponseData;
use crate::runner::types::{CollectionRunResult, ExecutionOutcome, WorkflowRunResult};
use crate::utils::{ResponseFormat, ResponseFormatter};

/// 捕获变量值的最大展示长度
const CAPTURED_PREVIEW_LEN: usize = 50;

/// 控制台报告输出
pub struct Reporter {
    verbose: bool,
    color: bool,
    formatter: ResponseFormatter,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        let format = if verbose {
            ResponseFormat::Verbose
        } else {
            ResponseFormat::Compact
        };

        Self {
            verbose,
            color: true,
            formatter: ResponseFormatter::new(format),
        }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self.formatter = self.formatter.without_color();
        self
    }

    fn paint(&self, text: impl AsRef<str>, color: Color) -> String {
        if self.color {
            text.as_ref().color(color).to_string()
        } else {
            text.as_ref().to_string()
        }
    }

    fn bold(&self, text: impl AsRef<str>) -> String {
        if self.color {
            text.as_ref().bold().to_string()
        } else {
            text.as_ref().to_string()
        }
    }

    fn status_summary(&self, response: &ResponseData) -> String {
        format!(
            "{} {} ({}ms)",
            response.status, response.status_text, response.duration
        )
    }

    fn tests_lines(&self, tests: &TestResult, out: &mut Vec<String>) {
        let line = format!(
            "Tests: {}/{} passed",
            tests.passed_count(),
            tests.assertions.len()
        );
        if tests.passed {
            out.push(format!("  {} {}", self.paint("✓", Color::Green), line));
            return;
        }

        out.push(self.paint(format!("  ✗ {}", line), Color::Red));
        for assertion in tests.failed_assertions() {
            let actual = assertion
                .actual
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "undefined".to_string());
            out.push(self.paint(
                format!(
                    "    ✗ {} ({}: expected {}, got {})",
                    assertion.name, assertion.assertion, assertion.expected, actual
                ),
                Color::Red,
            ));
        }
    }

    fn response_lines(&self, response: &ResponseData, out: &mut Vec<String>) {
        for line in self.formatter.format(response).lines() {
            out.push(format!("    {}", line));
        }
    }

    /// 单个请求的输出（`ruflow request`）
    pub fn request_report(&self, outcome: &ExecutionOutcome) -> String {
        let mut out = vec![self.formatter.format(&outcome.response)];
        if let Some(tests) = &outcome.test_results {
            self.tests_lines(tests, &mut out);
        }
        out.join("\n")
    }

    pub fn collection_report(&self, result: &CollectionRunResult) -> String {
        let mut out = vec![
            String::new(),
            format!(
                "{} {}",
                self.bold("▶ Running Collection:"),
                self.paint(&result.collection_name, Color::Cyan)
            ),
            self.paint(format!("  Requests: {}", result.total_requests), Color::BrightBlack),
            String::new(),
        ];

        for (index, item) in result.results.iter().enumerate() {
            out.push(format!(
                "{} {}",
                self.paint(format!("[{}/{}]", index + 1, result.total_requests), Color::BrightBlack),
                self.paint(
                    format!("{} {}", item.request.request.method, item.request.name),
                    Color::Cyan
                )
            ));

            match (&item.response, &item.error) {
                (_, Some(error)) => out.push(self.paint(format!("  ✗ Error: {}", error), Color::Red)),
                (Some(response), None) => {
                    let color = if item.success { Color::Green } else { Color::Red };
                    let symbol = if item.success { "✓" } else { "✗" };
                    out.push(self.paint(
                        format!("  {} {}", symbol, self.status_summary(response)),
                        color,
                    ));
                    if self.verbose || !item.success {
                        self.response_lines(response, &mut out);
                    }
                }
                (None, None) => out.push(self.paint("  ✗ Request failed", Color::Red)),
            }

            if let Some(tests) = &item.test_results {
                self.tests_lines(tests, &mut out);
            }
            out.push(String::new());
        }

        let rule = "═".repeat(60);
        out.push(self.bold(&rule));
        out.push(self.bold("Collection Run Summary:"));
        out.push(format!("  Collection: {}", result.collection_name));
        out.push(format!("  Total Requests: {}", result.total_requests));
        out.push(self.paint(
            format!("  Successful: {}", result.successful_requests),
            Color::Green,
        ));
        if result.failed_requests > 0 {
            out.push(self.paint(format!("  Failed: {}", result.failed_requests), Color::Red));
        }
        let (passed, total) = result.assertion_counts();
        if total > 0 {
            out.push(format!("  Assertions: {}/{} passed", passed, total));
        }
        out.push(format!(
            "  Total Duration: {}ms",
            result.total_duration.as_millis()
        ));
        out.push(self.bold(&rule));

        out.join("\n")
    }

    pub fn workflow_report(&self, result: &WorkflowRunResult) -> String {
        let mut out = vec![
            String::new(),
            format!(
                "{} {}",
                self.bold("▶ Running Workflow:"),
                self.paint(&result.workflow_name, Color::Cyan)
            ),
            self.paint(format!("  Steps: {}", result.total_steps), Color::BrightBlack),
            String::new(),
        ];

        for (index, item) in result.steps.iter().enumerate() {
            out.push(format!(
                "{} {}",
                self.paint(format!("[{}/{}]", index + 1, result.total_steps), Color::BrightBlack),
                self.paint(&item.step.name, Color::Cyan)
            ));

            match (&item.response, &item.error) {
                (_, Some(error)) => out.push(self.paint(format!("  ✗ Error: {}", error), Color::Red)),
                (Some(response), None) if item.success => {
                    out.push(self.paint(
                        format!("  ✓ {}", self.status_summary(response)),
                        Color::Green,
                    ));
                    if self.verbose {
                        self.response_lines(response, &mut out);
                    }
                }
                (Some(response), None) => {
                    out.push(self.paint(
                        format!("  ✗ {}", self.status_summary(response)),
                        Color::Red,
                    ));
                    self.response_lines(response, &mut out);
                }
                (None, None) => out.push(self.paint("  ✗ Step failed", Color::Red)),
            }

            if let Some(tests) = &item.test_results {
                self.tests_lines(tests, &mut out);
            }

            if !item.captured_variables.is_empty() {
                out.push(self.paint(
                    format!("  Captured {} variable(s)", item.captured_variables.len()),
                    Color::Yellow,
                ));
                let mut names: Vec<_> = item.captured_variables.keys().collect();
                names.sort();
                for name in names {
                    let value = &item.captured_variables[name];
                    out.push(self.paint(
                        format!("     {}: {}", name, preview(value)),
                        Color::BrightBlack,
                    ));
                }
            }
            out.push(String::new());
        }

        if result.stopped_early() {
            out.push(self.paint("  ⚠ Workflow stopped due to error", Color::Yellow));
            out.push(String::new());
        }

        let rule = "═".repeat(70);
        out.push(self.bold(&rule));
        out.push(self.bold("Workflow Summary:"));
        out.push(format!("  Workflow: {}", result.workflow_name));
        out.push(format!("  Total Steps: {}", result.total_steps));
        out.push(self.paint(format!("  Completed: {}", result.completed_steps), Color::Green));
        if result.failed_steps > 0 {
            out.push(self.paint(format!("  Failed: {}", result.failed_steps), Color::Red));
        }
        out.push(format!(
            "  Total Duration: {}ms",
            result.total_duration.as_millis()
        ));
        let status = if result.success {
            self.paint("✓ SUCCESS", Color::Green)
        } else {
            self.paint("✗ FAILED", Color::Red)
        };
        out.push(format!("  {} {}", self.bold("Status:"), status));
        out.push(self.bold(&rule));

        out.join("\n")
    }

    pub fn print_request(&self, outcome: &ExecutionOutcome) {
        println!("{}", self.request_report(outcome));
    }

    pub fn print_collection(&self, result: &CollectionRunResult) {
        println!("{}", self.collection_report(result));
    }

    pub fn print_workflow(&self, result: &WorkflowRunResult) {
        println!("{}", self.workflow_report(result));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false)
    }
}

fn preview(value: &str) -> String {
    if value.chars().count() > CAPTURED_PREVIEW_LEN {
        let cut: String = value.chars().take(CAPTURED_PREVIEW_LEN).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}
