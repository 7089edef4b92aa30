use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::Result;
use crate::assertion::{TestAssertion, TestRunner};
use crate::auth::apply_auth;
use crate::history::{HistorySink, NoHistory};
use crate::http::{HttpTransport, RequestOptions};
use crate::runner::types::{ExecutionOutcome, ScopeInputs};
use crate::variable::resolver::VariableResolver;
use crate::variable::types::{EnvironmentStore, VariableConfig, VariableScope};

/// 单个请求的执行编排：变量解析 → 发送 → 断言 → 历史记录
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    environments: Arc<dyn EnvironmentStore>,
    history: Arc<dyn HistorySink>,
    test_runner: TestRunner,
}

impl RequestExecutor {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        environments: Arc<dyn EnvironmentStore>,
        history: Arc<dyn HistorySink>,
    ) -> Self {
        Self {
            transport,
            environments,
            history,
            test_runner: TestRunner::new(),
        }
    }

    /// 不带环境、不记录历史的执行器
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            transport,
            Arc::new(VariableConfig::default()),
            Arc::new(NoHistory),
        )
    }

    /// 执行一个请求
    ///
    /// 传输层失败时返回 `Err`；任何状态码的响应都视为正常返回。
    /// 历史记录失败只会产生警告。
    pub async fn execute_request(
        &self,
        options: &RequestOptions,
        environment_name: Option<&str>,
        tests: Option<&[TestAssertion]>,
        scopes: ScopeInputs<'_>,
    ) -> Result<ExecutionOutcome> {
        debug!(method = %options.method, url = %options.url, "Starting request execution");

        let resolver = self.build_resolver(environment_name, scopes);
        let resolved = resolve_options(options, &resolver);

        debug!(url = %resolved.url, "Executing HTTP request");
        let response = self.transport.send(&resolved).await?;
        info!(
            status = response.status,
            duration_ms = response.duration,
            "Request completed"
        );

        let test_results = match tests {
            Some(tests) if !tests.is_empty() => {
                debug!(count = tests.len(), "Running test assertions");
                let result = self.test_runner.run_tests(tests, &response);
                info!(
                    passed = result.passed,
                    total = result.assertions.len(),
                    "Tests completed"
                );
                Some(result)
            }
            _ => None,
        };

        if let Err(e) = self.history.record(&resolved, &response) {
            warn!("Failed to log request to history: {}", e);
        }

        Ok(ExecutionOutcome {
            response,
            test_results,
        })
    }

    fn build_resolver(&self, environment_name: Option<&str>, scopes: ScopeInputs<'_>) -> VariableResolver {
        let mut resolver = VariableResolver::new();

        if let Some(global) = scopes.global {
            debug!(count = global.len(), "Global variables loaded");
            resolver.set_scope(VariableScope::Global, global.clone());
        }

        if let Some(name) = environment_name {
            match self.environments.get_by_name(name) {
                Some(environment) => {
                    debug!(
                        environment = %environment.name,
                        count = environment.variables.len(),
                        "Environment variables loaded"
                    );
                    resolver.set_scope(VariableScope::Environment, environment.variables);
                }
                None => warn!("Environment '{}' not found", name),
            }
        }

        if let Some(collection) = scopes.collection {
            debug!(count = collection.len(), "Collection variables loaded");
            resolver.set_scope(VariableScope::Collection, collection.clone());
        }

        if let Some(local) = scopes.local {
            debug!(count = local.len(), "Local variables loaded");
            resolver.set_scope(VariableScope::Local, local.clone());
        }

        resolver
    }
}

/// 解析请求中所有 `{{name}}` 占位符并应用认证
///
/// 凭据字段先单独解析再写入 Header/Query，凭据本身可以引用变量。
pub fn resolve_options(options: &RequestOptions, resolver: &VariableResolver) -> RequestOptions {
    let resolve_map = |map: &HashMap<String, String>| -> HashMap<String, String> {
        map.iter()
            .map(|(k, v)| (resolver.resolve(k), resolver.resolve(v)))
            .collect()
    };

    let mut headers = resolve_map(&options.headers);
    let mut params = resolve_map(&options.params);
    if let Some(auth) = &options.auth {
        let auth = auth.map_credentials(|value| resolver.resolve(value));
        apply_auth(&auth, &mut headers, &mut params);
    }

    RequestOptions {
        url: resolver.resolve(&options.url),
        headers,
        params,
        body: options.body.as_ref().map(|body| resolver.resolve_value(body)),
        auth: None,
        ..options.clone()
    }
}
