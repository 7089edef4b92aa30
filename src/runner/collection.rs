use std::time::Instant;

use tracing::{error, info};

use crate::model::{Collection, CollectionRequest};
use crate::runner::executor::RequestExecutor;
use crate::runner::types::{CollectionRunResult, RequestRunResult, ScopeInputs};
use crate::variable::types::Variables;

/// 按顺序执行集合中的所有请求
///
/// 单个请求失败不会中断运行。
#[derive(Clone)]
pub struct CollectionRunner {
    executor: RequestExecutor,
}

impl CollectionRunner {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    pub async fn run_collection(
        &self,
        collection: &Collection,
        environment_name: Option<&str>,
        global: Option<&Variables>,
    ) -> CollectionRunResult {
        let start = Instant::now();
        let total = collection.requests.len();
        info!(collection = %collection.name, requests = total, "Running collection");

        let mut results = Vec::with_capacity(total);
        let mut successful_requests = 0;
        let mut failed_requests = 0;

        for (index, request) in collection.requests.iter().enumerate() {
            info!(
                "[{}/{}] {} {}",
                index + 1,
                total,
                request.request.method,
                request.name
            );

            let result = self
                .run_request(request, collection, environment_name, global)
                .await;
            if result.success {
                successful_requests += 1;
            } else {
                failed_requests += 1;
            }
            results.push(result);
        }

        CollectionRunResult {
            collection_name: collection.name.clone(),
            total_requests: total,
            successful_requests,
            failed_requests,
            results,
            total_duration: start.elapsed(),
        }
    }

    async fn run_request(
        &self,
        request: &CollectionRequest,
        collection: &Collection,
        environment_name: Option<&str>,
        global: Option<&Variables>,
    ) -> RequestRunResult {
        let mut options = request.request.to_options();
        let mut scopes = ScopeInputs {
            global,
            ..ScopeInputs::default()
        };

        if let Some(settings) = collection.settings() {
            options.url = settings.join_url(&options.url);
            options.headers = settings.merge_headers(&request.request.headers);
            options.timeout = settings.timeout;
            options.auth = settings.auth.clone();
            scopes.collection = Some(&settings.variables);
        }

        match self
            .executor
            .execute_request(&options, environment_name, request.request.tests(), scopes)
            .await
        {
            Ok(outcome) => RequestRunResult::completed(request.clone(), outcome),
            Err(e) => {
                error!(request = %request.name, "Request execution failed: {}", e);
                RequestRunResult::failed(request.clone(), e.to_string())
            }
        }
    }
}
