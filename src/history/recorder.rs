use tracing::debug;

use super::model::HistoryEntry;
use super::storage::HistoryStorage;
use crate::Result;
use crate::http::{RequestOptions, ResponseData};

/// 请求历史的记录端
///
/// 执行器只做 best-effort 调用，返回的错误会被记录为警告后忽略。
pub trait HistorySink: Send + Sync {
    fn record(&self, request: &RequestOptions, response: &ResponseData) -> Result<()>;
}

impl HistorySink for HistoryStorage {
    fn record(&self, request: &RequestOptions, response: &ResponseData) -> Result<()> {
        let entry = HistoryEntry::new(request, response);
        debug!(id = %entry.id, url = %entry.request.url, "Recording history entry");
        self.append(&entry)
    }
}

/// 不记录任何历史（`--no-history`）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistorySink for NoHistory {
    fn record(&self, _request: &RequestOptions, _response: &ResponseData) -> Result<()> {
        Ok(())
    }
}
