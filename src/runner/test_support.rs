use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::history::HistorySink;
use crate::http::{HttpTransport, RequestOptions, ResponseData};
use crate::{Result, RuflowError};

/// 按顺序返回预设结果，并记录收到的请求
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ResponseData>>>,
    requests: Mutex<Vec<RequestOptions>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<ResponseData>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<RequestOptions> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, options: &RequestOptions) -> Result<ResponseData> {
        self.requests.lock().unwrap().push(options.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RuflowError::NoResponse("no scripted response".to_string())))
    }
}

pub(crate) fn response(status: u16, data: Value) -> ResponseData {
    ResponseData::new(status, "", HashMap::new(), data, Duration::from_millis(5))
}

pub(crate) fn ok_response(data: Value) -> ResponseData {
    ResponseData::new(200, "OK", HashMap::new(), data, Duration::from_millis(5))
}

#[derive(Default)]
pub(crate) struct RecordingHistory {
    entries: Mutex<Vec<(RequestOptions, ResponseData)>>,
}

impl RecordingHistory {
    pub(crate) fn entries(&self) -> Vec<(RequestOptions, ResponseData)> {
        self.entries.lock().unwrap().clone()
    }
}

impl HistorySink for RecordingHistory {
    fn record(&self, request: &RequestOptions, response: &ResponseData) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .push((request.clone(), response.clone()));
        Ok(())
    }
}

pub(crate) struct FailingHistory;

impl HistorySink for FailingHistory {
    fn record(&self, _request: &RequestOptions, _response: &ResponseData) -> Result<()> {
        Err(RuflowError::Other("disk full".to_string()))
    }
}
