/// 答题记录存储
///
/// 后端持久化层的窄接口：保存在线答卷、记录下载。
/// 题库加载本身从不调用它，由外层应用注入使用。
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// 一份在线答卷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineResponse {
    pub age: Option<u32>,
    pub sex: Option<String>,
    /// 受试者更熟悉 π 还是 e
    pub pi_vs_e: Option<String>,
    /// 是否第二次作答
    pub second_attempt: bool,
    /// 试卷型号（测试 ID）
    pub model: String,
    /// 按题目顺序的答案，未作答为 `None`
    pub answers: Vec<Option<f64>>,
    /// 每题用时（秒）
    pub times: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// 一次 PDF 下载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub teacher_id: String,
    pub file: String,
}

/// 持久化接口
pub trait ResponseStore: Send + Sync {
    fn save_online_response(&self, response: OnlineResponse) -> BoxFuture<'_, Result<()>>;

    fn record_download(&self, record: DownloadRecord) -> BoxFuture<'_, Result<()>>;
}

/// 内存实现（离线运行和测试）
#[derive(Debug, Default)]
pub struct MemoryResponseStore {
    responses: Mutex<Vec<OnlineResponse>>,
    downloads: Mutex<Vec<DownloadRecord>>,
}

impl MemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responses(&self) -> Vec<OnlineResponse> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn downloads(&self) -> Vec<DownloadRecord> {
        self.downloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResponseStore for MemoryResponseStore {
    fn save_online_response(&self, response: OnlineResponse) -> BoxFuture<'_, Result<()>> {
        async move {
            debug!("保存在线答卷: 型号 {}, {} 个答案", response.model, response.answers.len());
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(response);
            Ok(())
        }
        .boxed()
    }

    fn record_download(&self, record: DownloadRecord) -> BoxFuture<'_, Result<()>> {
        async move {
            debug!("记录下载: {} -> {}", record.teacher_id, record.file);
            self.downloads
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(record);
            Ok(())
        }
        .boxed()
    }
}
