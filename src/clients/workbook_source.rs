/// 工作簿来源
///
/// 只负责"取得字节"，不关心内容。本地文件和 HTTP 两种实现。
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::PathBuf;
use tracing::debug;

/// 可以获取工作簿字节的资源
pub trait WorkbookSource: Send + Sync {
    /// 用于日志和错误信息的位置描述
    fn location(&self) -> String;

    /// 获取工作簿的完整字节
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>>>;
}

/// 本地文件
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WorkbookSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>>> {
        async move {
            debug!("读取工作簿文件: {}", self.path.display());
            tokio::fs::read(&self.path)
                .await
                .with_context(|| format!("无法读取工作簿文件: {}", self.path.display()))
        }
        .boxed()
    }
}

/// HTTP(S) 地址
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl WorkbookSource for HttpSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>>> {
        async move {
            debug!("下载工作簿: {}", self.url);
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .with_context(|| format!("无法下载工作簿: {}", self.url))?
                .error_for_status()
                .with_context(|| format!("工作簿请求失败: {}", self.url))?;

            let bytes = response
                .bytes()
                .await
                .with_context(|| format!("读取工作簿响应失败: {}", self.url))?;

            Ok(bytes.to_vec())
        }
        .boxed()
    }
}

/// 内存中的工作簿（嵌入到程序中的文件或测试数据）
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl WorkbookSource for MemorySource {
    fn location(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>>> {
        let bytes = self.bytes.clone();
        async move { Ok(bytes) }.boxed()
    }
}

/// 按位置字符串选择来源：http(s) 地址走网络，其余视为本地路径
pub fn source_for(location: &str) -> Box<dyn WorkbookSource> {
    let trimmed = location.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Box::new(HttpSource::new(trimmed))
    } else {
        Box::new(FileSource::new(trimmed))
    }
}
