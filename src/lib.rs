//! # Fermi Bank
//!
//! 数量级估算（Fermi）测试的题库加载器
//!
//! ## 架构设计
//!
//! ### ① 来源层（Clients）
//! - `clients/` - 只负责取得工作簿字节（本地文件 / HTTP / 内存）
//! - `ResponseStore` - 答卷持久化的窄接口，由外层应用注入
//!
//! ### ② 模型层（Models）
//! - `models/` - `Question`、测试引用、不可变的 `QuestionBank`
//! - `SchemaDescriptor` - 显式的表格布局配置
//! - `loaders/` - 字节 → 工作表单元格
//!
//! ### ③ 业务能力层（Services）
//! - `row_normalizer` - 按布局把原始行转换为题目和测试
//! - `bank_cache` - single-flight 的进程级缓存
//! - `test_assembler` - 按测试定义顺序组卷
//! - `sampler` - 均匀随机抽题
//! - `QuestionBankService` - 对外的全部读取操作
//!
//! ## 数据流
//!
//! ```text
//! WorkbookSource → read_workbook → row_normalizer → QuestionBankCache
//!     → { test_assembler, sampler } → 调用方
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// 重新导出常用类型
pub use clients::{FileSource, HttpSource, MemorySource, ResponseStore, WorkbookSource};
pub use config::Config;
pub use error::{BankError, BankResult, Diagnostic};
pub use models::{Key, Question, QuestionBank, QuestionRef, SchemaDescriptor, TestId};
pub use services::{QuestionBankCache, QuestionBankService, TestAssembly};
