use std::fmt;

use thiserror::Error;

use crate::models::{Key, QuestionRef};

/// 题库加载错误类型
///
/// 需要 `Clone`：同一次加载的结果会分发给所有并发等待者。
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BankError {
    /// 无法获取工作簿（文件 / 网络），可重试
    #[error("工作簿不可用 ({location}): {reason}")]
    SourceUnavailable { location: String, reason: String },

    /// 缺少必需的工作表或列，或字节内容不是可读的工作簿
    #[error("工作簿结构错误: {detail}")]
    MalformedSchema { detail: String },

    /// 抽题时没有可选题目
    #[error("题库为空: 没有可抽取的{pool}")]
    EmptyBank { pool: &'static str },
}

impl BankError {
    /// 创建工作簿获取失败错误
    pub fn source_unavailable(location: impl Into<String>, source: &anyhow::Error) -> Self {
        BankError::SourceUnavailable {
            location: location.into(),
            reason: format!("{:#}", source),
        }
    }

    /// 缺少工作表
    pub fn missing_sheet(sheet: &str) -> Self {
        BankError::MalformedSchema {
            detail: format!("缺少工作表 '{}'", sheet),
        }
    }

    /// 表头缺少必需列
    pub fn missing_column(sheet: &str, column: &str) -> Self {
        BankError::MalformedSchema {
            detail: format!("工作表 '{}' 缺少列 '{}'", sheet, column),
        }
    }
}

/// 非致命的诊断信息
///
/// 按行 / 按引用的问题不会中断批量操作，只会记录下来交给调用方。
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// 请求的测试不存在
    TestNotFound { test_id: Key },
    /// 测试中的某个引用找不到对应题目
    QuestionNotFound { test_id: Key, reference: QuestionRef },
    /// 工作表中的某行被跳过（行号从 1 开始，与表格一致）
    RowSkipped {
        sheet: String,
        row: usize,
        reason: String,
    },
    /// 重复的题目 ID，后出现的行覆盖先出现的行
    DuplicateQuestionId { id: Key, row: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TestNotFound { test_id } => write!(f, "测试 {} 未找到", test_id),
            Diagnostic::QuestionNotFound { test_id, reference } => {
                write!(f, "测试 {} 中的题目未找到: {}", test_id, reference)
            }
            Diagnostic::RowSkipped { sheet, row, reason } => {
                write!(f, "跳过 {} 第 {} 行: {}", sheet, row, reason)
            }
            Diagnostic::DuplicateQuestionId { id, row } => {
                write!(f, "题目 ID {} 重复 (第 {} 行覆盖之前的定义)", id, row)
            }
        }
    }
}

/// 题库操作结果类型
pub type BankResult<T> = Result<T, BankError>;
