//! 测试组卷服务
//!
//! 把测试 ID 解析为按定义顺序排列的题目列表。
//! 找不到测试或题目都不是致命错误，只产生诊断信息。

use tracing::warn;

use crate::error::Diagnostic;
use crate::models::{Question, QuestionBank, TestId};

/// 组卷结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestAssembly {
    /// 按测试表的行顺序排列；无法解析的引用被省略
    pub questions: Vec<Question>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TestAssembly {
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// 组装测试题目
pub fn assemble_test(bank: &QuestionBank, test_id: &TestId) -> TestAssembly {
    let references = match bank.test(test_id) {
        Some(references) => references,
        None => {
            warn!("测试 {} 未找到", test_id);
            return TestAssembly {
                questions: Vec::new(),
                diagnostics: vec![Diagnostic::TestNotFound {
                    test_id: test_id.clone(),
                }],
            };
        }
    };

    let mut assembly = TestAssembly {
        questions: Vec::with_capacity(references.len()),
        diagnostics: Vec::new(),
    };

    for reference in references {
        match bank.resolve(reference) {
            Some(question) => assembly.questions.push(question.clone()),
            None => {
                warn!("测试 {} 中的题目未找到: {}", test_id, reference);
                assembly.diagnostics.push(Diagnostic::QuestionNotFound {
                    test_id: test_id.clone(),
                    reference: reference.clone(),
                });
            }
        }
    }

    assembly
}
