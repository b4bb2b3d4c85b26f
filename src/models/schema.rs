//! 工作簿结构描述
//!
//! 历史上的表格布局各不相同（按位置取列 / 按表头取列、按 ID 引用 / 按分类等级引用、
//! 有无范围列、有无 other_questions 表）。这里把布局写成显式配置，
//! 在配置阶段选定一次，归一化逻辑只有一份。

use serde::{Deserialize, Serialize};

/// 列寻址方式
///
/// - `ByHeader`：第一行是表头，按列名（忽略大小写、去空白）定位，列名可以有多个别名
/// - `ByPosition`：固定的列偏移（从 0 开始），跳过开头的 `skip_rows` 行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "addressing", rename_all = "snake_case")]
pub enum ColumnAddressing<H, P> {
    ByHeader {
        columns: H,
    },
    ByPosition {
        #[serde(default = "default_skip_rows")]
        skip_rows: usize,
        columns: P,
    },
}

fn default_skip_rows() -> usize {
    1
}

/// 题目表的列角色；`C` 是列名别名列表或列偏移
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionColumns<C> {
    #[serde(default)]
    pub id: Option<C>,
    pub text: C,
    #[serde(default)]
    pub category: Option<C>,
    #[serde(default)]
    pub level: Option<C>,
    #[serde(default)]
    pub range_low: Option<C>,
    #[serde(default)]
    pub range_high: Option<C>,
    #[serde(default)]
    pub unit: Option<C>,
}

/// 测试表的列角色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestColumns<C> {
    pub test: C,
    pub reference: TestReferenceKind<C>,
}

/// 测试表引用题目的方式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum TestReferenceKind<C> {
    Id { id: C },
    CategoryLevel { category: C, level: C },
}

/// "play" 题目来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayPool {
    /// 所有未被任何测试引用的题目
    Derived,
    /// 单独的工作表（通常为 "other_questions"），使用题目表相同的列布局
    Sheet(String),
}

pub type HeaderNames = Vec<String>;

pub type QuestionLayout = ColumnAddressing<QuestionColumns<HeaderNames>, QuestionColumns<usize>>;
pub type TestLayout = ColumnAddressing<TestColumns<HeaderNames>, TestColumns<usize>>;

/// 工作簿结构描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    #[serde(default = "default_questions_sheet")]
    pub questions_sheet: String,
    #[serde(default = "default_tests_sheet")]
    pub tests_sheet: String,
    pub questions: QuestionLayout,
    pub tests: TestLayout,
    #[serde(default = "default_play_pool")]
    pub play_pool: PlayPool,
    /// 表格里用来标记"不要导入"的占位文本
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,
}

fn default_questions_sheet() -> String {
    "questions".to_string()
}

fn default_tests_sheet() -> String {
    "tests".to_string()
}

fn default_play_pool() -> PlayPool {
    PlayPool::Derived
}

fn default_placeholders() -> Vec<String> {
    vec!["Prueba".to_string()]
}

fn names(aliases: &[&str]) -> HeaderNames {
    aliases.iter().map(|s| s.to_string()).collect()
}

impl SchemaDescriptor {
    /// 旧版布局：题目表为 分类 / 等级 / 题干 三列，测试表按 (分类, 等级) 引用
    pub fn legacy() -> Self {
        Self {
            questions_sheet: default_questions_sheet(),
            tests_sheet: default_tests_sheet(),
            questions: ColumnAddressing::ByPosition {
                skip_rows: 1,
                columns: QuestionColumns {
                    id: None,
                    category: Some(0),
                    level: Some(1),
                    text: 2,
                    range_low: None,
                    range_high: None,
                    unit: None,
                },
            },
            tests: ColumnAddressing::ByPosition {
                skip_rows: 1,
                columns: TestColumns {
                    test: 0,
                    reference: TestReferenceKind::CategoryLevel {
                        category: 1,
                        level: 2,
                    },
                },
            },
            play_pool: PlayPool::Derived,
            placeholders: default_placeholders(),
        }
    }

    /// 当前布局：按表头取列，显式题目 ID，p05 / p95 范围列，测试表按 ID 引用
    pub fn current() -> Self {
        Self {
            questions_sheet: default_questions_sheet(),
            tests_sheet: default_tests_sheet(),
            questions: ColumnAddressing::ByHeader {
                columns: QuestionColumns {
                    id: Some(names(&["id_question", "id"])),
                    text: names(&["question", "text"]),
                    category: Some(names(&["category"])),
                    level: Some(names(&["level"])),
                    range_low: Some(names(&["p05", "range_low"])),
                    range_high: Some(names(&["p95", "range_high"])),
                    unit: Some(names(&["unit", "unidad"])),
                },
            },
            tests: ColumnAddressing::ByHeader {
                columns: TestColumns {
                    test: names(&["test", "test_id"]),
                    reference: TestReferenceKind::Id {
                        id: names(&["id_question", "id"]),
                    },
                },
            },
            play_pool: PlayPool::Derived,
            placeholders: default_placeholders(),
        }
    }

    /// 按名称选择预设布局
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "legacy" => Some(Self::legacy()),
            "current" => Some(Self::current()),
            _ => None,
        }
    }

    /// 单独的 play 工作表名（如果配置了）
    pub fn play_sheet(&self) -> Option<&str> {
        match &self.play_pool {
            PlayPool::Sheet(name) => Some(name.as_str()),
            PlayPool::Derived => None,
        }
    }

    pub fn with_play_pool(mut self, play_pool: PlayPool) -> Self {
        self.play_pool = play_pool;
        self
    }
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self::current()
    }
}
