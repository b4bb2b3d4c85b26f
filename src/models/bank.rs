use std::collections::{HashMap, HashSet};

use crate::models::{Question, QuestionId, QuestionRef, TestId};

/// 已加载的题库
///
/// 加载完成后不可变，通过 `Arc` 在所有读取方之间共享。
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionBank {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
    tests: HashMap<TestId, Vec<QuestionRef>>,
    play_questions: Vec<Question>,
}

/// 题库统计，用于加载日志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankSummary {
    pub questions: usize,
    pub tests: usize,
    pub references: usize,
    pub play_questions: usize,
}

impl QuestionBank {
    /// 由归一化结果构建题库
    ///
    /// `explicit_play` 为 `None` 时，play 题目 = 所有未被任何测试引用的题目。
    pub fn new(
        questions: Vec<Question>,
        tests: HashMap<TestId, Vec<QuestionRef>>,
        explicit_play: Option<Vec<Question>>,
    ) -> Self {
        let index = questions
            .iter()
            .enumerate()
            .map(|(pos, q)| (q.id.clone(), pos))
            .collect();

        let mut bank = Self {
            questions,
            index,
            tests,
            play_questions: Vec::new(),
        };

        bank.play_questions = match explicit_play {
            Some(play) => play,
            None => {
                let referenced = bank.referenced_ids();
                bank.questions
                    .iter()
                    .filter(|q| !referenced.contains(&q.id))
                    .cloned()
                    .collect()
            }
        };

        bank
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn play_questions(&self) -> &[Question] {
        &self.play_questions
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.index.get(id).map(|&pos| &self.questions[pos])
    }

    pub fn test(&self, test_id: &TestId) -> Option<&[QuestionRef]> {
        self.tests.get(test_id).map(Vec::as_slice)
    }

    /// 所有测试 ID，已排序
    pub fn test_ids(&self) -> Vec<TestId> {
        let mut ids: Vec<TestId> = self.tests.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// 解析单个引用；按 (分类, 等级) 引用时取题库顺序中第一个匹配的题目
    pub fn resolve(&self, reference: &QuestionRef) -> Option<&Question> {
        match reference {
            QuestionRef::Id(id) => self.get(id),
            QuestionRef::CategoryLevel { category, level } => {
                self.questions.iter().find(|q| q.matches(category, level))
            }
        }
    }

    /// 被任意测试引用的题目 ID（按分类等级的引用先解析为 ID）
    pub fn referenced_ids(&self) -> HashSet<QuestionId> {
        self.tests
            .values()
            .flatten()
            .filter_map(|reference| match reference {
                QuestionRef::Id(id) => Some(id.clone()),
                other => self.resolve(other).map(|q| q.id.clone()),
            })
            .collect()
    }

    pub fn summary(&self) -> BankSummary {
        BankSummary {
            questions: self.questions.len(),
            tests: self.tests.len(),
            references: self.tests.values().map(Vec::len).sum(),
            play_questions: self.play_questions.len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Key;

    pub(crate) fn question(id: i64, text: &str) -> Question {
        Question {
            id: Key::Int(id),
            text: text.to_string(),
            category: None,
            level: None,
            range: None,
            unit: None,
        }
    }

    pub(crate) fn sample_bank() -> QuestionBank {
        let questions = (1..=5)
            .map(|id| question(id, &format!("pregunta {}", id)))
            .collect();
        let mut tests = HashMap::new();
        tests.insert(
            Key::from("T1"),
            vec![QuestionRef::Id(Key::Int(3)), QuestionRef::Id(Key::Int(1))],
        );
        tests.insert(Key::from("T2"), vec![QuestionRef::Id(Key::Int(3))]);
        QuestionBank::new(questions, tests, None)
    }

    #[test]
    fn test_derived_play_questions_exclude_referenced() {
        let bank = sample_bank();
        let play: Vec<&Key> = bank.play_questions().iter().map(|q| &q.id).collect();
        assert_eq!(play, vec![&Key::Int(2), &Key::Int(4), &Key::Int(5)]);
    }

    #[test]
    fn test_category_level_references_count_as_referenced() {
        let mut first = question(1, "uno");
        first.category = Some("física".to_string());
        first.level = Some(Key::Int(1));
        let mut tests = HashMap::new();
        tests.insert(
            Key::from("A"),
            vec![QuestionRef::CategoryLevel {
                category: "física".to_string(),
                level: Key::Int(1),
            }],
        );

        let bank = QuestionBank::new(vec![first, question(2, "dos")], tests, None);

        assert_eq!(bank.play_questions().len(), 1);
        assert_eq!(bank.play_questions()[0].id, Key::Int(2));
    }

    #[test]
    fn test_summary_and_sorted_test_ids() {
        let bank = sample_bank();
        assert_eq!(
            bank.summary(),
            BankSummary {
                questions: 5,
                tests: 2,
                references: 3,
                play_questions: 3,
            }
        );
        assert_eq!(bank.test_ids(), vec![Key::from("T1"), Key::from("T2")]);
    }
}
