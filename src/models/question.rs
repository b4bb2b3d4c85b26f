use serde::{Deserialize, Serialize};
use std::fmt;

/// 表格中的标识值（题目 ID、测试 ID、难度等级）
///
/// 整数形式的数字和整数形式的文本都归一为 `Int`，
/// 这样 "3"、3、3.0 在不同工作表之间可以互相匹配。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl Key {
    /// 从文本解析，空白文本返回 `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(n) => Some(Key::Int(n)),
            Err(_) => Some(Key::Text(trimmed.to_string())),
        }
    }

    /// 从数字转换，非整数保留原文本形式
    pub fn from_number(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Some(Key::Int(value as i64))
        } else {
            Some(Key::Text(value.to_string()))
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{}", n),
            Key::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::parse(value).unwrap_or_else(|| Key::Text(String::new()))
    }
}

/// 题目 ID
pub type QuestionId = Key;

/// 测试 ID
pub type TestId = Key;

/// 估算题的合理范围（两端都存在，不允许只有一端）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateRange {
    pub low: f64,
    pub high: f64,
}

/// 估算题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Key>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<EstimateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Question {
    pub fn range_low(&self) -> Option<f64> {
        self.range.map(|r| r.low)
    }

    pub fn range_high(&self) -> Option<f64> {
        self.range.map(|r| r.high)
    }

    /// 是否与 (分类, 等级) 引用匹配
    pub fn matches(&self, category: &str, level: &Key) -> bool {
        self.category.as_deref() == Some(category) && self.level.as_ref() == Some(level)
    }
}

/// 测试中对题目的引用
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuestionRef {
    /// 按题目 ID 引用
    Id(QuestionId),
    /// 旧版表格按 (分类, 等级) 引用
    CategoryLevel { category: String, level: Key },
}

impl fmt::Display for QuestionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionRef::Id(id) => write!(f, "ID {}", id),
            QuestionRef::CategoryLevel { category, level } => {
                write!(f, "{} 等级 {}", category, level)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalizes_integral_values() {
        assert_eq!(Key::parse(" 3 "), Some(Key::Int(3)));
        assert_eq!(Key::from_number(3.0), Some(Key::Int(3)));
        assert_eq!(Key::parse("A"), Some(Key::Text("A".to_string())));
        assert_eq!(Key::from_number(2.5), Some(Key::Text("2.5".to_string())));
        assert_eq!(Key::parse("   "), None);
        assert_eq!(Key::from_number(f64::NAN), None);
    }

    #[test]
    fn test_key_ordering_puts_numbers_first() {
        let mut keys = vec![Key::from("B"), Key::from(10), Key::from("A"), Key::from(2)];
        keys.sort();
        assert_eq!(
            keys,
            vec![Key::Int(2), Key::Int(10), Key::from("A"), Key::from("B")]
        );
    }

    #[test]
    fn test_question_matches_category_level() {
        let question = Question {
            id: Key::Int(1),
            text: "¿Cuántos árboles hay en España?".to_string(),
            category: Some("naturaleza".to_string()),
            level: Some(Key::Int(2)),
            range: None,
            unit: None,
        };

        assert!(question.matches("naturaleza", &Key::Int(2)));
        assert!(!question.matches("naturaleza", &Key::Int(3)));
        assert!(!question.matches("ciudad", &Key::Int(2)));
        assert_eq!(question.range_low(), None);
    }
}
