use crate::models::Key;

/// 单元格的原始值（与具体的表格库无关）
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// 空单元格或只包含空白的文本
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 去掉首尾空白后的文本，空白返回 `None`
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) => Key::from_number(*n).map(|k| k.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    pub fn as_key(&self) -> Option<Key> {
        match self {
            Cell::Number(n) => Key::from_number(*n),
            Cell::Text(s) => Key::parse(s),
            Cell::Bool(b) => Some(Key::Text(b.to_string())),
            Cell::Empty => None,
        }
    }

    /// 强制转换为有限的数字；无法转换返回 `None`
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty | Cell::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_coercion() {
        assert_eq!(Cell::from(" 1e6 ").as_number(), Some(1e6));
        assert_eq!(Cell::from(42.5).as_number(), Some(42.5));
        assert_eq!(Cell::from("mucho").as_number(), None);
        assert_eq!(Cell::from("NaN").as_number(), None);
        assert_eq!(Cell::from("inf").as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn test_text_trims_and_rejects_blank() {
        assert_eq!(Cell::from("  hola ").as_text(), Some("hola".to_string()));
        assert_eq!(Cell::from("   ").as_text(), None);
        assert_eq!(Cell::from(3.0).as_text(), Some("3".to_string()));
        assert!(Cell::from(" ").is_blank());
        assert!(!Cell::from(0.0).is_blank());
    }
}
