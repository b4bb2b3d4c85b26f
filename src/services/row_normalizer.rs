//! 行归一化服务
//!
//! 把工作表里未定型的行转换成 `Question` 和测试引用。
//! 列布局完全由 `SchemaDescriptor` 决定，不做版本探测。

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{BankError, BankResult, Diagnostic};
use crate::models::schema::{HeaderNames, QuestionLayout, TestLayout};
use crate::models::{
    Cell, ColumnAddressing, EstimateRange, Key, Question, QuestionColumns, QuestionRef,
    RawWorkbook, SchemaDescriptor, TestColumns, TestId, TestReferenceKind,
};

static EMPTY: Cell = Cell::Empty;

/// 归一化结果
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub questions: Vec<Question>,
    pub tests: HashMap<TestId, Vec<QuestionRef>>,
    /// 只有配置了单独的 play 工作表时才为 `Some`
    pub play_questions: Option<Vec<Question>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// 按结构描述归一化整个工作簿
///
/// 缺少必需的工作表或列时整体失败；单行问题只记录诊断信息。
pub fn normalize_workbook(
    workbook: &RawWorkbook,
    schema: &SchemaDescriptor,
) -> BankResult<Normalized> {
    let mut diagnostics = Vec::new();

    let question_rows = workbook.require(&schema.questions_sheet)?;
    let test_rows = workbook.require(&schema.tests_sheet)?;

    let questions = normalize_questions(
        &schema.questions_sheet,
        question_rows,
        &schema.questions,
        &schema.placeholders,
        &mut diagnostics,
    )?;

    let tests = normalize_tests(&schema.tests_sheet, test_rows, &schema.tests, &mut diagnostics)?;

    let play_questions = match schema.play_sheet() {
        Some(name) => match workbook.sheet(name) {
            Some(rows) => Some(normalize_questions(
                name,
                rows,
                &schema.questions,
                &schema.placeholders,
                &mut diagnostics,
            )?),
            None => {
                warn!("⚠️ 未找到 play 工作表 '{}'，play 题目为空", name);
                Some(Vec::new())
            }
        },
        None => None,
    };

    Ok(Normalized {
        questions,
        tests,
        play_questions,
        diagnostics,
    })
}

/// 归一化题目表
///
/// - 题干为空或等于占位文本的行被丢弃
/// - 有 ID 列时直接使用；否则按保留行的顺序分配从 1 开始的 ID
/// - ID 重复时后出现的行覆盖先出现的行（保留先出现的位置）
pub fn normalize_questions(
    sheet: &str,
    rows: &[Vec<Cell>],
    layout: &QuestionLayout,
    placeholders: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> BankResult<Vec<Question>> {
    let (columns, start) = plan(layout, rows, |names, header| {
        resolve_question_columns(sheet, header, names)
    })?;

    let mut questions: Vec<Question> = Vec::new();
    let mut positions: HashMap<Key, usize> = HashMap::new();
    let mut retained = 0usize;

    for (offset, row) in rows.iter().enumerate().skip(start) {
        let row_number = offset + 1;
        if row.iter().all(Cell::is_blank) {
            continue;
        }

        let text = match cell(row, columns.text).as_text() {
            Some(text) => text,
            None => {
                skip(diagnostics, sheet, row_number, "题干为空");
                continue;
            }
        };

        if placeholders.iter().any(|p| p.trim() == text) {
            skip(diagnostics, sheet, row_number, "占位行");
            continue;
        }

        let id = match columns.id {
            Some(idx) => match cell(row, idx).as_key() {
                Some(id) => id,
                None => {
                    skip(diagnostics, sheet, row_number, "题目 ID 为空");
                    continue;
                }
            },
            None => Key::Int(retained as i64 + 1),
        };
        retained += 1;

        let question = Question {
            id: id.clone(),
            text,
            category: columns.category.and_then(|idx| cell(row, idx).as_text()),
            level: columns.level.and_then(|idx| cell(row, idx).as_key()),
            range: parse_range(row, &columns, sheet, row_number),
            unit: columns.unit.and_then(|idx| cell(row, idx).as_text()),
        };

        match positions.get(&id) {
            Some(&pos) => {
                warn!(
                    "⚠️ {} 第 {} 行: 题目 ID {} 重复，覆盖之前的定义",
                    sheet, row_number, id
                );
                diagnostics.push(Diagnostic::DuplicateQuestionId {
                    id,
                    row: row_number,
                });
                questions[pos] = question;
            }
            None => {
                positions.insert(id, questions.len());
                questions.push(question);
            }
        }
    }

    Ok(questions)
}

/// 归一化测试表：同一测试 ID 的多行按行顺序累积
pub fn normalize_tests(
    sheet: &str,
    rows: &[Vec<Cell>],
    layout: &TestLayout,
    diagnostics: &mut Vec<Diagnostic>,
) -> BankResult<HashMap<TestId, Vec<QuestionRef>>> {
    let (columns, start) = plan(layout, rows, |names, header| {
        resolve_test_columns(sheet, header, names)
    })?;

    let mut tests: HashMap<TestId, Vec<QuestionRef>> = HashMap::new();

    for (offset, row) in rows.iter().enumerate().skip(start) {
        let row_number = offset + 1;
        if row.iter().all(Cell::is_blank) {
            continue;
        }

        let test_id = match cell(row, columns.test).as_key() {
            Some(id) => id,
            None => {
                skip(diagnostics, sheet, row_number, "测试 ID 为空");
                continue;
            }
        };

        let reference = match &columns.reference {
            TestReferenceKind::Id { id } => cell(row, *id).as_key().map(QuestionRef::Id),
            TestReferenceKind::CategoryLevel { category, level } => {
                match (cell(row, *category).as_text(), cell(row, *level).as_key()) {
                    (Some(category), Some(level)) => {
                        Some(QuestionRef::CategoryLevel { category, level })
                    }
                    _ => None,
                }
            }
        };

        match reference {
            Some(reference) => tests.entry(test_id).or_default().push(reference),
            None => skip(diagnostics, sheet, row_number, "题目引用不完整"),
        }
    }

    Ok(tests)
}

/// 确定列偏移和数据起始行
fn plan<H, P: Clone>(
    layout: &ColumnAddressing<H, P>,
    rows: &[Vec<Cell>],
    resolve: impl FnOnce(&H, &[Cell]) -> BankResult<P>,
) -> BankResult<(P, usize)> {
    match layout {
        ColumnAddressing::ByHeader { columns } => {
            let header = rows.first().map(Vec::as_slice).unwrap_or(&[]);
            Ok((resolve(columns, header)?, 1))
        }
        ColumnAddressing::ByPosition { skip_rows, columns } => Ok((columns.clone(), *skip_rows)),
    }
}

fn resolve_question_columns(
    sheet: &str,
    header: &[Cell],
    columns: &QuestionColumns<HeaderNames>,
) -> BankResult<QuestionColumns<usize>> {
    let optional =
        |names: &Option<HeaderNames>| names.as_ref().and_then(|n| header_index(header, n));

    Ok(QuestionColumns {
        id: match &columns.id {
            Some(names) => Some(required(sheet, header, names)?),
            None => None,
        },
        text: required(sheet, header, &columns.text)?,
        category: optional(&columns.category),
        level: optional(&columns.level),
        range_low: optional(&columns.range_low),
        range_high: optional(&columns.range_high),
        unit: optional(&columns.unit),
    })
}

fn resolve_test_columns(
    sheet: &str,
    header: &[Cell],
    columns: &TestColumns<HeaderNames>,
) -> BankResult<TestColumns<usize>> {
    let reference = match &columns.reference {
        TestReferenceKind::Id { id } => TestReferenceKind::Id {
            id: required(sheet, header, id)?,
        },
        TestReferenceKind::CategoryLevel { category, level } => TestReferenceKind::CategoryLevel {
            category: required(sheet, header, category)?,
            level: required(sheet, header, level)?,
        },
    };

    Ok(TestColumns {
        test: required(sheet, header, &columns.test)?,
        reference,
    })
}

fn required(sheet: &str, header: &[Cell], names: &HeaderNames) -> BankResult<usize> {
    header_index(header, names).ok_or_else(|| {
        BankError::missing_column(sheet, names.first().map(String::as_str).unwrap_or("?"))
    })
}

/// 按列名（任一别名，忽略大小写）查找列
fn header_index(header: &[Cell], names: &HeaderNames) -> Option<usize> {
    let wanted: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
    header.iter().position(|cell| {
        cell.as_text()
            .map(|text| wanted.contains(&text.to_lowercase()))
            .unwrap_or(false)
    })
}

fn cell(row: &[Cell], idx: usize) -> &Cell {
    row.get(idx).unwrap_or(&EMPTY)
}

/// 两端都能转换为数字时才有范围，否则两端都视为缺失
fn parse_range(
    row: &[Cell],
    columns: &QuestionColumns<usize>,
    sheet: &str,
    row_number: usize,
) -> Option<EstimateRange> {
    let low = columns.range_low.map(|idx| cell(row, idx));
    let high = columns.range_high.map(|idx| cell(row, idx));

    match (low.and_then(Cell::as_number), high.and_then(Cell::as_number)) {
        (Some(low), Some(high)) => Some(EstimateRange { low, high }),
        _ => {
            let present = [low, high].iter().flatten().any(|c| !c.is_blank());
            if present {
                debug!("{} 第 {} 行: 范围不完整或无法解析，忽略", sheet, row_number);
            }
            None
        }
    }
}

fn skip(diagnostics: &mut Vec<Diagnostic>, sheet: &str, row: usize, reason: &str) {
    debug!("跳过 {} 第 {} 行: {}", sheet, row, reason);
    diagnostics.push(Diagnostic::RowSkipped {
        sheet: sheet.to_string(),
        row,
        reason: reason.to_string(),
    });
}
