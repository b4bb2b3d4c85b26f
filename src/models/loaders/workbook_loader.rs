use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::error::{BankError, BankResult};
use crate::models::Cell;

/// 一张工作表的所有行（坐标与表格一致，A1 对应 `rows[0][0]`）
pub type SheetRows = Vec<Vec<Cell>>;

/// 解析后的工作簿：工作表名 → 行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWorkbook {
    sheets: HashMap<String, SheetRows>,
}

impl RawWorkbook {
    pub fn from_sheets(sheets: impl IntoIterator<Item = (String, SheetRows)>) -> Self {
        Self {
            sheets: sheets.into_iter().collect(),
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&[Vec<Cell>]> {
        self.sheets.get(name).map(Vec::as_slice)
    }

    /// 获取必需的工作表，缺失时返回 `MalformedSchema`
    pub fn require(&self, name: &str) -> BankResult<&[Vec<Cell>]> {
        self.sheet(name).ok_or_else(|| BankError::missing_sheet(name))
    }
}

/// 从字节读取工作簿（xlsx / xls / xlsb / ods）
pub fn read_workbook(bytes: Vec<u8>) -> BankResult<RawWorkbook> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| BankError::MalformedSchema {
            detail: format!("无法解析工作簿: {}", e),
        })?;

    let mut sheets = HashMap::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| BankError::MalformedSchema {
                detail: format!("无法读取工作表 '{}': {}", name, e),
            })?;

        // calamine 的范围从第一个非空单元格开始，这里补齐到 A1
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: SheetRows = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(to_cell));
            rows.push(cells);
        }

        debug!("读取工作表 '{}': {} 行", name, rows.len());
        sheets.insert(name, rows);
    }

    Ok(RawWorkbook { sheets })
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}
