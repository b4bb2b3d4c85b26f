//! 测试用的工作簿构造工具

use rust_xlsxwriter::Workbook;

use crate::models::Cell;

pub(crate) type Sheets = Vec<(String, Vec<Vec<Cell>>)>;

/// 把工作表写成 xlsx 字节
pub(crate) fn build_xlsx(sheets: &[(String, Vec<Vec<Cell>>)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet().set_name(name.as_str()).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s.as_str()).unwrap();
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).unwrap();
                    }
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// 当前布局的小题库：3 道有效题目 + 1 行占位，T1 = [3, 1]，T2 = [1]
pub(crate) fn current_sheets() -> Sheets {
    let t = |s: &str| Cell::from(s);
    let n = |v: f64| Cell::Number(v);

    vec![
        (
            "questions".to_string(),
            vec![
                vec![t("id_question"), t("question"), t("p05"), t("p95"), t("unit")],
                vec![
                    n(1.0),
                    t("¿Cuántos litros de agua consume una persona al año?"),
                    n(1e4),
                    n(1e5),
                    t("litros"),
                ],
                vec![n(2.0), t("¿Cuántos pianos hay en Madrid?"), n(1e3), n(1e5), t("pianos")],
                vec![
                    n(3.0),
                    t("¿Cuántos árboles hay en España?"),
                    n(1e9),
                    Cell::Empty,
                    t("árboles"),
                ],
                vec![n(4.0), t("Prueba"), Cell::Empty, Cell::Empty, Cell::Empty],
            ],
        ),
        (
            "tests".to_string(),
            vec![
                vec![t("test"), t("id_question")],
                vec![t("T1"), n(3.0)],
                vec![t("T1"), n(1.0)],
                vec![t("T2"), n(1.0)],
            ],
        ),
    ]
}
