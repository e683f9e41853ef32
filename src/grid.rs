//! Grid Module
//!
//! シートのセルグリッドから構造化ドキュメントを組み立てるモジュール。
//! レイアウト（キー・値 / 表形式）に応じて行を解釈します。

use serde_json::Value;

use crate::api::SheetLayout;
use crate::coerce::{coerce_cell, NULL_SENTINELS};
use crate::formatter::cell_text;
use crate::types::{CellValue, Document, Record};

/// シートのセルグリッド（行 × 列）
///
/// 行ごとに列数が異なっていても構いません。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<CellValue>>,
    first_row: usize,
}

impl SheetGrid {
    /// 行データからグリッドを生成
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows, first_row: 0 }
    }

    /// グリッドの先頭行がシート上の何行目か（0始まり）を設定
    pub fn with_first_row(mut self, first_row: usize) -> Self {
        self.first_row = first_row;
        self
    }

    /// グリッドの指定行に対応するシート上の行番号（1始まり）
    pub fn sheet_row_number(&self, row: usize) -> usize {
        self.first_row + row + 1
    }

    /// 行数
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 最大の列数
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 行データへの参照
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// 指定行の取得
    pub fn get_row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// 1行目をヘッダーとして、前後の空白を除去したフィールド名の一覧を取得
    ///
    /// 空セルは空文字列になります。
    pub fn header(&self) -> Vec<String> {
        self.get_row(0)
            .map(|row| row.iter().map(header_text).collect())
            .unwrap_or_default()
    }

    /// レイアウトに応じてドキュメントを生成
    ///
    /// 不正な行（列数不足・空行・キーなし）はエラーにせず読み飛ばします。
    pub fn to_document(&self, layout: SheetLayout) -> Document {
        match layout {
            SheetLayout::List => Document::List(self.to_records()),
            SheetLayout::KeyValue => Document::Record(self.to_key_values()),
        }
    }

    /// 表形式: 2行目以降をレコードに変換
    ///
    /// null以外の値だけを持つレコードを生成し、フィールドが1つもない行は除外します。
    fn to_records(&self) -> Vec<Record> {
        let headers = self.header();

        self.rows
            .iter()
            .skip(1)
            .filter_map(|row| {
                let mut record = Record::new();
                for (header, cell) in headers.iter().zip(row.iter()) {
                    let value = coerce_cell(cell, header);
                    if !value.is_null() {
                        record.insert(header.clone(), value);
                    }
                }
                (!record.is_empty()).then_some(record)
            })
            .collect()
    }

    /// キー・値形式: A列をキー、B列を値として1つのレコードに変換
    ///
    /// 同じキーが複数回現れた場合は後の値で上書きします（位置は最初の出現位置）。
    /// 値がnullでもキーは保持します。
    fn to_key_values(&self) -> Record {
        let mut record = Record::new();

        for row in &self.rows {
            let [key_cell, value_cell, ..] = row.as_slice() else {
                continue;
            };

            let Some(key) = record_key(key_cell) else {
                continue;
            };

            let value = coerce_cell(value_cell, &key);
            record.insert(key, value);
        }

        record
    }
}

/// ヘッダーセルのテキスト（空セルは空文字列）
fn header_text(cell: &CellValue) -> String {
    cell_text(cell)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// キー・値形式のキーを取得
///
/// 空セル・空文字列・プレースホルダー（`n/a`など）は`None`を返します。
fn record_key(cell: &CellValue) -> Option<String> {
    let key = header_text(cell);
    if NULL_SENTINELS.contains(&key.to_lowercase().as_str()) {
        None
    } else {
        Some(key)
    }
}

/// 単一レコードから文字列として値を取り出す
///
/// 文字列は前後の空白を除去し、数値・論理値はテキスト表現を返します。
/// null・空文字列・配列の場合は`None`を返します。
pub(crate) fn record_text(record: &Record, field: &str) -> Option<String> {
    let text = match record.get(field)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells
            .iter()
            .map(|s| {
                if s.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::from(*s)
                }
            })
            .collect()
    }

    #[test]
    fn test_sheet_row_number() {
        let grid = SheetGrid::from_rows(vec![row(&["domain"]), row(&["acme.io"])]);
        assert_eq!(grid.sheet_row_number(1), 2);

        let shifted = grid.with_first_row(2);
        assert_eq!(shifted.sheet_row_number(0), 3);
        assert_eq!(shifted.sheet_row_number(1), 4);
    }

    #[test]
    fn test_list_drops_empty_rows() {
        let grid = SheetGrid::from_rows(vec![
            row(&["Name", "Price"]),
            row(&["Widget", "9.99"]),
            row(&["", ""]),
        ]);

        let document = grid.to_document(SheetLayout::List);
        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!([{"Name": "Widget", "Price": 9.99}])
        );
    }

    #[test]
    fn test_list_preserves_row_and_field_order() {
        let grid = SheetGrid::from_rows(vec![
            row(&["b", "a"]),
            row(&["1", "2"]),
            row(&["n/a", "x"]),
            row(&["3", "none"]),
        ]);

        let records = grid.to_records();
        assert_eq!(records.len(), 3);
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(records[1], json!({"a": "x"}).as_object().unwrap().clone());
        assert_eq!(records[2], json!({"b": 3}).as_object().unwrap().clone());
    }

    #[test]
    fn test_list_ragged_rows() {
        let grid = SheetGrid::from_rows(vec![
            row(&["Name", "Price", "sameAs"]),
            row(&["Short"]),
            row(&["Long", "1", "a.com|b.com", "extra"]),
        ]);

        let records = grid.to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], json!({"Name": "Short"}).as_object().unwrap().clone());
        assert_eq!(
            records[1],
            json!({"Name": "Long", "Price": 1, "sameAs": ["a.com", "b.com"]})
                .as_object()
                .unwrap()
                .clone()
        );
    }

    #[test]
    fn test_list_header_only_and_empty() {
        let header_only = SheetGrid::from_rows(vec![row(&["Name"])]);
        assert!(header_only.to_document(SheetLayout::List).is_empty());

        let empty = SheetGrid::default();
        assert_eq!(empty.to_document(SheetLayout::List), Document::List(Vec::new()));
        assert!(empty.header().is_empty());
    }

    #[test]
    fn test_header_trims_and_blanks() {
        let grid = SheetGrid::from_rows(vec![vec![
            CellValue::from("  Name "),
            CellValue::Empty,
            CellValue::Number(2024.0),
        ]]);
        assert_eq!(grid.header(), vec!["Name", "", "2024"]);
    }

    #[test]
    fn test_key_value_last_write_wins() {
        let grid = SheetGrid::from_rows(vec![
            row(&["color", "red"]),
            row(&["size", "10"]),
            row(&["color", "blue"]),
        ]);

        let document = grid.to_document(SheetLayout::KeyValue);
        let record = document.as_record().unwrap();
        assert_eq!(record.get("color"), Some(&json!("blue")));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["color", "size"]);
    }

    #[test]
    fn test_key_value_skips_malformed_rows() {
        let grid = SheetGrid::from_rows(vec![
            row(&["single"]),
            row(&["", "orphan"]),
            row(&["N/A", "placeholder"]),
            row(&[" website ", " https://acme.io "]),
            row(&["fax", "none"]),
        ]);

        let record = grid.to_key_values();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"website": "https://acme.io", "fax": null})
        );
    }

    #[test]
    fn test_record_text() {
        let record = json!({
            "website": "  https://acme.io/ ",
            "year": 1999,
            "empty": "   ",
            "missing": null,
            "sameAs": ["a"]
        })
        .as_object()
        .unwrap()
        .clone();

        assert_eq!(record_text(&record, "website"), Some("https://acme.io/".to_string()));
        assert_eq!(record_text(&record, "year"), Some("1999".to_string()));
        assert_eq!(record_text(&record, "empty"), None);
        assert_eq!(record_text(&record, "missing"), None);
        assert_eq!(record_text(&record, "sameAs"), None);
        assert_eq!(record_text(&record, "absent"), None);
    }
}
