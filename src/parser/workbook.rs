//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックレベルの操作を提供します。
//! XLSX / XLS / ODS のいずれも読み込めます。

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};

use crate::error::SheetSiteError;
use crate::grid::SheetGrid;
use crate::types::CellValue;

/// ワークブックパーサー
pub(crate) struct WorkbookParser<RS: Read + Seek> {
    /// calamineのワークブック（形式は自動判別）
    workbook: Sheets<RS>,
}

impl WorkbookParser<BufReader<File>> {
    /// ファイルパスからワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(SheetSiteError::InputNotFound)` - ファイルが存在しない場合
    /// * `Err(SheetSiteError::Parse)` - ワークブックとして解析できない場合
    pub fn open_path(path: &Path) -> Result<Self, SheetSiteError> {
        if !path.is_file() {
            return Err(SheetSiteError::InputNotFound(path.to_path_buf()));
        }

        let workbook = open_workbook_auto(path)?;
        Ok(Self { workbook })
    }
}

impl<RS: Read + Seek + Clone> WorkbookParser<RS> {
    /// リーダーからワークブックを開く
    pub fn open(reader: RS) -> Result<Self, SheetSiteError> {
        let workbook = open_workbook_auto_from_rs(reader)?;
        Ok(Self { workbook })
    }
}

impl<RS: Read + Seek> WorkbookParser<RS> {
    /// すべてのシート名を定義順に取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// 指定した名前のシートが存在するか（大文字小文字を区別）
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|sheet| sheet == name)
    }

    /// 最初のシート名を取得
    pub fn first_sheet(&self) -> Option<String> {
        self.sheet_names().into_iter().next()
    }

    /// シートを読み込み、セルグリッドに変換
    ///
    /// グリッドはシートの使用範囲（最初に値のあるセルから）を表します。
    /// 数式セルはキャッシュされた値を使用します。
    pub fn read_grid(&mut self, sheet_name: &str) -> Result<SheetGrid, SheetSiteError> {
        let range = self.workbook.worksheet_range(sheet_name)?;

        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let rows = range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        Ok(SheetGrid::from_rows(rows).with_first_row(first_row))
    }
}

/// calamineのセルデータを`CellValue`に変換
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}
