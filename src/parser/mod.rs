//! Parser Module
//!
//! calamineを使用したワークブック読み込みの実装。
//! シート単位でセルグリッドを抽出します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
