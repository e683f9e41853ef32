//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;
use serde_json::{Map, Value};

/// セルの値を表す列挙型
///
/// ワークブックから読み込んだ、型変換前の生の値です。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日時（Excelのシリアル値、1900年システム）
    DateTime(f64),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// 1行分のレコード（フィールド名 → 値、挿入順を保持）
pub type Record = Map<String, Value>;

/// 1シートから生成される構造化ドキュメント
///
/// シリアライズ時はタグなしで、単一オブジェクトまたは配列として出力されます。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    /// キー・値シートから生成された単一レコード
    Record(Record),

    /// 表形式シートから生成されたレコード一覧
    List(Vec<Record>),
}

impl Document {
    /// フィールド数（単一レコード）またはレコード数（一覧）
    pub fn len(&self) -> usize {
        match self {
            Document::Record(record) => record.len(),
            Document::List(records) => records.len(),
        }
    }

    /// 空のドキュメントかどうか
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 単一レコードの場合のみ参照を返す
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Document::Record(record) => Some(record),
            Document::List(_) => None,
        }
    }
}
