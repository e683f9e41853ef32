//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// シートのレイアウト
///
/// シートを単一のレコードとして読むか、レコードの一覧として読むかを指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetLayout {
    /// キー・値形式（A列 = キー、B列 = 値）
    ///
    /// # 入力例
    ///
    /// | A | B |
    /// | --- | --- |
    /// | name | Acme |
    /// | website | https://acme.io |
    ///
    /// # 出力例
    ///
    /// ```json
    /// { "name": "Acme", "website": "https://acme.io" }
    /// ```
    KeyValue,

    /// 表形式（1行目 = ヘッダー、2行目以降 = レコード）
    ///
    /// # 出力例
    ///
    /// ```json
    /// [ { "Name": "Widget", "Price": 9.99 } ]
    /// ```
    List,
}

/// 出力フォーマット
///
/// 1つのドキュメントは常に両方の形式で書き出されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// 2スペースインデントのJSON
    Json,

    /// ブロックスタイルのYAML（キーは挿入順）
    Yaml,
}

impl OutputFormat {
    /// 書き出し順に並べたすべての形式
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Json, OutputFormat::Yaml];

    /// ファイル拡張子（ドットなし）
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("JSON"),
            OutputFormat::Yaml => f.write_str("YAML"),
        }
    }
}
