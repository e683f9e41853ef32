//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::path::PathBuf;

use thiserror::Error;

/// sheetsiteクレート全体で使用するエラー型
///
/// ワークブックの読み込み、構造化データの書き出し、サイトマップ生成の
/// すべての処理で発生するエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Io`: ファイルの読み書きに失敗したエラー
/// - `InputNotFound`: 指定された入力ワークブックが存在しない
/// - `Parse`: ワークブックの解析エラー（calamine由来）
/// - `Json` / `Yaml` / `Xml`: 各出力形式のシリアライズエラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `MissingColumn`: 必須列がワークブックに存在しない
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetsite::SheetSiteError;
/// use std::fs::File;
///
/// fn open_input(path: &str) -> Result<(), SheetSiteError> {
///     let _file = File::open(path)?; // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum SheetSiteError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 入力ワークブックが見つからない
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// ワークブックの解析中に発生したエラー
    ///
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// JSONシリアライズエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAMLシリアライズエラー
    ///
    /// `serde-saphyr`のエラーはメッセージ文字列として保持します。
    #[error("YAML serialization error: {0}")]
    Yaml(String),

    /// サイトマップXMLの書き出しエラー
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// ビルダーの`build()`時、またはシート設定ファイルの読み込み時に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use sheetsite::{SheetSiteError, SheetTable, TransformerBuilder};
    ///
    /// let result = TransformerBuilder::new()
    ///     .with_sheet_table(SheetTable::new(Vec::new()))
    ///     .build();
    ///
    /// if let Err(SheetSiteError::Config(msg)) = result {
    ///     println!("設定エラー: {}", msg);
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 必須列がヘッダー行に存在しない
    ///
    /// クライアントワークブックにドメイン列がない場合などに発生します。
    #[error("Required column '{column}' not found in sheet '{sheet}'")]
    MissingColumn {
        /// 見つからなかった列名
        column: String,
        /// 検索対象のシート名
        sheet: String,
    },
}

impl SheetSiteError {
    /// エラーとその原因チェーンを複数行の文字列として取得
    ///
    /// 実行レポートにエラーの詳細を残すために使用します。
    pub fn trace(&self) -> String {
        use std::error::Error as _;

        let mut lines = vec![format!("{:?}", self)];
        let mut source = self.source();
        while let Some(cause) = source {
            lines.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        lines.join("\n")
    }
}
