//! Sheet Configuration Module
//!
//! シート名と出力先の対応表を定義するモジュール。
//! 対応表は変換処理に明示的に渡され、テストや設定ファイルで差し替えられます。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::SheetLayout;
use crate::error::SheetSiteError;

/// 1シート分の出力設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSpec {
    /// ワークブック内のシート名（大文字小文字を区別）
    pub sheet: String,

    /// 出力ディレクトリ（ルートからの相対パス）
    pub output_dir: PathBuf,

    /// 出力ファイル名（拡張子なし）
    pub stem: String,

    /// シートのレイアウト
    pub layout: SheetLayout,
}

impl SheetSpec {
    /// 新しいシート設定を生成
    pub fn new(
        sheet: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        stem: impl Into<String>,
        layout: SheetLayout,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            output_dir: output_dir.into(),
            stem: stem.into(),
            layout,
        }
    }
}

/// シート設定の対応表（定義順に処理される）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetTable {
    specs: Vec<SheetSpec>,
}

impl SheetTable {
    /// 任意のシート設定から対応表を生成
    pub fn new(specs: Vec<SheetSpec>) -> Self {
        Self { specs }
    }

    /// JSON文字列から対応表を読み込む
    ///
    /// # 入力例
    ///
    /// ```json
    /// [
    ///   { "sheet": "core_info", "output_dir": "schema-files/organization",
    ///     "stem": "main-data", "layout": "key_value" }
    /// ]
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, SheetSiteError> {
        serde_json::from_str(json).map_err(|e| {
            SheetSiteError::Config(format!("Invalid sheet configuration: {}", e))
        })
    }

    /// JSONファイルから対応表を読み込む
    pub fn from_json_file(path: &Path) -> Result<Self, SheetSiteError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// 定義順のシート設定
    pub fn specs(&self) -> &[SheetSpec] {
        &self.specs
    }

    /// シート名から設定を検索
    pub fn get(&self, sheet: &str) -> Option<&SheetSpec> {
        self.specs.iter().find(|spec| spec.sheet == sheet)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// 対応表を検証する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetSiteError::Config`:
    ///   * 対応表が空
    ///   * シート名の重複
    ///   * シート名・出力ファイル名・出力ディレクトリが空
    pub fn validate(&self) -> Result<(), SheetSiteError> {
        if self.specs.is_empty() {
            return Err(SheetSiteError::Config(
                "Sheet table must contain at least one sheet".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.specs {
            if spec.sheet.trim().is_empty() {
                return Err(SheetSiteError::Config("Sheet name must not be empty".to_string()));
            }
            if !seen.insert(spec.sheet.as_str()) {
                return Err(SheetSiteError::Config(format!(
                    "Duplicate sheet name: '{}'",
                    spec.sheet
                )));
            }
            if spec.stem.trim().is_empty() {
                return Err(SheetSiteError::Config(format!(
                    "Output filename for sheet '{}' must not be empty",
                    spec.sheet
                )));
            }
            if spec.output_dir.as_os_str().is_empty() {
                return Err(SheetSiteError::Config(format!(
                    "Output directory for sheet '{}' must not be empty",
                    spec.sheet
                )));
            }
        }

        Ok(())
    }
}

impl Default for SheetTable {
    /// 組織情報サイト向けの標準対応表
    fn default() -> Self {
        use SheetLayout::{KeyValue, List};

        const DEFAULT_SHEETS: [(&str, &str, &str, SheetLayout); 11] = [
            ("core_info", "schema-files/organization", "main-data", KeyValue),
            ("Services", "schema-files/services", "services-list", List),
            ("Products", "schema-files/products", "products-list", List),
            ("FAQs", "schema-files/faqs", "faq", List),
            ("Blog Summaries", "schema-files/blogs", "blogs-list", List),
            ("Reviews", "schema-files/reviews", "reviews-list", List),
            ("Locations", "schema-files/locations", "locations-list", List),
            ("Team", "schema-files/team", "team-list", List),
            ("Awards & Certifications", "schema-files/awards", "awards-list", List),
            ("Press/News Mentions", "schema-files/press", "press-list", List),
            ("Case Studies", "schema-files/case-studies", "case-studies-list", List),
        ];

        Self::new(
            DEFAULT_SHEETS
                .iter()
                .map(|&(sheet, dir, stem, layout)| SheetSpec::new(sheet, dir, stem, layout))
                .collect(),
        )
    }
}
