//! Builder Module
//!
//! Fluent Builder APIを提供し、`Transformer`インスタンスを段階的に構築する。

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::api::SheetLayout;
use crate::config::{SheetSpec, SheetTable};
use crate::error::SheetSiteError;
use crate::grid::record_text;
use crate::handoff::{write_site_url, HANDOFF_PATH};
use crate::output::{write_document_pair, PairOutcome, WriteFailure};
use crate::parser::WorkbookParser;
use crate::types::Document;

/// 組織情報シートの既定名
pub const DEFAULT_SITE_URL_SHEET: &str = "core_info";

/// サイトURLを保持するフィールド名
pub const WEBSITE_FIELD: &str = "website";

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct TransformConfig {
    /// シート設定の対応表
    pub sheets: SheetTable,

    /// 出力先のルートディレクトリ
    pub root: PathBuf,

    /// `website`フィールドを読み取るシート名
    pub site_url_sheet: String,

    /// `website`がない場合に使用するURL
    pub fallback_url: Option<String>,

    /// ハンドオフファイルのパス（ルートからの相対パス）
    pub handoff_path: PathBuf,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            sheets: SheetTable::default(),
            root: PathBuf::from("."),
            site_url_sheet: DEFAULT_SITE_URL_SHEET.to_string(),
            fallback_url: None,
            handoff_path: PathBuf::from(HANDOFF_PATH),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetsite::TransformerBuilder;
///
/// # fn main() -> Result<(), sheetsite::SheetSiteError> {
/// let transformer = TransformerBuilder::new()
///     .with_root("site")
///     .with_fallback_url(Some("https://acme.io".to_string()))
///     .build()?;
/// let report = transformer.transform_path("data/site.xlsx".as_ref())?;
/// println!("{} sheet(s) written", report.written_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TransformerBuilder {
    config: TransformConfig,
}

impl TransformerBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート対応表: `SheetTable::default()`
    /// - ルート: カレントディレクトリ
    /// - サイトURLシート: `core_info`
    /// - フォールバックURL: なし
    /// - ハンドオフファイル: `.github/config/site_url.txt`
    pub fn new() -> Self {
        Self::default()
    }

    /// シート設定の対応表を指定する
    pub fn with_sheet_table(mut self, sheets: SheetTable) -> Self {
        self.config.sheets = sheets;
        self
    }

    /// 出力先のルートディレクトリを指定する
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// `website`フィールドを読み取るシート名を指定する
    pub fn with_site_url_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.config.site_url_sheet = sheet.into();
        self
    }

    /// `website`がない場合に使用するURLを指定する
    ///
    /// CLIでは環境変数`SITE_BASE_URL`の値が渡されます。
    pub fn with_fallback_url(mut self, url: Option<String>) -> Self {
        self.config.fallback_url = url;
        self
    }

    /// ハンドオフファイルのパス（ルートからの相対パス）を指定する
    pub fn with_handoff_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.handoff_path = path.into();
        self
    }

    /// 設定を検証し、`Transformer`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetSiteError::Config`:
    ///   * シート対応表が不正（空、重複、空のファイル名）
    ///   * ハンドオフファイルのパスが空
    pub fn build(self) -> Result<Transformer, SheetSiteError> {
        self.config.sheets.validate()?;

        if self.config.handoff_path.as_os_str().is_empty() {
            return Err(SheetSiteError::Config(
                "Handoff path must not be empty".to_string(),
            ));
        }

        Ok(Transformer {
            config: self.config,
        })
    }
}

/// 1シート分の処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOutcome {
    /// シートがワークブックに存在しない（警告のみ）
    Missing,

    /// JSON / YAMLの両方を書き出した
    Written {
        /// フィールド数（キー・値）またはレコード数（表形式）
        items: usize,
        /// 書き出したファイル
        paths: Vec<PathBuf>,
    },

    /// シートは存在するが読み込めなかった
    Unreadable {
        /// 読み込みエラーのメッセージ
        message: String,
    },

    /// いずれかの形式の書き出しに失敗した
    Failed {
        /// フィールド数またはレコード数
        items: usize,
        /// 書き出しに成功したファイル
        written: Vec<PathBuf>,
        /// 失敗した形式
        failures: Vec<WriteFailure>,
    },
}

impl SheetOutcome {
    /// JSON / YAMLの書き出し結果から処理結果を生成
    pub(crate) fn from_pair(items: usize, pair: PairOutcome) -> Self {
        if pair.is_success() {
            SheetOutcome::Written {
                items,
                paths: pair.written,
            }
        } else {
            SheetOutcome::Failed {
                items,
                written: pair.written,
                failures: pair.failures,
            }
        }
    }
}

/// シート名と処理結果の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetReport {
    pub sheet: String,
    pub outcome: SheetOutcome,
}

/// ハンドオフファイルの書き出し結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// `website`フィールドの値を書き出した
    FromWebsite(String),
    /// フォールバックURLを書き出した
    FromFallback(String),
    /// URLが決定できず、書き出さなかった
    Unresolved,
    /// 書き出しに失敗した
    Failed { url: String, message: String },
}

impl HandoffOutcome {
    /// 書き出したURL
    pub fn url(&self) -> Option<&str> {
        match self {
            HandoffOutcome::FromWebsite(url) | HandoffOutcome::FromFallback(url) => Some(url),
            HandoffOutcome::Unresolved | HandoffOutcome::Failed { .. } => None,
        }
    }
}

/// 変換処理全体の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformReport {
    /// シート対応表の順に並んだ処理結果
    pub sheets: Vec<SheetReport>,
    /// ハンドオフファイルの書き出し結果
    pub handoff: HandoffOutcome,
}

impl TransformReport {
    /// シート名から処理結果を検索
    pub fn sheet(&self, name: &str) -> Option<&SheetOutcome> {
        self.sheets
            .iter()
            .find(|report| report.sheet == name)
            .map(|report| &report.outcome)
    }

    /// 書き出しに成功したシート数
    pub fn written_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, SheetOutcome::Written { .. }))
    }

    /// ワークブックに存在しなかったシート数
    pub fn missing_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, SheetOutcome::Missing))
    }

    /// 読み込みまたは書き出しに失敗したシート数
    pub fn failed_count(&self) -> usize {
        self.count(|outcome| {
            matches!(
                outcome,
                SheetOutcome::Failed { .. } | SheetOutcome::Unreadable { .. }
            )
        })
    }

    fn count(&self, predicate: impl Fn(&SheetOutcome) -> bool) -> usize {
        self.sheets.iter().filter(|report| predicate(&report.outcome)).count()
    }
}

/// 読み込みに失敗したシートの結果（処理は後続のシートへ続行）
fn unreadable_sheet(spec: &SheetSpec, error: &SheetSiteError) -> SheetReport {
    warn!(sheet = %spec.sheet, error = %error, "failed to read sheet, skipping");
    SheetReport {
        sheet: spec.sheet.clone(),
        outcome: SheetOutcome::Unreadable {
            message: error.to_string(),
        },
    }
}

/// 変換処理のファサード
///
/// ワークブックの各シートを構造化ドキュメントに変換し、JSON / YAMLとして書き出します。
#[derive(Debug)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    /// ファイルパスで指定したワークブックを変換
    ///
    /// # 戻り値
    ///
    /// * `Ok(TransformReport)` - ワークブックを読み込めた場合（シート単位の失敗はレポートに記録）
    /// * `Err(SheetSiteError::InputNotFound)` - ファイルが存在しない場合
    /// * `Err(SheetSiteError::Parse)` - ワークブックとして解析できない場合
    pub fn transform_path(&self, input: &Path) -> Result<TransformReport, SheetSiteError> {
        let parser = WorkbookParser::open_path(input)?;
        info!(input = %input.display(), "processing workbook");
        self.run(parser)
    }

    /// リーダーから読み込んだワークブックを変換
    pub fn transform<R: Read + Seek + Clone>(
        &self,
        input: R,
    ) -> Result<TransformReport, SheetSiteError> {
        self.run(WorkbookParser::open(input)?)
    }

    /// 処理フロー
    ///
    /// 1. シート対応表の順にシートを処理（存在しない・読み込めないシートは警告してスキップ）
    /// 2. グリッドを読み込み、レイアウトに応じてドキュメントに変換
    /// 3. JSON / YAMLを書き出し
    /// 4. サイトURLシートの`website`（またはフォールバック）をハンドオフファイルに保存
    fn run<RS: Read + Seek>(
        &self,
        mut parser: WorkbookParser<RS>,
    ) -> Result<TransformReport, SheetSiteError> {
        info!(sheets = ?parser.sheet_names(), "found sheets");

        let mut reports = Vec::with_capacity(self.config.sheets.len());
        let mut website = None;

        for spec in self.config.sheets.specs() {
            if !parser.has_sheet(&spec.sheet) {
                warn!(sheet = %spec.sheet, "sheet not found, skipping");
                reports.push(SheetReport {
                    sheet: spec.sheet.clone(),
                    outcome: SheetOutcome::Missing,
                });
                continue;
            }

            let grid = match parser.read_grid(&spec.sheet) {
                Ok(grid) => grid,
                Err(e) => {
                    reports.push(unreadable_sheet(spec, &e));
                    continue;
                }
            };
            info!(
                sheet = %spec.sheet,
                rows = grid.row_count(),
                cols = grid.col_count(),
                "processing sheet"
            );

            let document = grid.to_document(spec.layout);
            if spec.sheet == self.config.site_url_sheet {
                website = document
                    .as_record()
                    .and_then(|record| record_text(record, WEBSITE_FIELD));
            }

            reports.push(SheetReport {
                sheet: spec.sheet.clone(),
                outcome: self.write_sheet(spec, &document),
            });
        }

        let handoff = self.persist_site_url(website);

        Ok(TransformReport {
            sheets: reports,
            handoff,
        })
    }

    /// 1シート分のドキュメントを書き出す
    fn write_sheet(&self, spec: &SheetSpec, document: &Document) -> SheetOutcome {
        let items = document.len();
        match spec.layout {
            SheetLayout::List => info!(sheet = %spec.sheet, records = items, "parsed records"),
            SheetLayout::KeyValue => info!(sheet = %spec.sheet, fields = items, "parsed fields"),
        }

        let dir = self.config.root.join(&spec.output_dir);
        let pair = write_document_pair(document, &dir, &spec.stem);
        let outcome = SheetOutcome::from_pair(items, pair);
        if matches!(outcome, SheetOutcome::Failed { .. }) {
            warn!(sheet = %spec.sheet, "failed to write output");
        }
        outcome
    }

    /// ハンドオフファイルにベースURLを保存
    fn persist_site_url(&self, website: Option<String>) -> HandoffOutcome {
        let fallback = self
            .config
            .fallback_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());

        let (url, from_website) = match (website, fallback) {
            (Some(url), _) => (url, true),
            (None, Some(url)) => (url.to_string(), false),
            (None, None) => {
                warn!(
                    sheet = %self.config.site_url_sheet,
                    "no website found and no fallback URL configured; site URL not saved"
                );
                return HandoffOutcome::Unresolved;
            }
        };

        let path = self.config.root.join(&self.config.handoff_path);
        match write_site_url(&path, &url) {
            Ok(()) if from_website => {
                info!(url = %url, path = %path.display(), "site URL saved for sitemap");
                HandoffOutcome::FromWebsite(url)
            }
            Ok(()) => {
                info!(url = %url, path = %path.display(), "used fallback site URL");
                HandoffOutcome::FromFallback(url)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to save site URL");
                HandoffOutcome::Failed {
                    url,
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = TransformerBuilder::new();
        assert_eq!(builder.config.sheets, SheetTable::default());
        assert_eq!(builder.config.root, PathBuf::from("."));
        assert_eq!(builder.config.site_url_sheet, "core_info");
        assert!(builder.config.fallback_url.is_none());
        assert_eq!(builder.config.handoff_path, PathBuf::from(HANDOFF_PATH));
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = TransformerBuilder::new()
            .with_root("out")
            .with_site_url_sheet("About")
            .with_fallback_url(Some("https://fallback.io".to_string()))
            .with_handoff_path("config/url.txt");

        assert_eq!(builder.config.root, PathBuf::from("out"));
        assert_eq!(builder.config.site_url_sheet, "About");
        assert_eq!(builder.config.fallback_url.as_deref(), Some("https://fallback.io"));
        assert_eq!(builder.config.handoff_path, PathBuf::from("config/url.txt"));
    }

    #[test]
    fn test_build_rejects_empty_table() {
        let result = TransformerBuilder::new()
            .with_sheet_table(SheetTable::new(Vec::new()))
            .build();
        assert!(matches!(result, Err(SheetSiteError::Config(_))));
    }

    #[test]
    fn test_build_rejects_empty_handoff_path() {
        let result = TransformerBuilder::new().with_handoff_path("").build();
        match result {
            Err(SheetSiteError::Config(msg)) => assert!(msg.contains("Handoff path")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_build_with_custom_table() {
        let table = SheetTable::new(vec![SheetSpec::new(
            "Menu",
            "schema-files/menu",
            "menu",
            SheetLayout::List,
        )]);
        assert!(TransformerBuilder::new().with_sheet_table(table).build().is_ok());
    }

    #[test]
    fn test_persist_site_url_prefers_website() {
        let temp = tempfile::tempdir().unwrap();
        let transformer = TransformerBuilder::new()
            .with_root(temp.path())
            .with_fallback_url(Some("https://fallback.io".to_string()))
            .build()
            .unwrap();

        let outcome = transformer.persist_site_url(Some("https://acme.io".to_string()));
        assert_eq!(outcome, HandoffOutcome::FromWebsite("https://acme.io".to_string()));

        let outcome = transformer.persist_site_url(None);
        assert_eq!(outcome, HandoffOutcome::FromFallback("https://fallback.io".to_string()));
        assert_eq!(
            std::fs::read_to_string(temp.path().join(HANDOFF_PATH)).unwrap(),
            "https://fallback.io"
        );
    }

    #[test]
    fn test_persist_site_url_unresolved() {
        let temp = tempfile::tempdir().unwrap();
        let transformer = TransformerBuilder::new()
            .with_root(temp.path())
            .with_fallback_url(Some("   ".to_string()))
            .build()
            .unwrap();

        assert_eq!(transformer.persist_site_url(None), HandoffOutcome::Unresolved);
        assert!(!temp.path().join(HANDOFF_PATH).exists());
    }

    #[test]
    fn test_unreadable_sheet_counts_as_failed() {
        let spec = SheetSpec::new("FAQs", "schema-files/faqs", "faq", SheetLayout::List);
        let error = SheetSiteError::Parse(calamine::Error::Msg("unexpected end of sheet xml"));

        let unreadable = unreadable_sheet(&spec, &error);
        assert_eq!(unreadable.sheet, "FAQs");
        assert_eq!(
            unreadable.outcome,
            SheetOutcome::Unreadable {
                message: error.to_string()
            }
        );

        let report = TransformReport {
            sheets: vec![
                unreadable,
                SheetReport {
                    sheet: "Products".to_string(),
                    outcome: SheetOutcome::Written {
                        items: 1,
                        paths: Vec::new(),
                    },
                },
            ],
            handoff: HandoffOutcome::Unresolved,
        };
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.written_count(), 1);
    }

    #[test]
    fn test_transform_invalid_input() {
        let transformer = TransformerBuilder::new().build().unwrap();
        let result = transformer.transform(std::io::Cursor::new(Vec::<u8>::new()));
        assert!(result.is_err());
    }
}
