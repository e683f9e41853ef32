//! Client Profile Module
//!
//! 1社分のクライアント情報（ヘッダー行 + データ1行）から、組織情報・
//! ライセンス一覧・サービス一覧の3ドキュメントを生成するモジュール。

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::builder::SheetOutcome;
use crate::coerce::{coerce_cell, NULL_SENTINELS};
use crate::error::SheetSiteError;
use crate::formatter::cell_text;
use crate::grid::SheetGrid;
use crate::output::write_document_pair;
use crate::parser::WorkbookParser;
use crate::types::{CellValue, Document, Record};

/// 組織情報として取り出す列（出力順）
pub const CORE_FIELDS: [&str; 11] = [
    "client_name",
    "website",
    "category",
    "tagline",
    "description",
    "business_hours",
    "year_founded",
    "number_of_employees",
    "address",
    "phone",
    "email",
];

/// `,`区切りのライセンス一覧を持つ列
pub const LICENSES_FIELD: &str = "licenses";

/// サービスとして扱う列名の接頭辞（大文字小文字を無視）
pub const SERVICE_PREFIX: &str = "service_";

/// 組織情報・ライセンスの出力ディレクトリ
const ORGANIZATION_DIR: &str = "schema-files/organization";

/// サービス一覧の出力ディレクトリ
const SERVICES_DIR: &str = "schema-files/services";

/// 1社分のクライアント情報
#[derive(Debug, Clone, PartialEq)]
pub struct ClientProfile {
    /// 組織情報（値のない列は含まない）
    pub core: Record,
    /// ライセンス・認証の一覧
    pub licenses: Vec<String>,
    /// サービス名の一覧（列の順）
    pub services: Vec<String>,
}

impl ClientProfile {
    /// グリッドからクライアント情報を抽出
    ///
    /// # 引数
    ///
    /// * `grid` - 1行目をヘッダーとするセルグリッド
    /// * `sheet` - エラーメッセージに使うシート名
    ///
    /// # 戻り値
    ///
    /// * `Ok(ClientProfile)` - 空行を除くデータ行がちょうど1行の場合
    /// * `Err(SheetSiteError::Config)` - データ行が0行または2行以上の場合
    pub fn from_grid(grid: &SheetGrid, sheet: &str) -> Result<Self, SheetSiteError> {
        let data_rows: Vec<&Vec<CellValue>> = grid
            .rows()
            .iter()
            .skip(1)
            .filter(|row| row.iter().any(|cell| cell_value_text(cell).is_some()))
            .collect();

        let [row] = data_rows.as_slice() else {
            return Err(SheetSiteError::Config(format!(
                "Expected exactly one client row in sheet '{}', found {}",
                sheet,
                data_rows.len()
            )));
        };

        let header = grid.header();
        let cell = |name: &str| {
            header
                .iter()
                .position(|column| column == name)
                .and_then(|index| row.get(index))
        };

        let mut core = Record::new();
        for field in CORE_FIELDS {
            let Some(value) = cell(field).map(|c| coerce_cell(c, field)) else {
                continue;
            };
            if !value.is_null() {
                core.insert(field.to_string(), value);
            }
        }

        let licenses = cell(LICENSES_FIELD)
            .and_then(cell_value_text)
            .map(|text| split_licenses(&text))
            .unwrap_or_default();

        let services = header
            .iter()
            .zip(row.iter())
            .filter(|(column, _)| column.to_lowercase().starts_with(SERVICE_PREFIX))
            .filter_map(|(_, cell)| cell_value_text(cell))
            .collect();

        Ok(Self {
            core,
            licenses,
            services,
        })
    }

    /// `main-data`ドキュメント
    pub fn main_data(&self) -> Document {
        Document::Record(self.core.clone())
    }

    /// `licenses`ドキュメント（`{"licenses": [...]}`）
    pub fn licenses_document(&self) -> Document {
        single_field("licenses", json!(self.licenses))
    }

    /// `services-list`ドキュメント（`{"services": [{"service_name": ...}]}`）
    pub fn services_document(&self) -> Document {
        let services: Vec<Value> = self
            .services
            .iter()
            .map(|name| json!({ "service_name": name }))
            .collect();
        single_field("services", Value::Array(services))
    }

    /// 出力ディレクトリ・ファイル名・ドキュメントの組
    fn outputs(&self) -> [(&'static str, &'static str, Document); 3] {
        [
            (ORGANIZATION_DIR, "main-data", self.main_data()),
            (ORGANIZATION_DIR, "licenses", self.licenses_document()),
            (SERVICES_DIR, "services-list", self.services_document()),
        ]
    }
}

/// ライセンス一覧のセルを`,`で分割（前後の空白を除去し、空の要素は捨てる）
pub fn split_licenses(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// 前後の空白を除去したセルテキスト（空・プレースホルダーは`None`）
fn cell_value_text(cell: &CellValue) -> Option<String> {
    let text = cell_text(cell)?.trim().to_string();
    (!NULL_SENTINELS.contains(&text.to_lowercase().as_str())).then_some(text)
}

fn single_field(name: &str, value: Value) -> Document {
    let mut record = Record::new();
    record.insert(name.to_string(), value);
    Document::Record(record)
}

/// 1ドキュメント分の書き出し結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOutput {
    /// ファイル名（拡張子なし）
    pub stem: String,
    pub outcome: SheetOutcome,
}

/// クライアント情報の書き出し結果
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileReport {
    /// 抽出したクライアント情報
    pub profile: ClientProfile,
    /// `main-data`・`licenses`・`services-list`の順の書き出し結果
    pub outputs: Vec<ProfileOutput>,
}

impl ProfileReport {
    /// ファイル名から書き出し結果を検索
    pub fn output(&self, stem: &str) -> Option<&SheetOutcome> {
        self.outputs
            .iter()
            .find(|output| output.stem == stem)
            .map(|output| &output.outcome)
    }

    /// 書き出しに失敗したドキュメント数
    pub fn failed_count(&self) -> usize {
        self.outputs
            .iter()
            .filter(|output| matches!(output.outcome, SheetOutcome::Failed { .. }))
            .count()
    }
}

/// `ProfileGenerator`のビルダー
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetsite::ProfileBuilder;
///
/// # fn main() -> Result<(), sheetsite::SheetSiteError> {
/// let generator = ProfileBuilder::new().with_root("site").build()?;
/// let report = generator.generate_path("data/client-data.xlsx".as_ref())?;
/// println!("{} service(s)", report.profile.services.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ProfileBuilder {
    root: PathBuf,
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl ProfileBuilder {
    /// デフォルト設定（ルート: カレントディレクトリ）を持つビルダーを生成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 出力先のルートディレクトリを指定する
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// 設定を検証し、`ProfileGenerator`インスタンスを生成する
    pub fn build(self) -> Result<ProfileGenerator, SheetSiteError> {
        if self.root.as_os_str().is_empty() {
            return Err(SheetSiteError::Config(
                "Root directory must not be empty".to_string(),
            ));
        }
        Ok(ProfileGenerator { root: self.root })
    }
}

/// クライアント情報のファサード
#[derive(Debug)]
pub struct ProfileGenerator {
    root: PathBuf,
}

impl ProfileGenerator {
    /// ワークブックの最初のシートからクライアント情報を読み込み、書き出す
    ///
    /// # 戻り値
    ///
    /// * `Ok(ProfileReport)` - 抽出できた場合（ファイル単位の失敗はレポートに記録）
    /// * `Err(SheetSiteError::InputNotFound)` - ファイルが存在しない場合
    /// * `Err(SheetSiteError::Config)` - シートがない、またはデータ行が1行でない場合
    pub fn generate_path(&self, input: &Path) -> Result<ProfileReport, SheetSiteError> {
        let mut parser = WorkbookParser::open_path(input)?;
        let sheet = parser
            .first_sheet()
            .ok_or_else(|| SheetSiteError::Config("Client workbook has no sheets".to_string()))?;
        let grid = parser.read_grid(&sheet)?;
        info!(input = %input.display(), sheet = %sheet, "processing client profile");

        let profile = ClientProfile::from_grid(&grid, &sheet)?;
        Ok(self.write(profile))
    }

    /// 3つのドキュメントをJSON / YAMLとして書き出す
    pub fn write(&self, profile: ClientProfile) -> ProfileReport {
        let outputs = profile
            .outputs()
            .into_iter()
            .map(|(dir, stem, document)| {
                let pair = write_document_pair(&document, &self.root.join(dir), stem);
                let outcome = SheetOutcome::from_pair(document.len(), pair);
                if matches!(outcome, SheetOutcome::Failed { .. }) {
                    warn!(stem = %stem, "failed to write output");
                }
                ProfileOutput {
                    stem: stem.to_string(),
                    outcome,
                }
            })
            .collect();

        info!(
            fields = profile.core.len(),
            licenses = profile.licenses.len(),
            services = profile.services.len(),
            "client profile written"
        );
        ProfileReport { profile, outputs }
    }
}
