//! Client Sitemap Assembler
//!
//! クライアント一覧のワークブックを読み込み、行ごとにサイトマップを生成するモジュール。
//! 各行の結果と最終集計は実行レポートとして保存されます。

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::discovery::{
    dedupe_paths, is_nonempty_file, resolve_candidate, scan_folders, split_file_list,
};
use super::{join_url, write_sitemap, SitemapEntry};
use crate::domain::{normalize_domain, slugify};
use crate::error::SheetSiteError;
use crate::formatter::cell_text;
use crate::parser::WorkbookParser;
use crate::types::CellValue;

/// ドメインとして扱う列名（優先順）
pub const DOMAIN_COLUMNS: [&str; 4] = ["domain", "website", "site_url", "url"];

/// スラッグとして扱う列名（優先順）
pub const SLUG_COLUMNS: [&str; 5] = ["slug", "client_slug", "client_name", "client", "name"];

/// ファイルリストとして扱う列名
pub const FILE_LIST_COLUMNS: [&str; 6] = [
    "files",
    "file_paths",
    "paths",
    "json_files",
    "yaml_files",
    "schema_files",
];

/// ファイルリスト列がない場合に走査する既定フォルダー
pub const DEFAULT_FOLDERS: [&str; 3] = ["schema-files", "locations", "ai-content"];

/// 既知の拡張子
pub const DEFAULT_EXTENSIONS: [&str; 5] = ["json", "yaml", "yml", "md", "txt"];

/// 既定の出力ディレクトリ（ルートからの相対パス）
pub const DEFAULT_OUT_DIR: &str = "client-sitemaps";

/// 実行レポートのファイル名
pub const REPORT_FILE: &str = "report.txt";

#[derive(Debug, Clone)]
struct ClientConfig {
    root: PathBuf,
    out_dir: PathBuf,
    folders: Vec<String>,
    extensions: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            folders: DEFAULT_FOLDERS.iter().map(|s| s.to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `ClientSitemapAssembler`のビルダー
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetsite::{ClientRunOutcome, ClientSitemapBuilder};
///
/// # fn main() -> Result<(), sheetsite::SheetSiteError> {
/// let assembler = ClientSitemapBuilder::new().with_root("site").build()?;
/// match assembler.run("data/clients.xlsx".as_ref()) {
///     ClientRunOutcome::Completed { report } => println!("{}", report.summary_line()),
///     ClientRunOutcome::Failed { error, .. } => eprintln!("{}", error),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ClientSitemapBuilder {
    config: ClientConfig,
}

impl ClientSitemapBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - ルート: カレントディレクトリ
    /// - 出力ディレクトリ: `client-sitemaps`
    /// - 既定フォルダー: `schema-files`, `locations`, `ai-content`
    /// - 拡張子: `json`, `yaml`, `yml`, `md`, `txt`
    pub fn new() -> Self {
        Self::default()
    }

    /// ルートディレクトリを指定する
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// 出力ディレクトリを指定する（相対パスはルート基準）
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = out_dir.into();
        self
    }

    /// 既定フォルダーを指定する
    pub fn with_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.folders = folders.into_iter().map(Into::into).collect();
        self
    }

    /// 既知の拡張子を指定する（先頭の`.`は不要）
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// 設定を検証し、`ClientSitemapAssembler`インスタンスを生成する
    pub fn build(self) -> Result<ClientSitemapAssembler, SheetSiteError> {
        if self.config.out_dir.as_os_str().is_empty() {
            return Err(SheetSiteError::Config(
                "Output directory must not be empty".to_string(),
            ));
        }
        if self.config.folders.iter().all(|folder| folder.trim().is_empty()) {
            return Err(SheetSiteError::Config(
                "At least one default folder is required".to_string(),
            ));
        }
        if self.config.extensions.iter().all(|ext| ext.is_empty()) {
            return Err(SheetSiteError::Config(
                "At least one file extension is required".to_string(),
            ));
        }

        Ok(ClientSitemapAssembler {
            config: self.config,
        })
    }
}

/// 1行分の処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// サイトマップを書き出した
    Written {
        row: usize,
        path: PathBuf,
        urls: usize,
    },
    /// 検証に失敗したため読み飛ばした
    Skipped { row: usize, reason: String },
    /// 書き出し中にエラーが発生した
    Error { row: usize, message: String },
}

impl RowOutcome {
    /// シート上の行番号
    pub fn row(&self) -> usize {
        match self {
            RowOutcome::Written { row, .. }
            | RowOutcome::Skipped { row, .. }
            | RowOutcome::Error { row, .. } => *row,
        }
    }
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOutcome::Written { row, path, urls } => {
                write!(f, "Row {}: wrote {} ({} URLs)", row, path.display(), urls)
            }
            RowOutcome::Skipped { row, reason } => write!(f, "Row {}: skipped ({})", row, reason),
            RowOutcome::Error { row, message } => write!(f, "Row {}: error ({})", row, message),
        }
    }
}

/// 実行レポート
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    rows: Vec<RowOutcome>,
    failure: Vec<String>,
}

impl RunReport {
    /// 行ごとの処理結果
    pub fn rows(&self) -> &[RowOutcome] {
        &self.rows
    }

    pub fn written_count(&self) -> usize {
        self.count(|row| matches!(row, RowOutcome::Written { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|row| matches!(row, RowOutcome::Skipped { .. }))
    }

    pub fn error_count(&self) -> usize {
        self.count(|row| matches!(row, RowOutcome::Error { .. }))
    }

    /// 集計行
    pub fn summary_line(&self) -> String {
        format!(
            "Summary: {} sitemap(s) written, {} row(s) skipped, {} error(s)",
            self.written_count(),
            self.skipped_count(),
            self.error_count()
        )
    }

    /// レポート全体のテキスト（行結果、集計行、実行失敗時はエラー詳細）
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.rows.iter().map(ToString::to_string).collect();
        lines.push(self.summary_line());
        lines.extend(self.failure.iter().cloned());

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    fn push(&mut self, outcome: RowOutcome) {
        match &outcome {
            RowOutcome::Written { .. } => info!("{}", outcome),
            RowOutcome::Skipped { .. } => warn!("{}", outcome),
            RowOutcome::Error { .. } => error!("{}", outcome),
        }
        self.rows.push(outcome);
    }

    fn record_failure(&mut self, error: &SheetSiteError) {
        self.failure.push(format!("Error: {}", error));
        self.failure.extend(error.trace().lines().map(str::to_string));
    }

    fn count(&self, predicate: impl Fn(&RowOutcome) -> bool) -> usize {
        self.rows.iter().filter(|row| predicate(row)).count()
    }
}

/// クライアントサイトマップ生成全体の結果
///
/// 実行失敗時もそれまでの部分的なレポートを保持し、レポートファイルは常に書き出されます。
#[derive(Debug)]
pub enum ClientRunOutcome {
    /// すべての行を処理した（行単位の失敗はレポートに記録）
    Completed { report: RunReport },
    /// 行の処理を中断した
    Failed {
        report: RunReport,
        error: SheetSiteError,
    },
}

impl ClientRunOutcome {
    pub fn report(&self) -> &RunReport {
        match self {
            ClientRunOutcome::Completed { report } | ClientRunOutcome::Failed { report, .. } => {
                report
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ClientRunOutcome::Completed { .. })
    }
}

/// ヘッダー行から解決した列の位置
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    domain: usize,
    slug: Option<usize>,
    files: Vec<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String], sheet: &str) -> Result<Self, SheetSiteError> {
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| header.iter().position(|column| column == name))
        };

        let domain = find(&DOMAIN_COLUMNS).ok_or_else(|| SheetSiteError::MissingColumn {
            column: DOMAIN_COLUMNS.join("|"),
            sheet: sheet.to_string(),
        })?;

        let files = header
            .iter()
            .enumerate()
            .filter(|(_, column)| FILE_LIST_COLUMNS.contains(&column.as_str()))
            .map(|(index, _)| index)
            .collect();

        Ok(Self {
            domain,
            slug: find(&SLUG_COLUMNS),
            files,
        })
    }
}

/// ヘッダー名の正規化（前後の空白を除去、小文字化、空白を`_`に置換）
fn normalize_header(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// 行の指定列のテキスト（空白のみは`None`）
fn cell_at(row: &[CellValue], index: usize) -> Option<String> {
    row.get(index)
        .and_then(cell_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn is_blank_row(row: &[CellValue]) -> bool {
    (0..row.len()).all(|index| cell_at(row, index).is_none())
}

/// 未使用のスラッグを確保する
///
/// 既に使われている場合は`<スラッグ>-<行番号>`を試し、それも使用済みなら`None`。
fn claim_slug(used: &mut HashSet<String>, slug: String, row_number: usize) -> Option<String> {
    if used.insert(slug.clone()) {
        return Some(slug);
    }

    let renamed = format!("{}-{}", slug, row_number);
    if used.insert(renamed.clone()) {
        warn!(row = row_number, slug = %slug, renamed = %renamed, "duplicate slug, renaming");
        Some(renamed)
    } else {
        None
    }
}

/// クライアント一覧からサイトマップを生成するファサード
#[derive(Debug)]
pub struct ClientSitemapAssembler {
    config: ClientConfig,
}

impl ClientSitemapAssembler {
    /// ワークブックの全行を処理し、レポートを保存する
    ///
    /// ワークブックの読み込み失敗やドメイン列の欠落は`ClientRunOutcome::Failed`となり、
    /// エラーと原因チェーンを追記した部分的なレポートが保存されます。
    pub fn run(&self, input: &Path) -> ClientRunOutcome {
        let mut report = RunReport::default();

        let outcome = match self.process(input, &mut report) {
            Ok(()) => ClientRunOutcome::Completed { report },
            Err(e) => {
                error!(input = %input.display(), error = %e, "client sitemap run failed");
                report.record_failure(&e);
                ClientRunOutcome::Failed { report, error: e }
            }
        };

        self.persist_report(outcome.report());
        outcome
    }

    /// 出力ディレクトリ
    pub fn out_dir(&self) -> PathBuf {
        self.config.root.join(&self.config.out_dir)
    }

    /// レポートファイルのパス
    pub fn report_path(&self) -> PathBuf {
        self.out_dir().join(REPORT_FILE)
    }

    /// 処理フロー
    ///
    /// 1. 最初のシートを読み込み、ヘッダー行から列を解決
    /// 2. ファイルリスト列がなければ既定フォルダーを1度だけ走査
    /// 3. 空行を除く各データ行を処理してレポートに記録（スラッグの重複は行番号で回避）
    fn process(&self, input: &Path, report: &mut RunReport) -> Result<(), SheetSiteError> {
        let mut parser = WorkbookParser::open_path(input)?;
        let sheet = parser
            .first_sheet()
            .ok_or_else(|| SheetSiteError::Config("Client workbook has no sheets".to_string()))?;
        let grid = parser.read_grid(&sheet)?;

        let header: Vec<String> = grid
            .header()
            .iter()
            .map(String::as_str)
            .map(normalize_header)
            .collect();
        let columns = ColumnMap::from_header(&header, &sheet)?;
        info!(sheet = %sheet, rows = grid.row_count().saturating_sub(1), "processing clients");

        let discovered = if columns.files.is_empty() {
            let found = self.discover();
            info!(files = found.len(), "discovered files in default folders");
            Some(found)
        } else {
            None
        };

        let mut used_slugs = HashSet::new();
        for (index, row) in grid.rows().iter().enumerate().skip(1) {
            if is_blank_row(row) {
                continue;
            }
            let row_number = grid.sheet_row_number(index);
            report.push(self.process_row(
                row_number,
                row,
                &columns,
                discovered.as_deref(),
                &mut used_slugs,
            ));
        }

        Ok(())
    }

    /// 1行分のサイトマップを生成
    fn process_row(
        &self,
        row_number: usize,
        row: &[CellValue],
        columns: &ColumnMap,
        discovered: Option<&[String]>,
        used_slugs: &mut HashSet<String>,
    ) -> RowOutcome {
        let raw_domain = cell_at(row, columns.domain).unwrap_or_default();
        let domain = match normalize_domain(&raw_domain) {
            Ok(domain) => domain,
            Err(rejection) => {
                return RowOutcome::Skipped {
                    row: row_number,
                    reason: rejection.to_string(),
                }
            }
        };

        let slug = columns
            .slug
            .and_then(|index| cell_at(row, index))
            .map(|name| slugify(&name))
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| format!("client-{}", row_number));
        let Some(slug) = claim_slug(used_slugs, slug, row_number) else {
            return RowOutcome::Skipped {
                row: row_number,
                reason: "duplicate slug".to_string(),
            };
        };

        let paths = match discovered {
            Some(found) => found.to_vec(),
            None => self.resolve_listed(row, &columns.files),
        };
        let paths = dedupe_paths(paths);

        let path = self.out_dir().join(format!("{}-sitemap.xml", slug));
        let result = self
            .build_entries(&domain, &paths)
            .and_then(|entries| write_sitemap(&path, &entries).map(|()| entries.len()));

        match result {
            Ok(urls) => RowOutcome::Written {
                row: row_number,
                path,
                urls,
            },
            Err(e) => RowOutcome::Error {
                row: row_number,
                message: e.to_string(),
            },
        }
    }

    /// ファイルリスト列に記載された候補を実ファイルに解決
    fn resolve_listed(&self, row: &[CellValue], file_columns: &[usize]) -> Vec<String> {
        let folders = self.folders();
        let extensions = self.extensions();

        file_columns
            .iter()
            .filter_map(|&index| cell_at(row, index))
            .flat_map(|cell| split_file_list(&cell))
            .filter_map(|candidate| {
                let resolved =
                    resolve_candidate(&self.config.root, &candidate, &folders, &extensions);
                if resolved.is_none() {
                    warn!(candidate = %candidate, "file not found or empty, skipping");
                }
                resolved
            })
            .collect()
    }

    /// 既定フォルダー配下の空でないファイル
    fn discover(&self) -> Vec<String> {
        let root = &self.config.root;
        scan_folders(root, &self.folders(), &self.extensions())
            .into_iter()
            .filter(|path| is_nonempty_file(&root.join(path)))
            .collect()
    }

    /// 各ファイルの更新日時を`lastmod`とするエントリーを生成
    fn build_entries(
        &self,
        domain: &str,
        paths: &[String],
    ) -> Result<Vec<SitemapEntry>, SheetSiteError> {
        paths
            .iter()
            .map(|path| {
                let modified = std::fs::metadata(self.config.root.join(path))?.modified()?;
                Ok(SitemapEntry::new(
                    join_url(domain, path),
                    DateTime::<Utc>::from(modified),
                ))
            })
            .collect()
    }

    /// レポートをファイルに保存し、ログにも出力する
    fn persist_report(&self, report: &RunReport) {
        let text = report.render();
        for line in text.lines() {
            info!("{}", line);
        }

        let path = self.report_path();
        let result = std::fs::create_dir_all(self.out_dir())
            .and_then(|()| std::fs::write(&path, &text));
        match result {
            Ok(()) => info!(path = %path.display(), "report written"),
            Err(e) => error!(path = %path.display(), error = %e, "failed to write report"),
        }
    }

    fn folders(&self) -> Vec<&str> {
        self.config
            .folders
            .iter()
            .map(|folder| folder.trim())
            .filter(|folder| !folder.is_empty())
            .collect()
    }

    fn extensions(&self) -> Vec<&str> {
        self.config
            .extensions
            .iter()
            .map(String::as_str)
            .filter(|ext| !ext.is_empty())
            .collect()
    }
}
