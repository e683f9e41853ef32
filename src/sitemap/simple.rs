//! Simple Sitemap Assembler
//!
//! 変換処理で生成した`schema-files`配下のJSON / YAMLファイルを列挙し、
//! 1つのサイトマップにまとめるモジュール。

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::discovery::scan_folders;
use super::{join_url, write_sitemap, SitemapEntry};
use crate::error::SheetSiteError;
use crate::handoff::{read_site_url, resolve_base_url, HANDOFF_PATH};

/// 列挙対象のディレクトリ（ルートからの相対パス）
pub const SCHEMA_DIR: &str = "schema-files";

/// 列挙対象の拡張子
pub const SCHEMA_EXTENSIONS: [&str; 2] = ["json", "yaml"];

/// 既定の出力ファイル（ルートからの相対パス）
pub const DEFAULT_SITEMAP_FILE: &str = "ai-sitemap.xml";

#[derive(Debug, Clone)]
struct SitemapConfig {
    root: PathBuf,
    output: PathBuf,
    fallback_url: Option<String>,
    handoff_path: PathBuf,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_SITEMAP_FILE),
            fallback_url: None,
            handoff_path: PathBuf::from(HANDOFF_PATH),
        }
    }
}

/// `SitemapAssembler`のビルダー
///
/// # 使用例
///
/// ```rust,no_run
/// use sheetsite::SitemapBuilder;
///
/// # fn main() -> Result<(), sheetsite::SheetSiteError> {
/// let summary = SitemapBuilder::new().with_root("site").build()?.assemble()?;
/// println!("{} URL(s) -> {}", summary.url_count(), summary.output_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SitemapBuilder {
    config: SitemapConfig,
}

impl SitemapBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    pub fn new() -> Self {
        Self::default()
    }

    /// ルートディレクトリを指定する
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// 出力ファイルを指定する（相対パスはルート基準）
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.config.output = output.into();
        self
    }

    /// ハンドオフファイルがない場合に使用するURLを指定する
    pub fn with_fallback_url(mut self, url: Option<String>) -> Self {
        self.config.fallback_url = url;
        self
    }

    /// ハンドオフファイルのパス（ルートからの相対パス）を指定する
    pub fn with_handoff_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.handoff_path = path.into();
        self
    }

    /// 設定を検証し、`SitemapAssembler`インスタンスを生成する
    pub fn build(self) -> Result<SitemapAssembler, SheetSiteError> {
        if self.config.output.as_os_str().is_empty() {
            return Err(SheetSiteError::Config(
                "Sitemap output path must not be empty".to_string(),
            ));
        }
        if self.config.handoff_path.as_os_str().is_empty() {
            return Err(SheetSiteError::Config(
                "Handoff path must not be empty".to_string(),
            ));
        }

        Ok(SitemapAssembler {
            config: self.config,
        })
    }
}

/// サイトマップ生成の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapSummary {
    /// 使用したベースURL
    pub base_url: String,
    /// 書き出したサイトマップ
    pub output_path: PathBuf,
    /// 出力したエントリー（URL順）
    pub entries: Vec<SitemapEntry>,
}

impl SitemapSummary {
    pub fn url_count(&self) -> usize {
        self.entries.len()
    }
}

/// `schema-files`配下のファイルから1つのサイトマップを生成する
#[derive(Debug)]
pub struct SitemapAssembler {
    config: SitemapConfig,
}

impl SitemapAssembler {
    /// 現在時刻を`lastmod`としてサイトマップを生成
    pub fn assemble(&self) -> Result<SitemapSummary, SheetSiteError> {
        self.assemble_at(Utc::now())
    }

    /// 指定時刻を全エントリー共通の`lastmod`としてサイトマップを生成
    ///
    /// # 処理フロー
    ///
    /// 1. ハンドオフファイル → フォールバック → `https://example.com`の順にベースURLを決定
    /// 2. `schema-files`配下の`.json` / `.yaml`を再帰的に列挙（パス順、重複なし）
    /// 3. `<ベースURL>/<相対パス>`をURLとして書き出し
    pub fn assemble_at(&self, now: DateTime<Utc>) -> Result<SitemapSummary, SheetSiteError> {
        let root = &self.config.root;
        let base_url = resolve_base_url(
            self.read_handoff().as_deref(),
            self.config.fallback_url.as_deref(),
        );
        info!(base_url = %base_url, "resolved site URL");

        let mut paths = scan_folders(root, &[SCHEMA_DIR], &SCHEMA_EXTENSIONS);
        paths.sort();
        paths.dedup();

        let entries: Vec<SitemapEntry> = paths
            .iter()
            .map(|path| SitemapEntry::new(join_url(&base_url, path), now))
            .collect();

        let output_path = root.join(&self.config.output);
        write_sitemap(&output_path, &entries)?;
        info!(
            path = %output_path.display(),
            urls = entries.len(),
            "sitemap generated"
        );

        Ok(SitemapSummary {
            base_url,
            output_path,
            entries,
        })
    }

    /// ハンドオフファイルの値（読み込めない場合は警告してなし扱い）
    fn read_handoff(&self) -> Option<String> {
        let path = self.config.root.join(&self.config.handoff_path);
        match read_site_url(&path) {
            Ok(url) => url,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read site URL");
                None
            }
        }
    }
}
