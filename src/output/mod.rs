//! Output Format Module
//!
//! ドキュメントをJSON / YAMLの2ファイルとして書き出すモジュール。

mod formatters;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::api::OutputFormat;
use crate::error::SheetSiteError;
use crate::types::Document;

pub use formatters::*;

/// 出力フォーマッター（Strategy Pattern）
#[derive(Debug, Clone, Copy)]
pub enum OutputFormatter {
    Json,
    Yaml,
}

impl OutputFormatter {
    /// 出力フォーマットからフォーマッターを生成
    pub fn from_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => OutputFormatter::Json,
            OutputFormat::Yaml => OutputFormatter::Yaml,
        }
    }

    /// ドキュメントを指定されたフォーマットで出力する
    pub fn render<W: std::io::Write>(
        &self,
        document: &Document,
        writer: &mut W,
    ) -> Result<(), SheetSiteError> {
        match self {
            OutputFormatter::Json => JsonFormatter.render(document, writer),
            OutputFormatter::Yaml => YamlFormatter.render(document, writer),
        }
    }
}

/// 1形式分の書き出し失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// 失敗した出力形式
    pub format: OutputFormat,
    /// 書き出し先のパス
    pub path: PathBuf,
    /// エラーメッセージ
    pub message: String,
}

/// JSON / YAMLの書き出し結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairOutcome {
    /// 書き出しに成功したファイル
    pub written: Vec<PathBuf>,
    /// 書き出しに失敗した形式
    pub failures: Vec<WriteFailure>,
}

impl PairOutcome {
    /// 両方の形式の書き出しに成功したか
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// ドキュメントを`<dir>/<stem>.json`と`<dir>/<stem>.yaml`に書き出す
///
/// ディレクトリは必要に応じて作成します。各形式の失敗は個別に記録し、
/// 一方が失敗してももう一方の書き出しを試みます。既存ファイルは上書きされます。
pub fn write_document_pair(document: &Document, dir: &Path, stem: &str) -> PairOutcome {
    let mut outcome = PairOutcome::default();
    let dir_result = std::fs::create_dir_all(dir);

    for format in OutputFormat::ALL {
        let path = dir.join(format!("{}.{}", stem, format.extension()));

        let result = match &dir_result {
            Ok(()) => write_document(document, &path, format),
            Err(e) => Err(SheetSiteError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot create directory {}: {}", dir.display(), e),
            ))),
        };

        match result {
            Ok(()) => {
                info!(path = %path.display(), "wrote {}", format);
                outcome.written.push(path);
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to write {}", format);
                outcome.failures.push(WriteFailure {
                    format,
                    path,
                    message: e.to_string(),
                });
            }
        }
    }

    outcome
}

/// ドキュメントを1つの形式でファイルに書き出す
fn write_document(
    document: &Document,
    path: &Path,
    format: OutputFormat,
) -> Result<(), SheetSiteError> {
    let mut writer = BufWriter::new(File::create(path)?);
    OutputFormatter::from_format(format).render(document, &mut writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use serde_json::json;

    fn sample_record() -> Document {
        let record: Record = json!({"name": "Acme", "founded": 1999})
            .as_object()
            .unwrap()
            .clone();
        Document::Record(record)
    }

    #[test]
    fn test_write_pair_creates_directories() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("schema-files").join("organization");

        let outcome = write_document_pair(&sample_record(), &dir, "main-data");

        assert!(outcome.is_success());
        assert_eq!(outcome.written.len(), 2);
        assert!(dir.join("main-data.json").is_file());
        assert!(dir.join("main-data.yaml").is_file());
    }

    #[test]
    fn test_write_pair_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("main-data.json");
        std::fs::write(&path, "stale content that is longer than the new document").unwrap();

        let outcome = write_document_pair(&sample_record(), temp.path(), "main-data");
        assert!(outcome.is_success());

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"name": "Acme", "founded": 1999}));
    }

    #[test]
    fn test_one_format_failure_does_not_block_other() {
        let temp = tempfile::tempdir().unwrap();
        // JSONの出力先をディレクトリにして書き込みを失敗させる
        std::fs::create_dir(temp.path().join("main-data.json")).unwrap();

        let outcome = write_document_pair(&sample_record(), temp.path(), "main-data");

        assert!(!outcome.is_success());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].format, OutputFormat::Json);
        assert_eq!(outcome.written, vec![temp.path().join("main-data.yaml")]);
    }

    #[test]
    fn test_directory_failure_fails_both_formats() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("schema-files");
        std::fs::write(&blocker, "not a directory").unwrap();

        let outcome = write_document_pair(&sample_record(), &blocker.join("faqs"), "faq");

        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.written.is_empty());
        assert!(outcome.failures[0].message.contains("cannot create directory"));
    }
}
