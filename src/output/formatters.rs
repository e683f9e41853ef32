//! Output Formatters Implementation
//!
//! 各出力フォーマットの実装を提供するモジュール。

use std::io::Write;

use crate::error::SheetSiteError;
use crate::types::Document;

/// JSON形式のフォーマッター
///
/// 2スペースインデント、非ASCII文字はエスケープせずUTF-8のまま出力します。
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn render<W: Write>(
        &self,
        document: &Document,
        writer: &mut W,
    ) -> Result<(), SheetSiteError> {
        serde_json::to_writer_pretty(&mut *writer, document)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// YAML形式のフォーマッター
///
/// ブロックスタイルで、キーは挿入順のまま出力します。
pub struct YamlFormatter;

impl YamlFormatter {
    pub fn render<W: Write>(
        &self,
        document: &Document,
        writer: &mut W,
    ) -> Result<(), SheetSiteError> {
        let yaml = serde_saphyr::to_string(document)
            .map_err(|e| SheetSiteError::Yaml(e.to_string()))?;
        writer.write_all(yaml.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
