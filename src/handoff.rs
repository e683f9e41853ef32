//! Site URL Handoff
//!
//! 変換処理で決定したサイトのベースURLを、サイトマップ生成処理へ受け渡すための
//! テキストファイルを読み書きするモジュール。

use std::io;
use std::path::Path;

use crate::error::SheetSiteError;

/// ルートからのハンドオフファイルの相対パス
pub const HANDOFF_PATH: &str = ".github/config/site_url.txt";

/// ベースURLが決定できない場合の既定値
pub const DEFAULT_BASE_URL: &str = "https://example.com";

/// ベースURLをハンドオフファイルに書き出す
///
/// 親ディレクトリは必要に応じて作成します。値は前後の空白を除去して保存し、
/// 末尾に改行は付けません。
pub fn write_site_url(path: &Path, url: &str) -> Result<(), SheetSiteError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, url.trim())?;
    Ok(())
}

/// ハンドオフファイルからベースURLを読み込む
///
/// # 戻り値
///
/// * `Ok(Some(url))` - 空でない値が保存されている場合（前後の空白は除去）
/// * `Ok(None)` - ファイルが存在しない、または空の場合
/// * `Err(SheetSiteError::Io)` - 読み込みに失敗した場合
pub fn read_site_url(path: &Path) -> Result<Option<String>, SheetSiteError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let url = content.trim();
            Ok((!url.is_empty()).then(|| url.to_string()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// ベースURLを決定する
///
/// 優先順位: ハンドオフの値 → フォールバック値 → `https://example.com`。
/// いずれの場合も末尾の`/`は取り除きます。
pub fn resolve_base_url(handoff: Option<&str>, fallback: Option<&str>) -> String {
    let chosen = [handoff, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BASE_URL);

    chosen.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(HANDOFF_PATH);

        write_site_url(&path, "  https://acme.io \n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "https://acme.io");
        assert_eq!(read_site_url(&path).unwrap(), Some("https://acme.io".to_string()));
    }

    #[test]
    fn test_read_missing_or_blank() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("site_url.txt");
        assert_eq!(read_site_url(&path).unwrap(), None);

        std::fs::write(&path, " \n").unwrap();
        assert_eq!(read_site_url(&path).unwrap(), None);
    }

    #[test]
    fn test_resolve_base_url_priority() {
        assert_eq!(
            resolve_base_url(Some("https://acme.io/"), Some("https://fallback.io")),
            "https://acme.io"
        );
        assert_eq!(
            resolve_base_url(None, Some("https://fallback.io//")),
            "https://fallback.io"
        );
        assert_eq!(resolve_base_url(Some("  "), None), "https://example.com");
        assert_eq!(resolve_base_url(None, None), DEFAULT_BASE_URL);
    }
}
