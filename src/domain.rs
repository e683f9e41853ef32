//! Domain Validation Module
//!
//! クライアント行のドメインを正規化・検証するモジュール。
//! 本番以外のドメイン（プレースホルダー）がサイトマップに出力されることを防ぎます。

use std::fmt;

/// 本番ドメインとして扱わない部分文字列（小文字で比較）
pub const PLACEHOLDER_DOMAINS: [&str; 7] = [
    "example.com",
    "example.org",
    "example.net",
    "yourdomain",
    "your-domain",
    "placeholder",
    "localhost",
];

/// ドメインを採用しなかった理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainRejection {
    /// ドメインが空
    Empty,
    /// プレースホルダーを含む（一致した部分文字列）
    Placeholder(String),
}

impl fmt::Display for DomainRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainRejection::Empty => f.write_str("empty domain"),
            DomainRejection::Placeholder(pattern) => {
                write!(f, "placeholder domain (matches '{}')", pattern)
            }
        }
    }
}

/// ドメインを正規化して検証する
///
/// # 処理
///
/// 1. 前後の空白を除去し、空なら拒否
/// 2. スキームがなければ`https://`を付与
/// 3. 末尾の`/`を除去
/// 4. プレースホルダーを含む場合は拒否（大文字小文字を無視、部分一致）
///
/// # 使用例
///
/// ```rust
/// use sheetsite::normalize_domain;
///
/// assert_eq!(normalize_domain("acme.io").unwrap(), "https://acme.io");
/// assert!(normalize_domain("example.com/path").is_err());
/// ```
pub fn normalize_domain(raw: &str) -> Result<String, DomainRejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainRejection::Empty);
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let normalized = with_scheme.trim_end_matches('/').to_string();

    let lowered = normalized.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_DOMAINS
        .iter()
        .find(|pattern| lowered.contains(*pattern))
    {
        return Err(DomainRejection::Placeholder(pattern.to_string()));
    }

    Ok(normalized)
}

/// クライアント名からファイル名用のスラッグを生成
///
/// 空白・`/`・`\`を`_`に置き換え、小文字にします。
pub fn slugify(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .to_lowercase()
}
