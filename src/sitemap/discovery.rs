//! File Discovery
//!
//! サイトマップに載せるファイルを探索・解決するヘルパー群。
//! パスはすべてルートからの相対パス（`/`区切り）として扱います。

use std::collections::HashSet;
use std::path::{Component, Path};

use tracing::warn;
use walkdir::WalkDir;

/// ファイルリストのセルを個々の候補に分割する
///
/// `,`・`;`・改行のいずれも区切り文字として扱い、前後の空白を除去して
/// 空の要素は捨てます。
pub fn split_file_list(cell: &str) -> Vec<String> {
    cell.replace(['\r', '\n', ';'], ",")
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// 存在するサイズ0より大きい通常ファイルか
pub fn is_nonempty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// ルートからの相対パスを`/`区切りの文字列にする
///
/// `path`が`root`の配下にない場合は`None`を返します。
pub fn relative_url_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join("/"))
}

/// 候補パスの正規化（`\`→`/`、先頭の`./`と`/`を除去）
fn normalize_candidate(candidate: &str) -> String {
    let mut normalized = candidate.trim().replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized.trim_start_matches('/').to_string()
}

/// ルート配下に留まる相対パスか（`..`・絶対パス・ドライブ指定を含まない）
fn stays_under_root(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// 拡張子が既知のものか（大文字小文字を無視）
fn has_known_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// 候補をルート配下の実ファイルに解決する
///
/// # 引数
///
/// * `root` - 探索のルートディレクトリ
/// * `candidate` - セルに記載されたパスまたはファイル名
/// * `folders` - ファイル名のみの候補を探す既定フォルダー
/// * `extensions` - 既知の拡張子
///
/// # 戻り値
///
/// 解決できた場合は正規化済みの相対パス。まずルートからの直接パスを試し、
/// 既知の拡張子を持つファイル名のみの候補は各既定フォルダー直下も試します。
/// `..`を含むなどルートの外を指す候補は解決しません。
pub fn resolve_candidate(
    root: &Path,
    candidate: &str,
    folders: &[&str],
    extensions: &[&str],
) -> Option<String> {
    let normalized = normalize_candidate(candidate);
    if normalized.is_empty() {
        return None;
    }
    if !stays_under_root(&normalized) {
        warn!(candidate = %candidate, "path points outside the root, skipping");
        return None;
    }

    if is_nonempty_file(&root.join(&normalized)) {
        return Some(normalized);
    }

    if normalized.contains('/') || !has_known_extension(&normalized, extensions) {
        return None;
    }

    folders
        .iter()
        .map(|folder| format!("{}/{}", folder.trim_end_matches('/'), normalized))
        .find(|path| is_nonempty_file(&root.join(path)))
}

/// 既定フォルダー配下を再帰的に走査し、既知の拡張子のファイルを集める
///
/// 存在しないフォルダーは無視します。フォルダーの指定順、各フォルダー内は
/// ファイル名順で返します。シンボリックリンクは辿り、読み込めないエントリーや
/// リンクの循環は警告して読み飛ばします。サイズ0のファイルも含まれるため、
/// 必要に応じて呼び出し側で[`is_nonempty_file`]により絞り込みます。
pub fn scan_folders(root: &Path, folders: &[&str], extensions: &[&str]) -> Vec<String> {
    let mut found = Vec::new();

    for folder in folders {
        let dir = root.join(folder);
        if !dir.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&dir).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(folder = %folder, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !has_known_extension(&name, extensions) {
                continue;
            }
            if let Some(relative) = relative_url_path(root, entry.path()) {
                found.push(relative);
            }
        }
    }

    found
}

/// 正規化済みパスで重複を除去（最初に現れた順序を保持）
pub fn dedupe_paths(paths: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(normalize_candidate(path)))
        .collect()
}
