//! Value Coercion Module
//!
//! 型の揺れたセルテキストを、null・論理値・整数・浮動小数点数・文字列に変換するモジュール。

use serde_json::{Number, Value};

use crate::formatter::cell_text;
use crate::types::CellValue;

/// 値なしとして扱うプレースホルダー（小文字で比較）
pub const NULL_SENTINELS: [&str; 4] = ["not specified", "n/a", "", "none"];

/// `|`区切りの文字列リストとして扱うフィールド名
pub const SAME_AS_FIELD: &str = "sameAs";

/// セルテキストを型付きの値に変換
///
/// # 引数
///
/// * `raw` - セルのテキスト（空セルの場合は`None`）
/// * `field` - フィールド名（`sameAs`のみ特別扱い）
///
/// # 変換規則（上から順に適用）
///
/// 1. `None` → null
/// 2. 前後の空白を除去し、プレースホルダー（大文字小文字を無視）なら null
/// 3. `sameAs`フィールド: `|`で分割した空でない要素のリスト（要素がなければ null）
/// 4. 数字のみ（小数点は1つまで）→ 整数または浮動小数点数
/// 5. `true`/`yes` → true、`false`/`no` → false
/// 6. それ以外は前後の空白を除去した文字列
pub fn coerce_value(raw: Option<&str>, field: &str) -> Value {
    let Some(raw) = raw else {
        return Value::Null;
    };

    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();
    if NULL_SENTINELS.contains(&lowered.as_str()) {
        return Value::Null;
    }

    if field == SAME_AS_FIELD {
        let parts: Vec<Value> = trimmed
            .split('|')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| Value::String(part.to_string()))
            .collect();
        return if parts.is_empty() {
            Value::Null
        } else {
            Value::Array(parts)
        };
    }

    if let Some(number) = parse_number(trimmed) {
        return Value::Number(number);
    }

    match lowered.as_str() {
        "true" | "yes" => Value::Bool(true),
        "false" | "no" => Value::Bool(false),
        _ => Value::String(trimmed.to_string()),
    }
}

/// セル値を型付きの値に変換
pub fn coerce_cell(cell: &CellValue, field: &str) -> Value {
    coerce_value(cell_text(cell).as_deref(), field)
}

/// 数値パターン（小数点を1つ除くと数字のみ）の文字列を数値に変換
///
/// 符号付きの値や指数表記は数値として扱いません。
fn parse_number(s: &str) -> Option<Number> {
    let digits = s.replacen('.', "", 1);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if !s.contains('.') {
        if let Ok(int) = s.parse::<i64>() {
            return Some(Number::from(int));
        }
    }

    s.parse::<f64>().ok().and_then(Number::from_f64)
}
