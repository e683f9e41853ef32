//! Formatter Module
//!
//! セル値を型変換前のテキストに変換するモジュール。
//! 数値・論理値・日時は、表計算データを読み込んだときの一般的な表記に揃えます。

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::types::CellValue;

/// 1日あたりの秒数
const SECONDS_PER_DAY: f64 = 86_400.0;

/// セル値をテキストに変換
///
/// # 戻り値
///
/// * `Some(String)` - セルに値がある場合
/// * `None` - 空セルの場合
///
/// # 変換規則
///
/// - 文字列: そのまま
/// - 論理値: `True` / `False`
/// - 数値: 整数値は小数部なし（`5`）、それ以外は最短表現（`9.99`）
/// - 日時: `YYYY-MM-DD`（時刻部分がある場合は`YYYY-MM-DD HH:MM:SS`）
/// - エラー値: エラーコード（`#DIV/0!`）
pub fn cell_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::String(s) => Some(s.clone()),
        CellValue::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        CellValue::Number(n) => Some(format_number(*n)),
        CellValue::DateTime(serial) => {
            Some(DateFormatter.format(*serial).unwrap_or_else(|| format_number(*serial)))
        }
        CellValue::Error(e) => Some(e.clone()),
    }
}

/// 数値をテキストに変換
///
/// `i64`に収まる整数値は小数点なしで出力します。
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値を文字列に変換します。
///
/// # エポックシステム
///
/// 1900年システム（1899年12月30日起算）のみを扱います。
/// シリアル値60（存在しない1900-02-29）以前の値は1日ずれますが、
/// 実データでは問題になりません。
#[derive(Debug)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// 日付値をフォーマット
    ///
    /// # 戻り値
    ///
    /// * `Some(String)` - 変換に成功した場合
    /// * `None` - 範囲外の値の場合
    pub fn format(&self, serial_value: f64) -> Option<String> {
        let datetime = self.to_datetime(serial_value)?;
        if datetime.time() == NaiveTime::from_hms_opt(0, 0, 0)? {
            Some(datetime.format("%Y-%m-%d").to_string())
        } else {
            Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
        }
    }

    /// シリアル値を日時に変換（秒未満は四捨五入）
    fn to_datetime(&self, serial_value: f64) -> Option<NaiveDateTime> {
        if !serial_value.is_finite() || serial_value < 0.0 {
            return None;
        }

        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let days = serial_value.floor();
        let seconds = ((serial_value - days) * SECONDS_PER_DAY).round() as i64;

        epoch
            .checked_add_signed(Duration::days(days as i64))?
            .checked_add_signed(Duration::seconds(seconds))
    }
}
