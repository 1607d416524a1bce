//! Human-readable byte sizes and savings arithmetic.

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const K: f64 = 1024.0;

/// Formats a byte count as `<value> <unit>` using the largest unit with value ≥ 1.
///
/// Values are rounded to two decimals with trailing zeros dropped, so
/// `1024` is `"1 KB"` and `1536` is `"1.5 KB"`. Units stop at TB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    // Integer unit selection avoids log() rounding at exact powers of 1024
    let mut unit = 0;
    let mut scale = 1u64;
    while unit < UNITS.len() - 1 && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = bytes as f64 / scale as f64;
    format!("{} {}", trim_decimals(value, 2), UNITS[unit])
}

/// Same as [`format_bytes`] but for signed deltas such as savings.
pub fn format_signed_bytes(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", format_bytes(bytes.unsigned_abs()))
    } else {
        format_bytes(bytes as u64)
    }
}

/// Bytes saved going from `original` to `compressed`; negative if the output grew.
///
/// Saturates at the `i64` range.
pub fn saved_bytes(original: u64, compressed: u64) -> i64 {
    let delta = i128::from(original) - i128::from(compressed);
    delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Percentage of `original` saved, rounded to one decimal. Zero when `original` is zero.
pub fn percentage_saved(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let pct = saved_bytes(original, compressed) as f64 / original as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Kilobytes for log lines.
pub fn kib(bytes: u64) -> f64 {
    bytes as f64 / K
}

fn trim_decimals(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value);
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}
