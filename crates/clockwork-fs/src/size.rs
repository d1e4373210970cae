const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable byte count in base-1024 units.
///
/// Values are rounded to two decimals with trailing zeros dropped
/// (`1536` → `"1.5 KB"`); anything past terabytes stays in `TB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert_eq!(format_size(0), "0 Bytes");
    }

    #[test]
    fn below_one_kilobyte() {
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
    }

    #[test]
    fn exact_units() {
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
        assert_eq!(format_size(1024u64.pow(3)), "1 GB");
        assert_eq!(format_size(1024u64.pow(4)), "1 TB");
    }

    #[test]
    fn fractional_values_are_trimmed() {
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1300), "1.27 KB");
        assert_eq!(format_size(10 * 1024 + 10), "10.01 KB");
    }

    #[test]
    fn terabytes_is_the_last_unit() {
        assert_eq!(format_size(2048 * 1024u64.pow(4)), "2048 TB");
    }
}
