//! Stock display formatters.
//!
//! A formatter maps `(current_seconds, total_seconds)` to the string a
//! presentation layer shows. Both functions here are pure.

/// `"<floor(current)>/<total>"`, or `""` while the floored value is zero.
///
/// The empty string doubles as the idle/reset visual state.
pub fn default_display(current: f64, total: f64) -> String {
    let whole = current.floor();
    if whole == 0.0 {
        return String::new();
    }
    format!("{whole}/{total}")
}

/// `MM:SS`, or `H:MM:SS` once the value reaches an hour. `total` is ignored.
///
/// Negative values render with a leading minus sign.
pub fn clock(current: f64, _total: f64) -> String {
    let whole = current.floor();
    let sign = if whole < 0.0 { "-" } else { "" };
    let secs = whole.abs() as u64;

    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{sign}{h}:{m:02}:{s:02}")
    } else {
        format!("{sign}{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── default_display ───────────────────────────────────────────────────

    #[test]
    fn default_hides_zero() {
        assert_eq!(default_display(0.0, 10.0), "");
        assert_eq!(default_display(0.75, 10.0), "");
    }

    #[test]
    fn default_renders_floored_over_total() {
        assert_eq!(default_display(7.0, 10.0), "7/10");
        assert_eq!(default_display(7.9, 10.0), "7/10");
    }

    #[test]
    fn default_keeps_fractional_total() {
        assert_eq!(default_display(2.5, 2.5), "2/2.5");
    }

    #[test]
    fn default_is_pure() {
        let a = default_display(3.0, 4.0);
        let _ = default_display(9.0, 1.0);
        assert_eq!(default_display(3.0, 4.0), a);
    }

    // ── clock ─────────────────────────────────────────────────────────────

    #[test]
    fn clock_minutes_seconds() {
        assert_eq!(clock(0.0, 0.0), "00:00");
        assert_eq!(clock(65.4, 0.0), "01:05");
        assert_eq!(clock(599.99, 0.0), "09:59");
    }

    #[test]
    fn clock_hours() {
        assert_eq!(clock(3600.0, 0.0), "1:00:00");
        assert_eq!(clock(3723.0, 0.0), "1:02:03");
    }

    #[test]
    fn clock_negative() {
        assert_eq!(clock(-5.0, 0.0), "-00:05");
    }
}
