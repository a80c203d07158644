//! Human-readable byte and rate formatting helpers.
//!
//! The dashboard reads in byte units (KB/s, MB/s) with a 1024 base, matching
//! what the backend reports.

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Format a byte count into a human-readable string (e.g., "1.2 MB").
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_bytes(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes >= GIB {
        format!("{:.2} GB", bytes / GIB)
    } else if bytes >= MIB {
        format!("{:.2} MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{:.2} KB", bytes / KIB)
    } else {
        format!("{bytes:.0} B")
    }
}

/// Format a rate in bytes/sec as "245.1 KB/s".
pub fn fmt_rate(bytes_per_sec: f64) -> String {
    if bytes_per_sec >= GIB {
        format!("{:.2} GB/s", bytes_per_sec / GIB)
    } else if bytes_per_sec >= MIB {
        format!("{:.2} MB/s", bytes_per_sec / MIB)
    } else if bytes_per_sec >= KIB {
        format!("{:.1} KB/s", bytes_per_sec / KIB)
    } else {
        format!("{bytes_per_sec:.0} B/s")
    }
}

/// Compact rate for chart Y-axis labels: "500K", "1.2M".
pub fn fmt_rate_axis(bytes_per_sec: f64) -> String {
    if bytes_per_sec >= GIB {
        format!("{:.1}G", bytes_per_sec / GIB)
    } else if bytes_per_sec >= MIB {
        format!("{:.1}M", bytes_per_sec / MIB)
    } else if bytes_per_sec >= KIB {
        format!("{:.0}K", bytes_per_sec / KIB)
    } else {
        format!("{bytes_per_sec:.0}")
    }
}

/// Render a percentage bar split into filled and empty portions.
///
/// Returns `(filled, empty)` strings of `█` and `░` characters that together
/// span `width` character positions. Caller applies styling per segment.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn fmt_pct_bar(pct: f64, width: u16) -> (String, String) {
    let clamped = pct.clamp(0.0, 100.0);
    let filled_count = ((clamped / 100.0) * f64::from(width)).round() as u16;
    let empty_count = width.saturating_sub(filled_count);
    (
        "█".repeat(usize::from(filled_count)),
        "░".repeat(usize::from(empty_count)),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bytes_pick_the_right_unit() {
        assert_eq!(fmt_bytes(0), "0 B");
        assert_eq!(fmt_bytes(512), "512 B");
        assert_eq!(fmt_bytes(2048), "2.00 KB");
        assert_eq!(fmt_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(fmt_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn rates_pick_the_right_unit() {
        assert_eq!(fmt_rate(100.0), "100 B/s");
        assert_eq!(fmt_rate(1536.0), "1.5 KB/s");
        assert_eq!(fmt_rate(2.5 * 1024.0 * 1024.0), "2.50 MB/s");
    }

    #[test]
    fn axis_labels_are_compact() {
        assert_eq!(fmt_rate_axis(0.0), "0");
        assert_eq!(fmt_rate_axis(2048.0), "2K");
        assert_eq!(fmt_rate_axis(1.5 * 1024.0 * 1024.0), "1.5M");
    }

    #[test]
    fn pct_bar_fills_proportionally() {
        let (filled, empty) = fmt_pct_bar(50.0, 10);
        assert_eq!(filled.chars().count(), 5);
        assert_eq!(empty.chars().count(), 5);

        let (filled, empty) = fmt_pct_bar(150.0, 4);
        assert_eq!(filled.chars().count(), 4);
        assert!(empty.is_empty());
    }
}
