const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Scale a byte quantity down the 1024 ladder and format it with one
/// decimal place. `rate` appends the per-second suffix. Values below
/// 1024 (including zero and negatives) format literally.
pub fn humanize(value: f64, rate: bool) -> String {
    let mut value = value;
    let mut idx = 0;
    while value >= 1024.0 && idx < UNITS.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    let suffix = if rate { "/s" } else { "" };
    format!("{:.1} {}{}", value, UNITS[idx], suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_to_kilobytes() {
        assert_eq!(humanize(1536.0, false), "1.5 KB");
    }

    #[test]
    fn scales_rate_to_megabytes() {
        assert_eq!(humanize(1_048_576.0, true), "1.0 MB/s");
    }

    #[test]
    fn small_values_stay_in_bytes() {
        assert_eq!(humanize(500.0, false), "500.0 B");
    }

    #[test]
    fn zero_formats_literally() {
        assert_eq!(humanize(0.0, true), "0.0 B/s");
    }

    #[test]
    fn negative_values_format_literally() {
        assert_eq!(humanize(-2048.0, false), "-2048.0 B");
    }

    #[test]
    fn ladder_stops_at_terabytes() {
        let five_levels = 1024f64.powi(5);
        assert_eq!(humanize(five_levels, false), "1024.0 TB");
    }
}
