//! Parsers for human-readable sizes, durations, and CPU quantities.

use std::time::Duration;

const SIZE_SUFFIXES: &[(&str, i64)] = &[
    ("TI", 1 << 40),
    ("GI", 1 << 30),
    ("MI", 1 << 20),
    ("KI", 1 << 10),
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
    ("B", 1),
];

/// Parses a human-readable size string (e.g., "100MB", "1GB", "50Mi") into
/// bytes. Supported suffixes: B, KB, MB, GB, TB and Kubernetes-style Ki, Mi,
/// Gi, Ti (case-insensitive, binary units).
pub fn parse_size(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".to_string());
    }
    let upper = s.to_uppercase();

    for (suffix, mult) in SIZE_SUFFIXES {
        if let Some(num) = upper.strip_suffix(suffix) {
            let n: i64 = num
                .trim()
                .parse()
                .map_err(|e| format!("invalid size number: {e}"))?;
            if n < 0 {
                return Err("size cannot be negative".to_string());
            }
            return n
                .checked_mul(*mult)
                .ok_or_else(|| "size overflow: value too large".to_string());
        }
    }

    // No suffix, treat as bytes
    let n: i64 = upper.parse().map_err(|e| format!("invalid size: {e}"))?;
    if n < 0 {
        return Err("size cannot be negative".to_string());
    }
    Ok(n)
}

/// Formats bytes as a human-readable string.
pub fn format_size(bytes: i64) -> String {
    const KB: i64 = 1 << 10;
    const MB: i64 = 1 << 20;
    const GB: i64 = 1 << 30;
    const TB: i64 = 1 << 40;

    match bytes {
        b if b >= TB => format!("{:.1}TB", b as f64 / TB as f64),
        b if b >= GB => format!("{:.1}GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1}MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1}KB", b as f64 / KB as f64),
        b => format!("{b}B"),
    }
}

/// Parses a duration string ("100ms", "5m", "1h30m").
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim()).map_err(|e| format!("invalid duration: {e}"))
}

/// Parses a CPU quantity into the duration of CPU time consumed per
/// one-second tick. Accepts a plain duration ("100ms"), a Kubernetes
/// millicore form ("100m" = 0.1 core), or a fractional core count ("0.5").
pub fn parse_cpu(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty CPU quantity".to_string());
    }

    if let Some(num) = s.strip_suffix('m') {
        if let Ok(millicores) = num.parse::<u64>() {
            return Ok(Duration::from_millis(millicores));
        }
    }

    if let Ok(cores) = s.parse::<f64>() {
        if !(0.0..=1000.0).contains(&cores) {
            return Err(format!("CPU core fraction out of range: {s}"));
        }
        return Ok(Duration::from_secs_f64(cores));
    }

    parse_duration(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_plain_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("0").unwrap(), 0);
    }

    #[test]
    fn parse_size_suffixes() {
        assert_eq!(parse_size("1KB").unwrap(), 1 << 10);
        assert_eq!(parse_size("100MB").unwrap(), 100 << 20);
        assert_eq!(parse_size("1GB").unwrap(), 1 << 30);
        assert_eq!(parse_size("2TB").unwrap(), 2 << 40);
        assert_eq!(parse_size("1gb").unwrap(), 1 << 30);
        assert_eq!(parse_size(" 10 MB ").unwrap(), 10 << 20);
    }

    #[test]
    fn parse_size_kubernetes_suffixes() {
        assert_eq!(parse_size("1Ki").unwrap(), 1 << 10);
        assert_eq!(parse_size("50Mi").unwrap(), 50 << 20);
        assert_eq!(parse_size("1Gi").unwrap(), 1 << 30);
        assert_eq!(parse_size("1Ti").unwrap(), 1 << 40);
    }

    #[test]
    fn parse_size_rejects_bad_input() {
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("-5MB").is_err());
        assert!(parse_size("99999999999TB").is_err());
    }

    #[test]
    fn format_size_rounds_to_largest_unit() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(1 << 10), "1.0KB");
        assert_eq!(format_size(10 << 20), "10.0MB");
        assert_eq!(format_size(1 << 30), "1.0GB");
    }

    #[test]
    fn parse_duration_standard_suffixes() {
        assert_eq!(parse_duration("100ms").unwrap(), Duration::from_millis(100));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert!(parse_duration("bogus").is_err());
    }

    #[test]
    fn parse_cpu_millicores() {
        assert_eq!(parse_cpu("100m").unwrap(), Duration::from_millis(100));
        assert_eq!(parse_cpu("1000m").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn parse_cpu_core_fraction() {
        assert_eq!(parse_cpu("0.5").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_cpu("1").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn parse_cpu_duration_form() {
        assert_eq!(parse_cpu("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_cpu("").is_err());
        assert!(parse_cpu("nonsense").is_err());
    }
}
