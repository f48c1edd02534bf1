use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_ -]+").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ -]+").unwrap());

/// URL-safe slug for a post title: lowercase ASCII word characters joined by `-`.
///
/// Existing slugs pass through unchanged, so `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let kept = NON_SLUG_CHARS.replace_all(&lowered, "");
    SEPARATORS
        .replace_all(&kept, "-")
        .trim_matches('-')
        .to_string()
}

/// Treat blank strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Format a byte count the way the status endpoint reports it, e.g. `12.34 MB`.
pub fn format_megabytes(bytes: u64) -> String {
    let megabytes = bytes as f64 / 1024.0 / 1024.0;
    format!("{} MB", (megabytes * 100.0).round() / 100.0)
}

/// Process memory figures in bytes, as reported by `/proc/self/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    pub rss: u64,
    pub virtual_memory: u64,
    pub data_segment: u64,
    pub peak_rss: u64,
}

/// `None` where `/proc` is not available.
pub fn read_memory_usage() -> Option<MemoryUsage> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_proc_status(&status)
}

pub fn parse_proc_status(status: &str) -> Option<MemoryUsage> {
    let mut usage = MemoryUsage::default();
    let mut found = false;
    for line in status.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let field = match key {
            "VmRSS" => &mut usage.rss,
            "VmSize" => &mut usage.virtual_memory,
            "VmData" => &mut usage.data_segment,
            "VmHWM" => &mut usage.peak_rss,
            _ => continue,
        };
        let kilobytes = value
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())?;
        *field = kilobytes * 1024;
        found = true;
    }
    found.then_some(usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Rust: 10 Tips & Tricks!"), "rust-10-tips-tricks");
        assert_eq!(slugify("  padded   title  "), "padded-title");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
        assert_eq!(slugify("Ünïcödé"), "ncd");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_is_idempotent() {
        let once = slugify("Already a Slug - Right?");
        assert_eq!(once, "already-a-slug-right");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slugify_keeps_hyphenated_slugs() {
        assert_eq!(slugify("my-custom-slug"), "my-custom-slug");
        assert_eq!(slugify("My--Custom -- Slug"), "my-custom-slug");
        assert_eq!(slugify("-leading and trailing-"), "leading-and-trailing");
    }

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  x ".into())).as_deref(), Some("x"));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn megabytes_rounded_to_two_places() {
        assert_eq!(format_megabytes(0), "0 MB");
        assert_eq!(format_megabytes(1024 * 1024), "1 MB");
        assert_eq!(format_megabytes(1_572_864), "1.5 MB");
        assert_eq!(format_megabytes(12_345_678), "11.77 MB");
    }

    #[test]
    fn proc_status_fields_are_read_in_bytes() {
        let status = "Name:\tportfolio-blog\nVmHWM:\t   2048 kB\nVmRSS:\t   1024 kB\nVmData:\t  512 kB\nVmSize:\t  4096 kB\n";
        let usage = parse_proc_status(status).unwrap();
        assert_eq!(usage.rss, 1024 * 1024);
        assert_eq!(usage.peak_rss, 2048 * 1024);
        assert_eq!(usage.data_segment, 512 * 1024);
        assert_eq!(usage.virtual_memory, 4096 * 1024);
    }

    #[test]
    fn proc_status_without_memory_lines() {
        assert_eq!(parse_proc_status("Name:\tx\nState:\tR\n"), None);
    }
}
