use crate::state::{HostStatus, ScanReport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MISSING_DETAILS: &str = "Log not found";
const EMPTY_DETAILS: &str = "No data";

pub fn log_path(log_directory: &Path, hostname: &str) -> PathBuf {
    log_directory.join(format!("{hostname}.log"))
}

pub fn scan_hosts(
    log_directory: &Path,
    targets: &[(String, String)],
    max_chars: usize,
) -> Vec<ScanReport> {
    targets
        .iter()
        .map(|(key, hostname)| scan_host(log_directory, key, hostname, max_chars))
        .collect()
}

pub fn scan_host(log_directory: &Path, key: &str, hostname: &str, max_chars: usize) -> ScanReport {
    let path = log_path(log_directory, hostname);
    let (status, details) = if !path.exists() {
        (HostStatus::Missing, MISSING_DETAILS.to_string())
    } else {
        let lines = read_lines(&path);
        if lines.is_empty() {
            (HostStatus::Empty, EMPTY_DETAILS.to_string())
        } else {
            let last = last_meaningful_line(&lines).unwrap_or_default();
            (HostStatus::Working, truncate_chars(last, max_chars))
        }
    };

    debug!(host = %hostname, path = %path.display(), status = status.label(), "лог просканирован");

    ScanReport {
        key: key.to_string(),
        hostname: hostname.to_string(),
        status,
        details,
    }
}

/// Unreadable files count as empty. Invalid UTF-8 sequences are dropped.
fn read_lines(path: &Path) -> Vec<String> {
    match fs::read(path) {
        Ok(bytes) => {
            let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
            split_lines(&text)
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "не удалось прочитать лог");
            Vec::new()
        }
    }
}

/// Splits on `\r\n`, `\n` and a lone `\r`. A trailing terminator does not
/// start an extra line.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split_terminator(['\r', '\n'])
        .map(str::to_string)
        .collect()
}

pub fn last_meaningful_line<S: AsRef<str>>(lines: &[S]) -> Option<&str> {
    lines
        .iter()
        .rev()
        .map(|line| line.as_ref().trim())
        .find(|line| !line.is_empty())
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_line_skips_blank_tail() {
        let lines = ["", "  ", "hello world"];
        assert_eq!(last_meaningful_line(&lines), Some("hello world"));

        let lines = ["step 1", "step 2  ", "   ", "\t"];
        assert_eq!(last_meaningful_line(&lines), Some("step 2"));

        let lines: [&str; 2] = [" ", ""];
        assert_eq!(last_meaningful_line(&lines), None);
    }

    #[test]
    fn truncate_counts_characters() {
        let long = "x".repeat(120);
        assert_eq!(truncate_chars(&long, 80).len(), 80);
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("short", 80), "short");
    }

    #[test]
    fn split_lines_handles_all_terminators() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), [""]);
        assert_eq!(split_lines("a\r\nb\rc\nd"), ["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\r\n\r\n"), ["a", ""]);
    }

    #[test]
    fn carriage_return_progress_shows_latest_step() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("LAB01.log"), "step1\rstep2\n").unwrap();
        let report = scan_host(dir.path(), "lab01", "LAB01", 80);
        assert_eq!(report.status, HostStatus::Working);
        assert_eq!(report.details, "step2");
    }

    #[test]
    fn missing_log_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let report = scan_host(dir.path(), "lab01", "LAB01", 80);
        assert_eq!(report.status, HostStatus::Missing);
        assert_eq!(report.details, "Log not found");
        assert_eq!(report.key, "lab01");
        assert_eq!(report.hostname, "LAB01");
    }

    #[test]
    fn empty_log_has_no_data() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("LAB01.log"), "").unwrap();
        let report = scan_host(dir.path(), "lab01", "LAB01", 80);
        assert_eq!(report.status, HostStatus::Empty);
        assert_eq!(report.details, "No data");
    }

    #[test]
    fn working_log_shows_last_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("LAB01.log"), "\n  \nhello world\n").unwrap();
        let report = scan_host(dir.path(), "lab01", "LAB01", 80);
        assert_eq!(report.status, HostStatus::Working);
        assert_eq!(report.details, "hello world");
    }

    #[test]
    fn blank_only_log_is_working_without_details() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("LAB01.log"), "\n   \n").unwrap();
        let report = scan_host(dir.path(), "lab01", "LAB01", 80);
        assert_eq!(report.status, HostStatus::Working);
        assert_eq!(report.details, "");
    }

    #[test]
    fn details_are_truncated_and_invalid_bytes_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = b"first\r\n".to_vec();
        bytes.extend_from_slice(b"ok\xff\xfe ");
        bytes.extend_from_slice("y".repeat(100).as_bytes());
        bytes.extend_from_slice(b"\r\n");
        fs::write(dir.path().join("LAB01.log"), bytes).unwrap();

        let report = scan_host(dir.path(), "lab01", "LAB01", 80);
        assert_eq!(report.status, HostStatus::Working);
        assert_eq!(report.details.chars().count(), 80);
        assert!(report.details.starts_with("ok yyy"));
    }

    #[test]
    fn scan_hosts_keeps_target_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("B.log"), "done\n").unwrap();
        let targets = vec![
            ("a".to_string(), "A".to_string()),
            ("b".to_string(), "B".to_string()),
        ];
        let reports = scan_hosts(dir.path(), &targets, 80);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, HostStatus::Missing);
        assert_eq!(reports[1].status, HostStatus::Working);
        assert_eq!(reports[1].details, "done");
    }
}
