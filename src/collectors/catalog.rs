use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Hostnames derived from `*.log` files in the log directory, sorted.
/// A missing or unreadable directory yields an empty catalog.
pub fn load_hostnames(log_directory: &Path) -> Vec<String> {
    let entries = match fs::read_dir(log_directory) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %log_directory.display(), error = %err, "каталог логов недоступен");
            return Vec::new();
        }
    };

    let mut hostnames: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| !entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().and_then(hostname_from_file_name))
        .collect();
    hostnames.sort();

    info!(count = hostnames.len(), "каталог имён хостов загружен");
    hostnames
}

fn hostname_from_file_name(name: &str) -> Option<String> {
    if !name.to_ascii_lowercase().ends_with(".log") {
        return None;
    }
    let stem = name.get(..name.len() - 4)?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_log_suffix_any_case() {
        assert_eq!(hostname_from_file_name("LAB01.log"), Some("LAB01".to_string()));
        assert_eq!(hostname_from_file_name("lab02.LOG"), Some("lab02".to_string()));
        assert_eq!(hostname_from_file_name("notes.txt"), None);
        assert_eq!(hostname_from_file_name(".log"), None);
    }

    #[test]
    fn lists_log_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("OFFICE02.log"), "x").unwrap();
        fs::write(dir.path().join("LAB01.Log"), "x").unwrap();
        fs::write(dir.path().join("readme.md"), "x").unwrap();
        fs::create_dir(dir.path().join("archive.log")).unwrap();

        let hostnames = load_hostnames(dir.path());
        assert_eq!(hostnames, vec!["LAB01".to_string(), "OFFICE02".to_string()]);
    }

    #[test]
    fn missing_directory_gives_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let hostnames = load_hostnames(&dir.path().join("nope"));
        assert!(hostnames.is_empty());
    }
}
