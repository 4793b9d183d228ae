pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum HostStatus {
    Checking,
    Missing,
    Empty,
    Working,
}

/// Row background class, derived from the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTone {
    Neutral,
    Working,
    Failed,
}

impl HostStatus {
    pub const ALL: [HostStatus; 4] = [
        HostStatus::Checking,
        HostStatus::Missing,
        HostStatus::Empty,
        HostStatus::Working,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HostStatus::Checking => "Checking",
            HostStatus::Missing => "Missing",
            HostStatus::Empty => "Empty",
            HostStatus::Working => "Working",
        }
    }

    pub fn tone(self) -> RowTone {
        match self {
            HostStatus::Checking => RowTone::Neutral,
            HostStatus::Missing => RowTone::Failed,
            HostStatus::Empty | HostStatus::Working => RowTone::Working,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HostRow {
    pub hostname: String,
    pub serial: String,
    pub status: HostStatus,
    pub start: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedHost {
    pub key: String,
    pub row: HostRow,
}

/// Outcome of reading one host's log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub key: String,
    pub hostname: String,
    pub status: HostStatus,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DashboardSnapshot {
    pub last_refresh: Option<String>,
    pub hosts: Vec<HostRow>,
}

pub fn host_key(hostname: &str) -> String {
    hostname.to_lowercase()
}

/// Tracked hosts in insertion order. Keys are unique and every key owns
/// exactly one row.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    hosts: Vec<TrackedHost>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a `Checking` placeholder row. Returns `false` when the host is
    /// already tracked under any casing.
    pub fn register(&mut self, hostname: &str) -> bool {
        let key = host_key(hostname);
        if self.contains(&key) {
            return false;
        }

        self.hosts.push(TrackedHost {
            key,
            row: HostRow {
                hostname: hostname.to_string(),
                serial: "Loading".to_string(),
                status: HostStatus::Checking,
                start: PLACEHOLDER.to_string(),
                details: PLACEHOLDER.to_string(),
            },
        });
        true
    }

    pub fn remove(&mut self, keys: &[String]) -> usize {
        let before = self.hosts.len();
        self.hosts.retain(|h| !keys.contains(&h.key));
        before - self.hosts.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.hosts.iter().any(|h| h.key == key)
    }

    pub fn hosts(&self) -> &[TrackedHost] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// `(key, hostname)` pairs for the scanner.
    pub fn scan_targets(&self) -> Vec<(String, String)> {
        self.hosts
            .iter()
            .map(|h| (h.key.clone(), h.row.hostname.clone()))
            .collect()
    }

    /// Writes the serial column if the row still exists.
    pub fn set_serial(&mut self, key: &str, serial: &str) -> bool {
        match self.hosts.iter_mut().find(|h| h.key == key) {
            Some(host) => {
                host.row.serial = serial.to_string();
                true
            }
            None => false,
        }
    }

    /// Rebuilds the row from scratch. Serial and start go back to `-`.
    pub fn apply_scan(&mut self, report: &ScanReport) -> bool {
        let Some(host) = self.hosts.iter_mut().find(|h| h.key == report.key) else {
            return false;
        };
        host.row = HostRow {
            hostname: report.hostname.clone(),
            serial: PLACEHOLDER.to_string(),
            status: report.status,
            start: PLACEHOLDER.to_string(),
            details: report.details.clone(),
        };
        true
    }

    pub fn snapshot(&self, last_refresh: Option<String>) -> DashboardSnapshot {
        DashboardSnapshot {
            last_refresh,
            hosts: self.hosts.iter().map(|h| h.row.clone()).collect(),
        }
    }
}

#[cfg(test)]
impl HostRegistry {
    pub fn get(&self, key: &str) -> Option<&TrackedHost> {
        self.hosts.iter().find(|h| h.key == key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.hosts.iter().map(|h| h.key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(hostname: &str, status: HostStatus, details: &str) -> ScanReport {
        ScanReport {
            key: host_key(hostname),
            hostname: hostname.to_string(),
            status,
            details: details.to_string(),
        }
    }

    #[test]
    fn register_is_case_insensitive() {
        let mut registry = HostRegistry::new();
        assert!(registry.register("LAB01"));
        assert!(!registry.register("lab01"));
        assert!(!registry.register("Lab01"));

        assert_eq!(registry.len(), 1);
        let host = registry.get("lab01").unwrap();
        assert_eq!(host.row.hostname, "LAB01");
        assert_eq!(host.row.serial, "Loading");
        assert_eq!(host.row.status, HostStatus::Checking);
        assert_eq!(host.row.start, "-");
        assert_eq!(host.row.details, "-");
    }

    #[test]
    fn remove_drops_row_and_key() {
        let mut registry = HostRegistry::new();
        registry.register("LAB01");
        registry.register("OFFICE02");

        let removed = registry.remove(&["lab01".to_string(), "ghost".to_string()]);
        assert_eq!(removed, 1);
        assert!(!registry.contains("lab01"));
        assert_eq!(registry.keys(), vec!["office02".to_string()]);

        assert!(registry.register("lab01"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn serial_for_removed_host_is_ignored() {
        let mut registry = HostRegistry::new();
        registry.register("LAB01");
        assert!(registry.set_serial("lab01", "Unknown"));
        assert_eq!(registry.get("lab01").unwrap().row.serial, "Unknown");

        registry.remove(&["lab01".to_string()]);
        assert!(!registry.set_serial("lab01", "Unknown"));
        assert!(registry.is_empty());
    }

    #[test]
    fn scan_rebuilds_row() {
        let mut registry = HostRegistry::new();
        registry.register("LAB01");
        registry.set_serial("lab01", "Unknown");

        assert!(registry.apply_scan(&report("LAB01", HostStatus::Missing, "Log not found")));
        let row = &registry.get("lab01").unwrap().row;
        assert_eq!(row.status, HostStatus::Missing);
        assert_eq!(row.serial, "-");
        assert_eq!(row.start, "-");
        assert_eq!(row.details, "Log not found");

        assert!(!registry.apply_scan(&report("GHOST", HostStatus::Working, "x")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn tones_follow_status() {
        assert_eq!(HostStatus::Missing.tone(), RowTone::Failed);
        assert_eq!(HostStatus::Empty.tone(), RowTone::Working);
        assert_eq!(HostStatus::Working.tone(), RowTone::Working);
        assert_eq!(HostStatus::Checking.tone(), RowTone::Neutral);
    }

    #[test]
    fn snapshot_keeps_insertion_order() {
        let mut registry = HostRegistry::new();
        registry.register("A");
        registry.register("B");
        registry.register("C");
        registry.apply_scan(&report("B", HostStatus::Working, "ok"));

        let snapshot = registry.snapshot(Some("12:00:00".to_string()));
        assert_eq!(snapshot.hosts.len(), 3);
        assert_eq!(snapshot.hosts[0].hostname, "A");
        assert_eq!(snapshot.hosts[1].status, HostStatus::Working);
        assert_eq!(snapshot.hosts[2].status, HostStatus::Checking);
        assert_eq!(snapshot.last_refresh.as_deref(), Some("12:00:00"));
    }
}
