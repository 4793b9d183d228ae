use crate::state::{DashboardSnapshot, HostStatus};
use prometheus::core::Collector;
use prometheus::{opts, Counter, CounterVec, Encoder, Gauge, GaugeVec, Registry, TextEncoder};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    started_at_unix: i64,
    pub dashboard_tracked_hosts: Gauge,
    pub dashboard_hosts: GaugeVec,
    pub dashboard_catalog_hostnames: Gauge,
    pub dashboard_log_scans_total: Counter,
    pub dashboard_refreshes_total: Counter,
    pub dashboard_serial_fetches_total: CounterVec,
    pub dashboard_last_refresh_timestamp_seconds: Gauge,
    pub dashboard_uptime_seconds: Gauge,
    pub dashboard_scrape_count_total: Counter,
}

impl Metrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let dashboard_tracked_hosts = Gauge::with_opts(opts!(
            "dashboard_tracked_hosts",
            "Number of hosts shown in the table"
        ))?;
        let dashboard_hosts = GaugeVec::new(
            opts!("dashboard_hosts", "Tracked hosts by enrollment status"),
            &["status"],
        )?;
        let dashboard_catalog_hostnames = Gauge::with_opts(opts!(
            "dashboard_catalog_hostnames",
            "Hostnames available for autocomplete"
        ))?;
        let dashboard_log_scans_total = Counter::with_opts(opts!(
            "dashboard_log_scans_total",
            "Host log files scanned"
        ))?;
        let dashboard_refreshes_total = Counter::with_opts(opts!(
            "dashboard_refreshes_total",
            "Full refreshes, timed and manual"
        ))?;
        let dashboard_serial_fetches_total = CounterVec::new(
            opts!(
                "dashboard_serial_fetches_total",
                "Serial lookups by outcome"
            ),
            &["outcome"],
        )?;
        let dashboard_last_refresh_timestamp_seconds = Gauge::with_opts(opts!(
            "dashboard_last_refresh_timestamp_seconds",
            "Unix timestamp of the last full refresh"
        ))?;
        let dashboard_uptime_seconds = Gauge::with_opts(opts!(
            "dashboard_uptime_seconds",
            "Seconds since the dashboard started"
        ))?;
        let dashboard_scrape_count_total = Counter::with_opts(opts!(
            "dashboard_scrape_count_total",
            "Number of /metrics scrapes"
        ))?;

        register(&registry, &dashboard_tracked_hosts)?;
        register(&registry, &dashboard_hosts)?;
        register(&registry, &dashboard_catalog_hostnames)?;
        register(&registry, &dashboard_log_scans_total)?;
        register(&registry, &dashboard_refreshes_total)?;
        register(&registry, &dashboard_serial_fetches_total)?;
        register(&registry, &dashboard_last_refresh_timestamp_seconds)?;
        register(&registry, &dashboard_uptime_seconds)?;
        register(&registry, &dashboard_scrape_count_total)?;

        Ok(Arc::new(Self {
            registry,
            started_at_unix: now_unix(),
            dashboard_tracked_hosts,
            dashboard_hosts,
            dashboard_catalog_hostnames,
            dashboard_log_scans_total,
            dashboard_refreshes_total,
            dashboard_serial_fetches_total,
            dashboard_last_refresh_timestamp_seconds,
            dashboard_uptime_seconds,
            dashboard_scrape_count_total,
        }))
    }

    pub fn update_from_snapshot(&self, snapshot: &DashboardSnapshot) {
        self.dashboard_tracked_hosts
            .set(snapshot.hosts.len() as f64);
        for status in HostStatus::ALL {
            let count = snapshot
                .hosts
                .iter()
                .filter(|row| row.status == status)
                .count();
            self.dashboard_hosts
                .with_label_values(&[status.label()])
                .set(count as f64);
        }
        self.refresh_uptime();
    }

    pub fn observe_scan(&self, hosts: usize, full_refresh: bool) {
        self.dashboard_log_scans_total.inc_by(hosts as f64);
        if full_refresh {
            self.dashboard_refreshes_total.inc();
            self.dashboard_last_refresh_timestamp_seconds
                .set(now_unix() as f64);
        }
    }

    pub fn inc_serial_fetch(&self, outcome: &str) {
        self.dashboard_serial_fetches_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn set_catalog_size(&self, size: usize) {
        self.dashboard_catalog_hostnames.set(size as f64);
    }

    pub fn inc_scrape_count(&self) {
        self.dashboard_scrape_count_total.inc();
    }

    pub fn refresh_uptime(&self) {
        let uptime = now_unix().saturating_sub(self.started_at_unix) as f64;
        self.dashboard_uptime_seconds.set(uptime);
    }

    pub fn encode_metrics(&self) -> Result<Vec<u8>, prometheus::Error> {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        let mf = self.registry.gather();
        encoder.encode(&mf, &mut buf)?;
        Ok(buf)
    }
}

fn register<T: Collector + Clone + 'static>(
    registry: &Registry,
    collector: &T,
) -> Result<(), prometheus::Error> {
    registry.register(Box::new(collector.clone()))
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
