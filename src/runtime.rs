use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};

use crate::app::{App, Effect};
use crate::collectors::{catalog, logs, serial};
use crate::config::Config;
use crate::event::AppEvent;
use crate::metrics::Metrics;
use crate::state::DashboardSnapshot;

/// Executes the effects returned by [`App::update`] on the main loop.
pub struct Runtime {
    cfg: Config,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    metrics: Arc<Metrics>,
    snapshot: Arc<RwLock<DashboardSnapshot>>,
}

impl Runtime {
    pub fn new(
        cfg: Config,
        events_tx: mpsc::UnboundedSender<AppEvent>,
        metrics: Arc<Metrics>,
        snapshot: Arc<RwLock<DashboardSnapshot>>,
    ) -> Self {
        Self {
            cfg,
            events_tx,
            metrics,
            snapshot,
        }
    }

    /// Feeds the event to the app and keeps going until no follow-up events
    /// remain. Scans finish before this returns; serial fetches do not.
    pub async fn dispatch(&self, app: &mut App, event: AppEvent) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            if let AppEvent::SerialFetched { outcome, .. } = &event {
                self.metrics.inc_serial_fetch(outcome.label());
            }
            for effect in app.update(event) {
                if let Some(follow_up) = self.execute(effect).await {
                    pending.push_back(follow_up);
                }
            }
        }
    }

    async fn execute(&self, effect: Effect) -> Option<AppEvent> {
        match effect {
            Effect::Scan { targets, stamp } => {
                let reports = logs::scan_hosts(
                    &self.cfg.log_directory,
                    &targets,
                    self.cfg.detail_max_chars,
                );
                self.metrics.observe_scan(reports.len(), stamp);
                let refreshed_at = stamp.then(|| chrono::Local::now().format("%H:%M:%S").to_string());
                Some(AppEvent::Scanned {
                    reports,
                    refreshed_at,
                })
            }
            Effect::FetchSerial { key, hostname } => {
                serial::spawn_fetch(
                    self.cfg.serial.clone(),
                    key,
                    hostname,
                    self.events_tx.clone(),
                );
                None
            }
            Effect::LoadCatalog => {
                let hostnames = catalog::load_hostnames(&self.cfg.log_directory);
                self.metrics.set_catalog_size(hostnames.len());
                Some(AppEvent::CatalogLoaded(hostnames))
            }
            Effect::Publish(snapshot) => {
                self.metrics.update_from_snapshot(&snapshot);
                *self.snapshot.write().await = snapshot;
                None
            }
        }
    }
}
