use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::collectors::serial::SerialOutcome;
use crate::state::ScanReport;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// The terminal event stream ended; nothing else can be typed.
    InputClosed,
    Tick,
    /// Periodic full re-scan; the first one fires at startup.
    RefreshDue,
    /// Startup delay elapsed, the hostname catalog can be read.
    CatalogDue,
    CatalogLoaded(Vec<String>),
    SerialFetched {
        key: String,
        outcome: SerialOutcome,
    },
    Scanned {
        reports: Vec<ScanReport>,
        refreshed_at: Option<String>,
    },
}

pub struct EventSchedule {
    pub tick_rate: Duration,
    pub refresh_interval: Duration,
    pub catalog_delay: Duration,
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _task: tokio::task::JoinHandle<()>,
    /// Sender for results produced outside the event loop (serial fetches).
    pub inject_tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    pub fn new(schedule: EventSchedule) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let inject_tx = tx.clone();

        let task = tokio::spawn(Self::event_loop(tx, schedule));

        Self {
            rx,
            _task: task,
            inject_tx,
        }
    }

    async fn event_loop(tx: mpsc::UnboundedSender<AppEvent>, schedule: EventSchedule) {
        let mut reader = EventStream::new();
        let mut tick = tokio::time::interval(schedule.tick_rate);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut refresh = tokio::time::interval(schedule.refresh_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let catalog_due = tokio::time::sleep(schedule.catalog_delay);
        tokio::pin!(catalog_due);
        let mut catalog_sent = false;

        loop {
            let event = tokio::select! {
                maybe_event = reader.next() => match maybe_event {
                    Some(Ok(CrosstermEvent::Key(key))) => AppEvent::Key(key),
                    Some(Ok(CrosstermEvent::Resize(w, h))) => AppEvent::Resize(w, h),
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        warn!(error = %err, "ошибка чтения события терминала");
                        continue;
                    }
                    None => {
                        warn!("поток событий терминала закрыт");
                        let _ = tx.send(AppEvent::InputClosed);
                        break;
                    }
                },
                _ = tick.tick() => AppEvent::Tick,
                _ = refresh.tick() => AppEvent::RefreshDue,
                _ = &mut catalog_due, if !catalog_sent => {
                    catalog_sent = true;
                    AppEvent::CatalogDue
                }
            };

            if tx.send(event).is_err() {
                break;
            }
        }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}
