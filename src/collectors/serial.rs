use crate::config::SerialConfig;
use crate::event::AppEvent;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const SERIAL_ERROR: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialOutcome {
    Resolved(String),
    Failed,
}

impl SerialOutcome {
    pub fn value(&self) -> &str {
        match self {
            SerialOutcome::Resolved(serial) => serial,
            SerialOutcome::Failed => SERIAL_ERROR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SerialOutcome::Resolved(_) => "resolved",
            SerialOutcome::Failed => "error",
        }
    }
}

/// Launches the lookup command and resolves to the configured placeholder.
/// The child is not awaited; its output goes nowhere.
pub fn launch_lookup(cfg: &SerialConfig, hostname: &str) -> SerialOutcome {
    let spawned = Command::new(&cfg.program)
        .args(&cfg.args)
        .env("ENROLLDASH_HOST", hostname)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match spawned {
        Ok(_child) => {
            debug!(host = %hostname, program = %cfg.program, "запрос серийного номера запущен");
            SerialOutcome::Resolved(cfg.placeholder.clone())
        }
        Err(err) => {
            warn!(host = %hostname, program = %cfg.program, error = %err, "не удалось запустить запрос серийного номера");
            SerialOutcome::Failed
        }
    }
}

/// One detached task per registered host. The result is posted back to the
/// main loop; a closed channel just drops it.
pub fn spawn_fetch(
    cfg: SerialConfig,
    key: String,
    hostname: String,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = launch_lookup(&cfg, &hostname);
        let _ = tx.send(AppEvent::SerialFetched { key, outcome });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn cfg(program: &str, args: &[&str]) -> SerialConfig {
        SerialConfig {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            placeholder: "Unknown".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_program_resolves_to_error() {
        let outcome = launch_lookup(&cfg("enrolldash-no-such-binary", &[]), "LAB01");
        assert_eq!(outcome, SerialOutcome::Failed);
        assert_eq!(outcome.value(), "Error");
        assert_eq!(outcome.label(), "error");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fetch_posts_placeholder_back() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_fetch(cfg("sh", &["-c", ":"]), "lab01".to_string(), "LAB01".to_string(), tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(AppEvent::SerialFetched { key, outcome }) => {
                assert_eq!(key, "lab01");
                assert_eq!(outcome.value(), "Unknown");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
