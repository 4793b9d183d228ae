mod app;
mod autocomplete;
mod collectors;
mod config;
mod event;
mod http;
mod input;
mod metrics;
mod runtime;
mod state;
mod tui;
mod ui;

use app::App;
use axum::serve;
use clap::Parser;
use config::Config;
use event::{EventHandler, EventSchedule};
use metrics::Metrics;
use runtime::Runtime;
use state::DashboardSnapshot;
use std::fs::File;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{watch, RwLock};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "enrolldash")]
#[command(version, about = "Device enrollment dashboard")]
struct Cli {
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    print_default_config: bool,
    #[arg(long)]
    log_directory: Option<PathBuf>,
    #[arg(long, conflicts_with = "http_off")]
    http_on: bool,
    #[arg(long, conflicts_with = "http_on")]
    http_off: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    // The trace file comes from the config, so until it is open startup
    // errors go to stderr.
    let startup_log = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .finish();
    let (cfg, trace_file) = tracing::subscriber::with_default(startup_log, || {
        let cfg = load_config(cli);
        let trace_file = match open_trace_file(&cfg.trace_file) {
            Ok(file) => file,
            Err(err) => {
                error!(
                    error = %err,
                    path = %cfg.trace_file.display(),
                    "не удалось открыть файл трассировки"
                );
                std::process::exit(1);
            }
        };
        (cfg, trace_file)
    });
    let trace_guard = init_tracing(trace_file);

    let refresh_interval = match cfg.refresh_interval() {
        Ok(interval) => interval,
        Err(err) => {
            error!(error = %err, "некорректный refresh_interval");
            std::process::exit(1);
        }
    };

    info!(
        log_directory = %cfg.log_directory.display(),
        refresh_interval = %cfg.refresh_interval,
        http = cfg.http.enabled,
        "запуск enrolldash"
    );

    let metrics = match Metrics::new() {
        Ok(m) => m,
        Err(err) => {
            error!(error = %err, "не удалось инициализировать метрики");
            std::process::exit(1);
        }
    };
    let snapshot = Arc::new(RwLock::new(DashboardSnapshot::default()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_task = if cfg.http.enabled {
        let listen = cfg.http.listen.clone();
        let metrics = metrics.clone();
        let snapshot = snapshot.clone();
        let mut shutdown_rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            let app = http::build_router(metrics, snapshot);
            let addr: SocketAddr = match listen.parse() {
                Ok(addr) => addr,
                Err(err) => {
                    error!(error = %err, listen = %listen, "некорректный адрес listen");
                    return;
                }
            };

            let listener = match TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(err) => {
                    error!(error = %err, "не удалось запустить HTTP-сервер");
                    return;
                }
            };

            let server = serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            });

            if let Err(err) = server.await {
                error!(error = %err, "ошибка HTTP-сервера");
            }
        }))
    } else {
        None
    };

    let mut events = EventHandler::new(EventSchedule {
        tick_rate: Duration::from_millis(cfg.tick_rate_ms),
        refresh_interval,
        catalog_delay: Duration::from_millis(cfg.catalog_load_delay_ms),
    });
    let runtime = Runtime::new(
        cfg.clone(),
        events.inject_tx.clone(),
        metrics.clone(),
        snapshot.clone(),
    );
    let mut app = App::new(cfg.suggestion_limit);

    tui::install_panic_hook();
    let mut terminal = match tui::init() {
        Ok(t) => t,
        Err(err) => {
            error!(error = %err, "не удалось инициализировать терминал");
            let _ = tui::restore();
            std::process::exit(1);
        }
    };

    let result = run(&mut terminal, &mut app, &mut events, &runtime).await;

    if let Err(err) = tui::restore() {
        error!(error = %err, "не удалось восстановить терминал");
    }
    info!("остановка enrolldash");

    let _ = shutdown_tx.send(true);
    if let Some(task) = http_task {
        let _ = task.await;
    }

    if let Err(err) = result {
        error!(error = %err, "ошибка цикла интерфейса");
        eprintln!("ошибка цикла интерфейса: {err}");
        drop(trace_guard);
        std::process::exit(1);
    }
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut EventHandler,
    runtime: &Runtime,
) -> std::io::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        let Some(event) = events.next().await else {
            break;
        };
        runtime.dispatch(app, event).await;

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn load_config(cli: Cli) -> Config {
    let mut cfg = match &cli.config {
        Some(path) => match Config::load_from_file(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                error!(error = %err, "не удалось загрузить конфигурацию");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(dir) = cli.log_directory {
        cfg.log_directory = dir;
    }
    if cli.http_on {
        cfg.http.enabled = true;
    } else if cli.http_off {
        cfg.http.enabled = false;
    }
    if let Err(err) = cfg.validate() {
        error!(error = %err, "конфигурация не прошла проверку");
        std::process::exit(1);
    }
    cfg
}

fn open_trace_file(path: &Path) -> std::io::Result<File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}

fn init_tracing(file: File) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(file);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}
