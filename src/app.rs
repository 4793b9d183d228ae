use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

use crate::autocomplete::{suggest, SuggestionList};
use crate::event::AppEvent;
use crate::input::InputField;
use crate::state::{host_key, DashboardSnapshot, HostRegistry};

pub const REPORT_TEXT: &str = "Email generation removed for public example.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Suggestions,
    Table,
}

/// Side effects requested by [`App::update`]; the main loop runs them.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Read the logs of the given `(key, hostname)` pairs. `stamp` marks a
    /// full refresh that updates the status bar time.
    Scan {
        targets: Vec<(String, String)>,
        stamp: bool,
    },
    FetchSerial {
        key: String,
        hostname: String,
    },
    LoadCatalog,
    Publish(DashboardSnapshot),
}

#[derive(Debug, Clone, Default)]
pub struct TableCursor {
    pub row: usize,
    pub marked: HashSet<String>,
}

pub struct App {
    pub registry: HostRegistry,
    pub catalog: Vec<String>,
    pub input: InputField,
    pub suggestions: SuggestionList,
    pub focus: Focus,
    pub table: TableCursor,
    pub status_line: String,
    pub last_refresh: Option<String>,
    pub report_open: bool,
    pub should_quit: bool,
    suggestion_limit: usize,
}

impl App {
    pub fn new(suggestion_limit: usize) -> Self {
        Self {
            registry: HostRegistry::new(),
            catalog: Vec::new(),
            input: InputField::default(),
            suggestions: SuggestionList::default(),
            focus: Focus::Input,
            table: TableCursor::default(),
            status_line: "Ready".to_string(),
            last_refresh: None,
            report_open: false,
            should_quit: false,
            suggestion_limit,
        }
    }

    /// Applies one event to the state. No I/O happens here.
    pub fn update(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Resize(_, _) | AppEvent::Tick => Vec::new(),
            AppEvent::InputClosed => {
                self.should_quit = true;
                Vec::new()
            }
            AppEvent::RefreshDue => self.refresh(),
            AppEvent::CatalogDue => vec![Effect::LoadCatalog],
            AppEvent::CatalogLoaded(hostnames) => {
                self.catalog = hostnames;
                Vec::new()
            }
            AppEvent::SerialFetched { key, outcome } => {
                if self.registry.set_serial(&key, outcome.value()) {
                    vec![self.publish()]
                } else {
                    debug!(host = %key, "серийный номер для неотслеживаемого хоста отброшен");
                    Vec::new()
                }
            }
            AppEvent::Scanned {
                reports,
                refreshed_at,
            } => {
                for report in &reports {
                    self.registry.apply_scan(report);
                }
                if let Some(at) = refreshed_at {
                    self.status_line = format!("Last updated {at}");
                    self.last_refresh = Some(at);
                }
                vec![self.publish()]
            }
        }
    }

    /// Re-scans every tracked host and stamps the status bar.
    pub fn refresh(&mut self) -> Vec<Effect> {
        vec![Effect::Scan {
            targets: self.registry.scan_targets(),
            stamp: true,
        }]
    }

    /// Registers the trimmed input text. The field is cleared even when the
    /// host is already tracked.
    pub fn add_from_input(&mut self) -> Vec<Effect> {
        let name = self.input.text().trim().to_string();
        if name.is_empty() {
            return Vec::new();
        }

        self.input.clear();
        self.suggestions.hide();
        self.focus = Focus::Input;
        self.register(&name)
    }

    pub fn register(&mut self, hostname: &str) -> Vec<Effect> {
        if !self.registry.register(hostname) {
            debug!(host = %hostname, "хост уже отслеживается");
            return Vec::new();
        }

        info!(host = %hostname, "хост добавлен");
        let key = host_key(hostname);
        vec![
            self.publish(),
            Effect::Scan {
                targets: vec![(key.clone(), hostname.to_string())],
                stamp: false,
            },
            Effect::FetchSerial {
                key,
                hostname: hostname.to_string(),
            },
        ]
    }

    /// Removes marked rows, or the cursor row when nothing is marked.
    pub fn remove_selected(&mut self) -> Vec<Effect> {
        let keys: Vec<String> = if self.table.marked.is_empty() {
            self.registry
                .hosts()
                .get(self.table.row)
                .map(|h| vec![h.key.clone()])
                .unwrap_or_default()
        } else {
            self.table.marked.iter().cloned().collect()
        };
        if keys.is_empty() {
            return Vec::new();
        }

        let removed = self.registry.remove(&keys);
        self.table.marked.clear();
        self.clamp_cursor();
        info!(count = removed, "хосты удалены");
        vec![self.publish()]
    }

    fn publish(&self) -> Effect {
        Effect::Publish(self.registry.snapshot(self.last_refresh.clone()))
    }

    fn clamp_cursor(&mut self) {
        let len = self.registry.len();
        if self.table.row >= len {
            self.table.row = len.saturating_sub(1);
        }
    }

    fn update_suggestions(&mut self) {
        let matches = suggest(&self.catalog, self.input.text(), self.suggestion_limit);
        if matches.is_empty() {
            self.suggestions.hide();
        } else {
            self.suggestions.show(matches);
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return Vec::new();
            }
            _ => {}
        }

        if self.report_open {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.report_open = false;
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::F(5) => return self.refresh(),
            KeyCode::Char('r') if ctrl => return self.refresh(),
            KeyCode::F(2) => {
                self.report_open = true;
                return Vec::new();
            }
            KeyCode::Char('p') if ctrl => {
                self.report_open = true;
                return Vec::new();
            }
            _ => {}
        }

        match self.focus {
            Focus::Input => self.on_input_key(key),
            Focus::Suggestions => self.on_suggestion_key(key),
            Focus::Table => self.on_table_key(key),
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char(c) if plain => {
                self.input.insert(c);
                self.update_suggestions();
            }
            KeyCode::Backspace => {
                self.input.backspace();
                self.update_suggestions();
            }
            KeyCode::Delete => {
                self.input.delete();
                self.update_suggestions();
            }
            KeyCode::Left => self.input.left(),
            KeyCode::Right => self.input.right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            KeyCode::Enter => return self.add_from_input(),
            KeyCode::Down if self.suggestions.is_visible() => {
                self.suggestions.select_first();
                self.focus = Focus::Suggestions;
            }
            KeyCode::Esc => self.suggestions.hide(),
            KeyCode::Tab => self.focus = Focus::Table,
            _ => {}
        }
        Vec::new()
    }

    fn on_suggestion_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Down => self.suggestions.next(),
            KeyCode::Up => {
                if !self.suggestions.previous() {
                    self.focus = Focus::Input;
                }
            }
            KeyCode::Enter => {
                if let Some(value) = self.suggestions.selected_item().map(str::to_string) {
                    self.input.set(&value);
                }
                self.suggestions.hide();
                self.focus = Focus::Input;
            }
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Input,
            KeyCode::Char(_) | KeyCode::Backspace => {
                self.focus = Focus::Input;
                return self.on_input_key(key);
            }
            _ => {}
        }
        Vec::new()
    }

    fn on_table_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up => self.table.row = self.table.row.saturating_sub(1),
            KeyCode::Down => {
                if self.table.row + 1 < self.registry.len() {
                    self.table.row += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(host) = self.registry.hosts().get(self.table.row) {
                    if !self.table.marked.remove(&host.key) {
                        self.table.marked.insert(host.key.clone());
                    }
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => return self.remove_selected(),
            KeyCode::Tab | KeyCode::Esc => self.focus = Focus::Input,
            _ => {}
        }
        Vec::new()
    }
}
