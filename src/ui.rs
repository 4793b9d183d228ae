use ratatui::prelude::*;
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table,
    TableState, Wrap,
};

use crate::app::{App, Focus, REPORT_TEXT};
use crate::state::RowTone;

const INPUT_WIDTH: u16 = 40;
const LABEL: &str = "Hostname ";

pub fn render(frame: &mut Frame, app: &App) {
    let [top, table, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let input_area = render_top_bar(frame, top, app);
    render_host_table(frame, table, app);
    render_status_bar(frame, status, app);

    if app.suggestions.is_visible() {
        render_suggestions(frame, input_area, app);
    }
    if app.report_open {
        render_report(frame);
    }
}

/// Returns the area of the input line so the suggestion list can hang below it.
fn render_top_bar(frame: &mut Frame, area: Rect, app: &App) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 60, 60)))
        .title(Span::styled(
            " Device Enrollment Dashboard ",
            Style::default().fg(Color::Magenta).bold(),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [input_area, hints_area] =
        Layout::horizontal([Constraint::Length(INPUT_WIDTH), Constraint::Min(0)]).areas(inner);

    let input_style = if app.focus == Focus::Input {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    let input_line = Line::from(vec![
        Span::styled(LABEL, Style::default().fg(Color::DarkGray)),
        Span::styled(app.input.text(), input_style),
    ]);
    frame.render_widget(Paragraph::new(input_line), input_area);

    if app.focus == Focus::Input && !app.report_open {
        let cursor = u16::try_from(app.input.cursor()).unwrap_or(u16::MAX);
        let x = input_area
            .x
            .saturating_add(LABEL.len() as u16)
            .saturating_add(cursor);
        frame.set_cursor_position((x.min(input_area.right().saturating_sub(1)), input_area.y));
    }

    let hints = Line::from(vec![
        hint("Enter", "add"),
        hint("F5", "refresh"),
        hint("F2", "report"),
        hint("Tab", "table"),
        hint("Del", "remove"),
        hint("^Q", "quit"),
    ]);
    frame.render_widget(Paragraph::new(hints).alignment(Alignment::Right), hints_area);

    input_area
}

fn hint(key: &'static str, action: &'static str) -> Span<'static> {
    Span::styled(format!(" {key} {action} "), Style::default().fg(Color::DarkGray))
}

fn render_suggestions(frame: &mut Frame, input_area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .suggestions
        .items()
        .iter()
        .map(|name| ListItem::new(name.as_str()))
        .collect();

    let screen = frame.area();
    let x = input_area.x.saturating_add(LABEL.len() as u16);
    let y = input_area.y.saturating_add(1);
    let width = (INPUT_WIDTH.saturating_sub(LABEL.len() as u16)).min(screen.right().saturating_sub(x));
    let height = u16::try_from(items.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(screen.bottom().saturating_sub(y));
    if width < 3 || height < 3 {
        return;
    }
    let popup_area = Rect {
        x,
        y,
        width,
        height,
    };

    let mut state = ListState::default();
    if app.focus == Focus::Suggestions {
        state.select(Some(app.suggestions.selected()));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(60, 60, 60)))
                .style(Style::default().bg(Color::Rgb(30, 30, 30))),
        )
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .highlight_symbol("› ");

    frame.render_widget(Clear, popup_area);
    frame.render_stateful_widget(list, popup_area, &mut state);
}

fn render_host_table(frame: &mut Frame, area: Rect, app: &App) {
    let header = Row::new(
        ["", "Hostname", "Serial", "Status", "Start", "Details"]
            .into_iter()
            .map(|title| Cell::from(Span::styled(title, Style::default().fg(Color::DarkGray)))),
    );

    let rows: Vec<Row> = app
        .registry
        .hosts()
        .iter()
        .map(|host| {
            let mark = if app.table.marked.contains(&host.key) {
                "●"
            } else {
                " "
            };
            let row = &host.row;
            Row::new(vec![
                Cell::from(mark),
                Cell::from(row.hostname.as_str()),
                Cell::from(row.serial.as_str()),
                Cell::from(row.status.label()),
                Cell::from(row.start.as_str()),
                Cell::from(row.details.as_str()),
            ])
            .style(tone_style(row.status.tone()))
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(20),
    ];

    let border_color = if app.focus == Focus::Table {
        Color::Magenta
    } else {
        Color::Rgb(60, 60, 60)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(vec![
            Span::styled(" HOSTS", Style::default().fg(Color::Magenta).bold()),
            Span::styled(
                format!(" {} ", app.registry.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    let mut state = TableState::default();
    if app.focus == Focus::Table && !app.registry.is_empty() {
        state.select(Some(app.table.row));
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(table, area, &mut state);
}

fn tone_style(tone: RowTone) -> Style {
    match tone {
        RowTone::Neutral => Style::default(),
        RowTone::Working => Style::default().fg(Color::Black).bg(Color::Rgb(252, 248, 227)),
        RowTone::Failed => Style::default().fg(Color::Black).bg(Color::Rgb(242, 222, 222)),
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let bar = Paragraph::new(Line::from(vec![Span::styled(
        format!(" {}", app.status_line),
        Style::default().fg(Color::Gray),
    )]))
    .style(Style::default().bg(Color::Rgb(20, 20, 20)));
    frame.render_widget(bar, area);
}

fn render_report(frame: &mut Frame) {
    let area = centered(frame.area(), 50, 7);
    let text = vec![
        Line::from(REPORT_TEXT),
        Line::from(""),
        Line::from(Span::styled(
            "Enter / Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let dialog = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" Report ")
                .style(Style::default().bg(Color::Rgb(30, 30, 30))),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
