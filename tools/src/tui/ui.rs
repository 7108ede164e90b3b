//! Terminal rendering and the key-driven event loop.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use desembolso_core::{
    charts::{marker_radius, series_names},
    geo,
    kpi::KpiColumn,
    Dashboard, DataStatus,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Map, MapResolution},
        Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap,
    },
    Frame, Terminal,
};

use super::app::{App, Focus};

const NO_DATA: &str = "Sem dados para exibir.";

/// Series colours, assigned to banks in name order.
const PALETTE: [Color; 8] = [
    Color::LightBlue,
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightYellow,
    Color::LightCyan,
    Color::LightRed,
    Color::Blue,
    Color::Green,
];

fn series_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// Entry point for the TUI. Called from main.rs.
pub fn run_tui(dashboard: Dashboard) -> anyhow::Result<()> {
    let mut app = App::new(dashboard);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key);
            }
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    use KeyCode::*;

    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        Char('q') | Esc => app.should_quit = true,

        Tab     => app.next_focus(),
        BackTab => app.prev_focus(),

        Up       => app.step(-1),
        Down     => app.step(1),
        PageUp   => app.step(-30),
        PageDown => app.step(30),
        Home     => app.jump(false),
        End      => app.jump(true),

        Char('a') => app.reset_focused(),
        Char('x') => app.reset_all(),
        Char('r') => app.reload(),

        _ => {}
    }
}

/// Top-level layout: header, sidebar + two content columns, footer.
fn ui(f: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // main
            Constraint::Length(3), // footer
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30),    // sidebar
            Constraint::Percentage(40),
            Constraint::Min(0),
        ])
        .split(chunks[1]);

    draw_filters(f, columns[0], app);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(columns[1]);
    draw_credit_by_bank(f, left[0], app);
    draw_map(f, left[1], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(0)])
        .split(columns[2]);
    draw_kpis(f, right[0], app);
    draw_monthly(f, right[1], app);

    let footer = Paragraph::new(
        "Tab/Shift+Tab: filtro  |  ↑/↓: alterar  |  PgUp/PgDn: ±30 dias  |  Home/End: início/fim  |  a: limpar filtro  |  x: limpar todos  |  r: recarregar  |  q: sair",
    )
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn draw_header(f: &mut Frame<'_>, area: Rect, app: &App) {
    let view = &app.view;
    let line = match &view.status {
        DataStatus::LoadFailed { message } => Line::from(vec![
            Span::styled(
                format!("{}   ", view.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("Ocorreu um erro crítico ao carregar os dados: {message}"),
                Style::default().fg(Color::White).bg(Color::Red),
            ),
        ]),
        DataStatus::Loaded { records } => Line::from(vec![
            Span::styled(
                view.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("   |   {} de {records} registros", view.row_count)),
        ]),
    };
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_filters(f: &mut Frame<'_>, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();
    for focus in Focus::ORDER {
        let focused = focus == app.focus;
        let label_style = if focused {
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut label = focus.label().to_string();
        if let Some(n) = app.option_count(focus) {
            label.push_str(&format!(" ({n})"));
        }
        lines.push(Line::from(Span::styled(label, label_style)));

        let value_style = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(" {} ", app.value_of(focus)),
            value_style,
        )));
        lines.push(Line::from(""));
    }

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Filtros").borders(Borders::ALL));
    f.render_widget(p, area);
}

fn no_data(f: &mut Frame<'_>, area: Rect, block: Block<'_>) {
    let p = Paragraph::new(NO_DATA)
        .style(Style::default().fg(Color::Blue))
        .block(block);
    f.render_widget(p, area);
}

// Horizontal bars, largest credit on top.
fn draw_credit_by_bank(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .title("Crédito por Banco Comunitário")
        .borders(Borders::ALL);
    let totals = &app.view.credit_by_bank;
    if totals.is_empty() {
        return no_data(f, area, block);
    }

    let names = series_names(&app.view.monthly);
    let bars: Vec<Bar> = totals
        .iter()
        .rev()
        .map(|t| {
            let color = names
                .iter()
                .position(|n| *n == t.bank)
                .map(series_color)
                .unwrap_or(Color::Gray);
            Bar::default()
                .value(t.total_credit.max(0.0).round() as u64)
                .label(Line::from(t.bank.clone()))
                .text_value(t.label())
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn draw_map(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .title("Localização dos Projetos")
        .borders(Borders::ALL);
    let points = &app.view.map;
    if points.is_empty() {
        return no_data(f, area, block);
    }

    let names = series_names(&app.view.monthly);
    let max_credit = points.iter().map(|p| p.total_credit).fold(0.0, f64::max);
    let ((lon_min, lon_max), (lat_min, lat_max)) = geo::viewport(6.0);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([lon_min, lon_max])
        .y_bounds([lat_min, lat_max])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for p in points {
                let color = names
                    .iter()
                    .position(|n| *n == p.bank)
                    .map(series_color)
                    .unwrap_or(Color::White);
                ctx.draw(&Circle {
                    x: p.longitude,
                    y: p.latitude,
                    radius: marker_radius(p.total_credit, max_credit, 0.3, 1.5),
                    color,
                });
            }
        });
    f.render_widget(canvas, area);
}

fn draw_kpis(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    for (column, rect) in [(KpiColumn::Left, halves[0]), (KpiColumn::Right, halves[1])] {
        let mut lines: Vec<Line> = Vec::new();
        for card in app.view.cards.iter().filter(|c| c.column == column) {
            lines.push(Line::from(Span::styled(
                card.label,
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(Span::styled(
                card.value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
        }
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rect);
    }
}

// One group per month, one bar per bank.
fn draw_monthly(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .title("Fundo Gerado no Período | Por Moeda")
        .borders(Borders::ALL);
    let buckets = &app.view.monthly;
    if buckets.is_empty() {
        return no_data(f, area, block);
    }

    let names = series_names(buckets);
    let legend: Vec<Span> = names
        .iter()
        .enumerate()
        .map(|(i, n)| Span::styled(format!("■ {n}  "), Style::default().fg(series_color(i))))
        .collect();

    let inner = block.inner(area);
    f.render_widget(block, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    f.render_widget(Paragraph::new(Line::from(legend)), parts[0]);

    let mut chart = BarChart::default().bar_width(3).bar_gap(0).group_gap(2);
    for bucket in buckets {
        let bars: Vec<Bar> = bucket
            .by_bank
            .iter()
            .map(|(bank, value)| {
                let idx = names.iter().position(|n| n == bank).unwrap_or(0);
                Bar::default()
                    .value(value.max(0.0).round() as u64)
                    .text_value(String::new())
                    .style(Style::default().fg(series_color(idx)))
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(bucket.label.clone()))
                .bars(&bars),
        );
    }
    f.render_widget(chart, parts[1]);
}
