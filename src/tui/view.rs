//! View composition
//!
//! Turns a `(BusinessSnapshot, UiState)` pair into frame text. Widgets are
//! drawn with ratatui into an in-memory backend and the resulting buffer
//! is flattened to plain lines, so composing never touches the terminal.
//!
//! Full-frame layout (main screen):
//! - Header: status, screen tabs, last update
//! - Price chart: `Price <price>  | <inverted>`
//! - Expected profit chart
//! - Trade history table with the cursor cell in brackets
//! - Footer: key help

use ratatui::{
    backend::TestBackend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Sparkline, Table},
    Frame, Terminal,
};
use thiserror::Error;

use super::state::{Screen, UiState};
use crate::config::constants::{MIN_HEIGHT, MIN_WIDTH, TRADE_TABLE_COLUMNS};
use crate::config::DashboardConfig;
use crate::core::BusinessSnapshot;

/// Upper value of the scaled sparkline data
const SPARKLINE_MAX: u64 = 100;

/// Screens listed in the header, in key order
const TABS: [Screen; 4] = [Screen::Main, Screen::Config, Screen::Wallet, Screen::Logs];

const FOOTER_HELP: &str =
    " m mini | c config | w wallet | l logs | esc main | arrows move | ctrl+s explorer | ctrl+e execute | ctrl+c quit";

/// Composition failures, recovered by the render path as a placeholder frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositionError {
    #[error("viewport {width}x{height} is smaller than {min_width}x{min_height}")]
    ViewportTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("screen '{0}' has no full-frame view")]
    NoFrameView(Screen),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Deterministic frame composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewComposer {
    width: u16,
    height: u16,
}

impl ViewComposer {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// Compose the full frame for the current screen.
    ///
    /// Same inputs always give the same text; trailing spaces are trimmed
    /// and every line ends with `\n`.
    pub fn compose(
        &self,
        snapshot: &BusinessSnapshot,
        ui: &UiState,
    ) -> Result<String, CompositionError> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(CompositionError::ViewportTooSmall {
                width: self.width,
                height: self.height,
                min_width: MIN_WIDTH,
                min_height: MIN_HEIGHT,
            });
        }
        if ui.current_screen == Screen::Mini {
            return Err(CompositionError::NoFrameView(Screen::Mini));
        }
        check_finite(snapshot)?;

        let backend = TestBackend::new(self.width, self.height);
        let mut terminal =
            Terminal::new(backend).map_err(|e| CompositionError::Backend(e.to_string()))?;
        let completed = terminal
            .draw(|frame| draw(frame, snapshot, ui))
            .map_err(|e| CompositionError::Backend(e.to_string()))?;

        Ok(buffer_to_text(completed.buffer))
    }

    /// One condensed status line for mini mode (no trailing newline)
    pub fn compose_mini(&self, snapshot: &BusinessSnapshot, _ui: &UiState) -> String {
        let profit = snapshot
            .last_expected_profit()
            .filter(|v| v.is_finite())
            .map(|v| format!("{:.6}%", v))
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} | {} | price {} | inverted {} | exp. profit {} | trades {}",
            snapshot.updated_at.as_deref().unwrap_or("--:--:--"),
            snapshot.status,
            format_opt(snapshot.price),
            format_opt(snapshot.price_inverted),
            profit,
            snapshot.trade_history.len()
        )
    }

    /// Frame shown in place of one that failed to compose
    pub fn placeholder(&self, err: &CompositionError) -> String {
        format!("[dashboard] frame unavailable: {}\n", err)
    }
}

fn format_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.12}", v),
        _ => "-".to_string(),
    }
}

fn check_finite(snapshot: &BusinessSnapshot) -> Result<(), CompositionError> {
    if snapshot.price.is_some_and(|v| !v.is_finite()) {
        return Err(CompositionError::NonFinite("price"));
    }
    if snapshot.price_inverted.is_some_and(|v| !v.is_finite()) {
        return Err(CompositionError::NonFinite("inverted price"));
    }
    if snapshot.chart.price.iter().any(|v| !v.is_finite()) {
        return Err(CompositionError::NonFinite("price chart"));
    }
    if snapshot
        .chart
        .expected_profit_percent
        .iter()
        .any(|v| !v.is_finite())
    {
        return Err(CompositionError::NonFinite("expected profit chart"));
    }
    Ok(())
}

fn buffer_to_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::with_capacity((area.width as usize + 1) * area.height as usize);
    for y in area.top()..area.bottom() {
        let mut line = String::with_capacity(area.width as usize);
        for x in area.left()..area.right() {
            line.push_str(buf[(x, y)].symbol());
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Draw the whole frame for `ui.current_screen`
fn draw(frame: &mut Frame, snapshot: &BusinessSnapshot, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Screen body
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], snapshot, ui);
    match ui.current_screen {
        Screen::Main | Screen::Mini => draw_main(frame, chunks[1], snapshot, ui),
        Screen::Config => draw_config(frame, chunks[1], snapshot),
        Screen::Wallet => draw_wallet(frame, chunks[1], snapshot),
        Screen::Logs => draw_logs(frame, chunks[1], snapshot),
    }
    frame.render_widget(
        Paragraph::new(FOOTER_HELP).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn rounded_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
}

/// Draw header with status, screen tabs and last update
fn draw_header(frame: &mut Frame, area: Rect, snapshot: &BusinessSnapshot, ui: &UiState) {
    let mut spans = vec![
        Span::raw("Status: "),
        Span::styled(snapshot.status.to_string(), Style::default().fg(Color::Cyan)),
        Span::raw("  |  "),
    ];
    for screen in TABS {
        let label = if screen == ui.current_screen {
            format!("[{}] ", screen)
        } else {
            format!(" {}  ", screen)
        };
        spans.push(Span::raw(label));
    }
    spans.push(Span::raw(format!(
        " |  Updated: {}",
        snapshot.updated_at.as_deref().unwrap_or("-")
    )));

    let header = Paragraph::new(Line::from(spans)).block(rounded_block(" HFT Dashboard ".into()));
    frame.render_widget(header, area);
}

/// Draw price chart, expected profit chart and trade history
fn draw_main(frame: &mut Frame, area: Rect, snapshot: &BusinessSnapshot, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Price
            Constraint::Length(7), // Expected profit
            Constraint::Min(4),    // Trade history
        ])
        .split(area);

    // Border tone follows the direction of the last price move
    let price_color = match (snapshot.price, snapshot.previous_price()) {
        (Some(now), Some(prev)) if now > prev => Color::Green,
        (Some(now), Some(prev)) if now < prev => Color::Red,
        _ => Color::White,
    };
    let price_title = format!(
        " Price {}  | {} ",
        format_opt(snapshot.price),
        format_opt(snapshot.price_inverted)
    );
    draw_series(
        frame,
        chunks[0],
        rounded_block(price_title).border_style(Style::default().fg(price_color)),
        &snapshot.chart.price,
        "waiting for price data",
    );

    let last_profit = snapshot.last_expected_profit();
    let profit_color = match last_profit {
        Some(v) if v > 0.0 => Color::Green,
        Some(v) if v < 0.0 => Color::Red,
        _ => Color::White,
    };
    let profit_title = format!(" Expected Profit % {} ", format_opt(last_profit));
    draw_series(
        frame,
        chunks[1],
        rounded_block(profit_title).border_style(Style::default().fg(profit_color)),
        &snapshot.chart.expected_profit_percent,
        "waiting for route data",
    );

    draw_trade_history(frame, chunks[2], snapshot, ui);
}

fn draw_series(frame: &mut Frame, area: Rect, block: Block<'static>, values: &[f64], empty: &str) {
    if values.is_empty() {
        let waiting = Paragraph::new(empty)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    let data = scale_series(values, area.width.saturating_sub(2) as usize);
    let sparkline = Sparkline::default()
        .block(block)
        .data(data.as_slice())
        .max(SPARKLINE_MAX);
    frame.render_widget(sparkline, area);
}

/// Scale the last `width` samples to `1..=SPARKLINE_MAX`
fn scale_series(values: &[f64], width: usize) -> Vec<u64> {
    let window = &values[values.len().saturating_sub(width)..];
    let (min, max) = window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let span = max - min;

    window
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARKLINE_MAX / 2
            } else {
                1 + (((v - min) / span) * (SPARKLINE_MAX - 1) as f64).round() as u64
            }
        })
        .collect()
}

/// Draw trade history with the cursor cell bracketed
fn draw_trade_history(frame: &mut Frame, area: Rect, snapshot: &BusinessSnapshot, ui: &UiState) {
    let block = rounded_block(format!(
        " Trade History ({}) ",
        snapshot.trade_history.len()
    ));

    if snapshot.trade_history.is_empty() {
        let empty = Paragraph::new("No trades yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Borders plus header row
    let visible = area.height.saturating_sub(3).max(1) as usize;
    let cursor_x = ui.cursor.x();
    let cursor_y = ui.cursor.y().min(snapshot.trade_history.len() - 1);
    let offset = cursor_y.saturating_sub(visible - 1);

    let rows: Vec<Row> = snapshot
        .trade_history
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(y, trade)| {
            let cells = trade.cells().into_iter().enumerate().map(|(x, value)| {
                if x == cursor_x && y == cursor_y {
                    Cell::from(format!("[{}]", value)).style(Style::default().fg(Color::Yellow))
                } else {
                    Cell::from(value)
                }
            });
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Min(14),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(TRADE_TABLE_COLUMNS).style(Style::default().fg(Color::Cyan)))
        .block(block);
    frame.render_widget(table, area);
}

fn draw_config(frame: &mut Frame, area: Rect, snapshot: &BusinessSnapshot) {
    let lines: Vec<Line> = if snapshot.config.is_empty() {
        vec![Line::from("No bot configuration reported")]
    } else {
        let key_width = snapshot.config.keys().map(|k| k.len()).max().unwrap_or(0);
        snapshot
            .config
            .iter()
            .map(|(key, value)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<width$}", key, width = key_width),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw("  "),
                    Span::raw(value.clone()),
                ])
            })
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(rounded_block(" Config ".into())),
        area,
    );
}

fn draw_wallet(frame: &mut Frame, area: Rect, snapshot: &BusinessSnapshot) {
    let mut lines = Vec::new();
    if snapshot.wallets.is_empty() {
        lines.push(Line::from("No wallet configured"));
    }
    for wallet in &snapshot.wallets {
        let label = wallet.label.as_deref().unwrap_or("wallet");
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(Color::Cyan)),
            Span::raw(wallet.address.clone()),
        ]));
        for balance in &wallet.balances {
            lines.push(Line::from(format!(
                "  {:<8} {:.6}",
                balance.symbol, balance.amount
            )));
        }
        lines.push(Line::from(""));
    }
    if snapshot.primary_wallet_address().is_some() {
        lines.push(Line::from(Span::styled(
            "ctrl+s opens the first wallet in the explorer",
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).block(rounded_block(" Wallet ".into())),
        area,
    );
}

/// Draw the most recent log lines, newest at the bottom
fn draw_logs(frame: &mut Frame, area: Rect, snapshot: &BusinessSnapshot) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = snapshot.logs.len().saturating_sub(visible);

    let lines: Vec<Line> = snapshot
        .logs
        .iter()
        .skip(skip)
        .map(|entry| {
            let color = match entry.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                "DEBUG" | "TRACE" => Color::DarkGray,
                _ => Color::White,
            };
            Line::from(vec![
                Span::raw(format!("{} ", entry.timestamp)),
                Span::styled(format!("{:<5} ", entry.level), Style::default().fg(color)),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();

    let title = format!(" Logs ({}) ", snapshot.logs.len());
    frame.render_widget(Paragraph::new(lines).block(rounded_block(title)), area);
}
