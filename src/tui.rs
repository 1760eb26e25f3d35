use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant, SystemTime};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::{
    sync::{Arc, Mutex},
    thread,
};

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::{ProgressEvent, ProgressSink, ProgressSinkKind, ResolveReport, RunReport};
use crate::error::ShowcaseError;
use crate::render::RunPhase;

const EVENTS_MAX: usize = 8;
const LOGS_MAX: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Operational,
    Logs,
    Help,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Resolve,
    Render,
    Fetch,
    Merge,
    Publish,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Phase::Resolve => "Resolve",
            Phase::Render => "Render",
            Phase::Fetch => "Fetch",
            Phase::Merge => "Merge",
            Phase::Publish => "Publish",
        }
    }

    fn index(self) -> usize {
        match self {
            Phase::Resolve => 0,
            Phase::Render => 1,
            Phase::Fetch => 2,
            Phase::Merge => 3,
            Phase::Publish => 4,
        }
    }
}

#[derive(Debug, Clone)]
struct SummaryRow {
    name: String,
    visits: String,
    owner: String,
    state: &'static str,
}

#[derive(Debug, Clone)]
struct Summary {
    outcome: String,
    total: String,
    rows: Vec<SummaryRow>,
}

#[derive(Debug)]
struct AppState {
    status: String,
    phase: Phase,
    latency_ms: Option<u128>,
    request_count: u64,
    events: VecDeque<String>,
    logs: VecDeque<String>,
    view: View,
    started: Instant,
    active: bool,
    summary: Option<Summary>,
}

pub struct Tui {
    kind: ProgressSinkKind,
    state: Arc<Mutex<AppState>>,
    log_scroll: u16,
}

struct TuiProgress {
    state: Arc<Mutex<AppState>>,
}

impl ProgressSink for TuiProgress {
    fn event(&self, event: ProgressEvent) {
        if let Ok(mut state) = self.state.lock() {
            let message = event.message.trim().to_string();
            if let Some((phase, payload)) = parse_phase(&message) {
                state.phase = phase;
                state.status = payload.to_string();
            } else if event.elapsed.is_none() {
                state.status = message.clone();
            }
            if let Some(elapsed) = event.elapsed {
                state.latency_ms = Some(elapsed.as_millis());
            }

            if message.contains(".request") {
                state.request_count = state.request_count.saturating_add(1);
            }

            push_bounded(&mut state.events, message.clone(), EVENTS_MAX);
            push_bounded(&mut state.logs, format!("[{}] {message}", timestamp()), LOGS_MAX);
        }
    }
}

impl Tui {
    pub fn new(kind: ProgressSinkKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(AppState {
                status: "ready".to_string(),
                phase: Phase::Resolve,
                latency_ms: None,
                request_count: 0,
                events: VecDeque::new(),
                logs: VecDeque::new(),
                view: View::Operational,
                started: Instant::now(),
                active: false,
                summary: None,
            })),
            log_scroll: 0,
        }
    }

    pub fn run<F, R>(&mut self, f: F) -> miette::Result<R>
    where
        F: FnOnce(&dyn ProgressSink) -> Result<R, ShowcaseError> + Send + 'static,
        R: Send + 'static,
    {
        self.set_active(true);

        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let (tx, rx) = mpsc::channel();
        let sink = TuiProgress {
            state: self.state.clone(),
        };
        let handle = thread::spawn(move || tx.send(f(&sink)));

        let mut tick = 0usize;
        loop {
            if let Ok(state) = self.state.lock() {
                terminal
                    .draw(|frame| draw_ui(frame, self, &state, tick))
                    .into_diagnostic()?;
            }

            if let Some(outcome) = poll_worker(&rx) {
                self.set_active(false);
                leave_screen()?;
                handle.join().ok();
                return outcome;
            }

            if event::poll(Duration::from_millis(120)).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if self.handle_key(key) {
                        break;
                    }
                }
            }

            tick = tick.wrapping_add(1);
        }

        self.set_active(false);
        leave_screen()?;
        Err(miette::Report::msg("aborted"))
    }

    pub fn finish_run(&mut self, report: &RunReport) -> miette::Result<()> {
        let outcome = match report.phase {
            RunPhase::Resolved => "resolved".to_string(),
            RunPhase::Failed => format!(
                "failed: {}",
                report.error.as_deref().unwrap_or("upstream unavailable")
            ),
            RunPhase::Placeholder => "placeholder".to_string(),
        };
        let rows = report
            .page
            .cards()
            .iter()
            .map(|card| SummaryRow {
                name: card.name.clone(),
                visits: card.visits.clone(),
                owner: card.owner.clone(),
                state: if card.resolved { "ok" } else { "placeholder" },
            })
            .collect();
        self.show_summary(Summary {
            outcome,
            total: report.page.total().text().to_string(),
            rows,
        })
    }

    pub fn finish_resolve(&mut self, report: &ResolveReport) -> miette::Result<()> {
        let rows = report
            .entries
            .iter()
            .map(|entry| SummaryRow {
                name: entry
                    .identifier
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "n/a".to_string()),
                visits: entry.entry.reference_url.clone(),
                owner: entry.entry.owner.clone(),
                state: if entry.identifier.is_some() {
                    "ok"
                } else {
                    "unresolved"
                },
            })
            .collect();
        self.show_summary(Summary {
            outcome: format!("{} resolved, {} unresolved", report.resolved, report.unresolved),
            total: "n/a".to_string(),
            rows,
        })
    }

    fn show_summary(&mut self, summary: Summary) -> miette::Result<()> {
        if let Ok(mut state) = self.state.lock() {
            state.summary = Some(summary);
            state.view = View::Summary;
        }

        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        loop {
            if let Ok(state) = self.state.lock() {
                terminal
                    .draw(|frame| draw_ui(frame, self, &state, 0))
                    .into_diagnostic()?;
            }
            if event::poll(Duration::from_millis(200)).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if matches!(key.code, KeyCode::Enter) || self.handle_key(key) {
                        break;
                    }
                }
            }
        }

        leave_screen()
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::F(1) | KeyCode::Char('?') => self.set_view(View::Help),
            KeyCode::F(4) | KeyCode::Char('l') => self.set_view(View::Logs),
            KeyCode::Char('s') => {
                let has_summary = self
                    .state
                    .lock()
                    .map(|state| state.summary.is_some())
                    .unwrap_or(false);
                self.set_view(if has_summary {
                    View::Summary
                } else {
                    View::Operational
                });
            }
            KeyCode::Tab => self.set_view(View::Operational),
            KeyCode::PageUp => self.log_scroll = self.log_scroll.saturating_add(5),
            KeyCode::PageDown => self.log_scroll = self.log_scroll.saturating_sub(5),
            KeyCode::Char('q') | KeyCode::Esc => return !self.is_active(),
            _ => {}
        }
        false
    }

    fn set_view(&self, view: View) {
        if let Ok(mut state) = self.state.lock() {
            state.view = view;
        }
    }

    fn is_active(&self) -> bool {
        self.state.lock().map(|state| state.active).unwrap_or(false)
    }

    fn set_active(&self, active: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.active = active;
            if active {
                state.started = Instant::now();
                state.request_count = 0;
                state.latency_ms = None;
                state.phase = Phase::Resolve;
            }
        }
    }
}

// A worker that panicked drops its sender, which ends the run like an error.
fn poll_worker<R>(rx: &Receiver<Result<R, ShowcaseError>>) -> Option<miette::Result<R>> {
    match rx.try_recv() {
        Ok(result) => Some(result.map_err(miette::Report::new)),
        Err(TryRecvError::Disconnected) => Some(Err(miette::Report::msg(
            "worker thread stopped without a result",
        ))),
        Err(TryRecvError::Empty) => None,
    }
}

fn leave_screen() -> miette::Result<()> {
    disable_raw_mode().into_diagnostic()?;
    let mut stdout = io::stdout();
    stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
    Ok(())
}

fn draw_ui(frame: &mut ratatui::Frame, tui: &Tui, state: &AppState, tick: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(state, tui.kind, tick), chunks[0]);

    match state.view {
        View::Operational => {
            let main = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[1]);
            frame.render_widget(draw_status_panel(state), main[0]);
            frame.render_widget(draw_events_panel(state), main[1]);
        }
        View::Logs => frame.render_widget(draw_logs_view(state, tui.log_scroll), chunks[1]),
        View::Help => frame.render_widget(draw_help(), chunks[1]),
        View::Summary => frame.render_widget(draw_summary(state), chunks[1]),
    }

    let footer = if state.active {
        "F1 help · F4 logs · TAB status"
    } else {
        "F1 help · F4 logs · s summary · q quit"
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            footer,
            Style::default().fg(Color::DarkGray),
        ))),
        chunks[2],
    );
}

fn draw_header(state: &AppState, kind: ProgressSinkKind, tick: usize) -> Paragraph<'static> {
    let hb = if state.active && tick % 2 == 0 { "*" } else { " " };
    let op_label = match kind {
        ProgressSinkKind::Build => "Build",
        ProgressSinkKind::Resolve => "Resolve",
    };
    Paragraph::new(Line::from(vec![
        Span::styled(
            "SHOWCASE",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(env!("CARGO_PKG_VERSION"), Style::default().fg(Color::Gray)),
        Span::raw("   Op: "),
        Span::styled(op_label, Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(hb, Style::default().fg(Color::Green)),
    ]))
    .alignment(Alignment::Left)
    .block(Block::default().borders(Borders::BOTTOM))
}

fn draw_status_panel(state: &AppState) -> Paragraph<'static> {
    let steps = [
        Phase::Resolve,
        Phase::Render,
        Phase::Fetch,
        Phase::Merge,
        Phase::Publish,
    ];
    let pipeline: Vec<Span<'static>> = steps
        .iter()
        .flat_map(|step| {
            let style = if *step == state.phase {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if step.index() < state.phase.index() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(step.label(), style), Span::raw("  ")]
        })
        .collect();

    let latency = state
        .latency_ms
        .map(|ms| format!("{ms} ms"))
        .unwrap_or_else(|| "n/a".to_string());
    let lines = vec![
        Line::from(pipeline),
        Line::from(""),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::Gray)),
            Span::raw(state.status.clone()),
        ]),
        Line::from(vec![
            Span::styled("Elapsed: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{:.1}s", state.started.elapsed().as_secs_f64())),
            Span::styled("   Requests: ", Style::default().fg(Color::Gray)),
            Span::raw(state.request_count.to_string()),
            Span::styled("   Last latency: ", Style::default().fg(Color::Gray)),
            Span::raw(latency),
        ]),
    ];
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Pipeline"))
        .wrap(Wrap { trim: true })
}

fn draw_events_panel(state: &AppState) -> Paragraph<'static> {
    let lines: Vec<Line<'static>> = state
        .events
        .iter()
        .map(|event| Line::from(event.clone()))
        .collect();
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Events"))
        .wrap(Wrap { trim: true })
}

fn draw_logs_view(state: &AppState, scroll: u16) -> Paragraph<'static> {
    let total = state.logs.len();
    let visible = 16usize;
    let start = total.saturating_sub(scroll as usize + visible);
    let lines: Vec<Line<'static>> = state
        .logs
        .iter()
        .skip(start)
        .take(visible)
        .map(|line| Line::from(line.clone()))
        .collect();
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Logs (PgUp/PgDn)"))
        .wrap(Wrap { trim: true })
}

fn draw_help() -> Paragraph<'static> {
    let lines = vec![
        Line::from("F1 / ?     this help"),
        Line::from("F4 / l     log history"),
        Line::from("TAB        pipeline status"),
        Line::from("s          run summary (after the run)"),
        Line::from("PgUp/PgDn  scroll logs"),
        Line::from("q / Esc    quit once the run has finished"),
    ];
    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"))
}

fn draw_summary(state: &AppState) -> Paragraph<'static> {
    let Some(summary) = state.summary.as_ref() else {
        return Paragraph::new("no summary yet")
            .block(Block::default().borders(Borders::ALL).title("Summary"));
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Outcome: ", Style::default().fg(Color::Gray)),
            Span::styled(summary.outcome.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Total visits: ", Style::default().fg(Color::Gray)),
            Span::raw(summary.total.clone()),
        ]),
        Line::from(""),
    ];
    for row in &summary.rows {
        let color = if row.state == "ok" {
            Color::Green
        } else {
            Color::Yellow
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", row.state), Style::default().fg(color)),
            Span::raw(format!("{}  ", row.name)),
            Span::styled(row.visits.clone(), Style::default().fg(Color::Cyan)),
            Span::styled(format!("  {}", row.owner), Style::default().fg(Color::Gray)),
        ]));
    }
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Summary (Enter to close)"))
        .wrap(Wrap { trim: true })
}

fn parse_phase(message: &str) -> Option<(Phase, &str)> {
    let (head, rest) = message.split_once(';')?;
    let phase = match head.strip_prefix("phase=")? {
        "Resolve" => Phase::Resolve,
        "Render" => Phase::Render,
        "Fetch" => Phase::Fetch,
        "Merge" => Phase::Merge,
        "Publish" => Phase::Publish,
        _ => return None,
    };
    Some((phase, rest.trim()))
}

fn push_bounded(buffer: &mut VecDeque<String>, item: String, max: usize) {
    buffer.push_back(item);
    while buffer.len() > max {
        buffer.pop_front();
    }
}

fn timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs();
    let mins = (secs / 60) % 60;
    let hours = (secs / 3600) % 24;
    let seconds = secs % 60;
    format!("{hours:02}:{mins:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_phase_messages() {
        let (phase, payload) = parse_phase("phase=Fetch; metadata.request batch 1/2").unwrap();
        assert_eq!(phase, Phase::Fetch);
        assert_eq!(payload, "metadata.request batch 1/2");
        assert!(parse_phase("phase=Unknown; x").is_none());
        assert!(parse_phase("latency_ms=12").is_none());
    }

    #[test]
    fn latency_comes_from_event_elapsed() {
        let tui = Tui::new(ProgressSinkKind::Build);
        let sink = TuiProgress {
            state: tui.state.clone(),
        };
        sink.event(ProgressEvent {
            message: "latency_ms=42".to_string(),
            elapsed: Some(Duration::from_millis(42)),
        });
        let state = tui.state.lock().unwrap();
        assert_eq!(state.latency_ms, Some(42));
        assert_eq!(state.status, "ready");
    }

    #[test]
    fn dropped_worker_ends_the_wait() {
        let (tx, rx) = mpsc::channel::<Result<u8, ShowcaseError>>();
        assert!(poll_worker(&rx).is_none());
        drop(tx);
        let outcome = poll_worker(&rx).unwrap();
        assert!(outcome.is_err());
    }

    #[test]
    fn finished_worker_result_is_returned() {
        let (tx, rx) = mpsc::channel::<Result<u8, ShowcaseError>>();
        tx.send(Ok(7)).unwrap();
        assert_eq!(poll_worker(&rx).unwrap().unwrap(), 7);
    }

    #[test]
    fn progress_counts_requests() {
        let tui = Tui::new(ProgressSinkKind::Build);
        let sink = TuiProgress {
            state: tui.state.clone(),
        };
        sink.event(ProgressEvent {
            message: "phase=Fetch; imagery.request batch 1/1 (3 ids)".to_string(),
            elapsed: None,
        });
        let state = tui.state.lock().unwrap();
        assert_eq!(state.request_count, 1);
        assert_eq!(state.phase, Phase::Fetch);
    }
}
