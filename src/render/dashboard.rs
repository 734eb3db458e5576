use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, Paragraph},
    Terminal,
};

use crate::cli::ViewMode;
use crate::engine::Sample;
use crate::render::Render;
use crate::units::humanize;

/// Highest bar metric seen so far in the run. Bars are scaled against
/// this, so a new peak compresses everything drawn after it and the
/// fill never exceeds full width.
struct BarCeiling {
    max_sent: f64,
    max_recv: f64,
}

impl BarCeiling {
    fn new() -> Self {
        Self {
            max_sent: 1.0,
            max_recv: 1.0,
        }
    }

    /// Raise the ceiling; it never comes back down within a run.
    fn observe(&mut self, sent: f64, recv: f64) {
        self.max_sent = self.max_sent.max(sent);
        self.max_recv = self.max_recv.max(recv);
    }

    fn sent_ratio(&self, value: f64) -> f64 {
        (value / self.max_sent).clamp(0.0, 1.0)
    }

    fn recv_ratio(&self, value: f64) -> f64 {
        (value / self.max_recv).clamp(0.0, 1.0)
    }
}

/// Full-screen redraw per tick on the alternate screen.
pub struct DashboardRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    view: ViewMode,
    ceiling: BarCeiling,
}

impl DashboardRenderer {
    pub fn new(view: ViewMode) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            view,
            ceiling: BarCeiling::new(),
        })
    }
}

fn mode_label(view: ViewMode) -> &'static str {
    match view {
        ViewMode::Raw => "RAW",
        ViewMode::Ema => "EMA",
        ViewMode::Both => "BOTH",
    }
}

fn speed_lines(view: ViewMode, sample: &Sample) -> Vec<String> {
    match view {
        ViewMode::Both => vec![
            format!(
                "OUT raw {:>12} | avg {:>12}",
                humanize(sample.sent_bps, true),
                humanize(sample.sent_ema_bps, true)
            ),
            format!(
                "IN  raw {:>12} | avg {:>12}",
                humanize(sample.recv_bps, true),
                humanize(sample.recv_ema_bps, true)
            ),
        ],
        ViewMode::Ema => vec![
            format!("OUT {:>12}", humanize(sample.sent_ema_bps, true)),
            format!("IN  {:>12}", humanize(sample.recv_ema_bps, true)),
        ],
        ViewMode::Raw => vec![
            format!("OUT {:>12}", humanize(sample.sent_bps, true)),
            format!("IN  {:>12}", humanize(sample.recv_bps, true)),
        ],
    }
}

impl Render for DashboardRenderer {
    fn render(&mut self, sample: &Sample) -> Result<()> {
        let (bar_sent, bar_recv) = match self.view {
            ViewMode::Raw => (sample.sent_bps, sample.recv_bps),
            ViewMode::Ema | ViewMode::Both => (sample.sent_ema_bps, sample.recv_ema_bps),
        };
        self.ceiling.observe(bar_sent, bar_recv);
        let sent_ratio = self.ceiling.sent_ratio(bar_sent);
        let recv_ratio = self.ceiling.recv_ratio(bar_recv);

        let title = format!(
            "NETWORK TRAFFIC [{}] ({})",
            sample.iface,
            mode_label(self.view)
        );
        let speed = speed_lines(self.view, sample).join("\n");
        let totals = format!(
            "Sent: {}\nRecv: {}\nTime: {} sec",
            humanize(sample.total_sent as f64, false),
            humanize(sample.total_recv as f64, false),
            sample.uptime_secs as u64,
        );
        let footer = format!("q: quit | {}", Local::now().format("%H:%M:%S"));

        self.terminal.draw(|f| {
            let outer = Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(3), // header
                        Constraint::Length(4), // current speed
                        Constraint::Length(6), // bars
                        Constraint::Length(5), // totals
                        Constraint::Min(0),    // spacer
                        Constraint::Length(1), // footer
                    ]
                    .as_ref(),
                )
                .split(f.size());

            let header = Paragraph::new(title)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(header, outer[0]);

            let speed = Paragraph::new(speed)
                .block(Block::default().title("Current Speed").borders(Borders::ALL));
            f.render_widget(speed, outer[1]);

            let bars = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Length(3)].as_ref())
                .split(outer[2]);

            let out_bar = Gauge::default()
                .block(Block::default().title("OUT").borders(Borders::ALL))
                .gauge_style(Style::default().fg(Color::Green))
                .ratio(sent_ratio)
                .label(humanize(bar_sent, true));
            f.render_widget(out_bar, bars[0]);

            let in_bar = Gauge::default()
                .block(Block::default().title("IN").borders(Borders::ALL))
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(recv_ratio)
                .label(humanize(bar_recv, true));
            f.render_widget(in_bar, bars[1]);

            let totals = Paragraph::new(totals).block(
                Block::default()
                    .title("Total since start")
                    .borders(Borders::ALL),
            );
            f.render_widget(totals, outer[3]);

            let footer = Paragraph::new(footer).style(Style::default().fg(Color::DarkGray));
            f.render_widget(footer, outer[5]);
        })?;
        Ok(())
    }

    fn poll_quit(&mut self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            if event::poll(deadline - now)? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('q')
                        || (key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL))
                    {
                        return Ok(true);
                    }
                }
            }
        }
    }
}

impl Drop for DashboardRenderer {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_never_decreases() {
        let mut ceiling = BarCeiling::new();
        let mut seen = Vec::new();
        for value in [10.0, 50.0, 5.0, 80.0, 20.0] {
            ceiling.observe(value, value);
            seen.push(ceiling.max_sent);
        }
        assert_eq!(seen, vec![10.0, 50.0, 50.0, 80.0, 80.0]);
    }

    #[test]
    fn ratio_uses_highest_seen_value() {
        let mut ceiling = BarCeiling::new();
        ceiling.observe(10.0, 10.0);
        ceiling.observe(50.0, 50.0);
        ceiling.observe(5.0, 5.0);
        assert_eq!(ceiling.sent_ratio(5.0), 0.10);
        assert_eq!(ceiling.recv_ratio(5.0), 0.10);
    }

    #[test]
    fn ratio_saturates_at_full_width() {
        let ceiling = BarCeiling::new();
        assert_eq!(ceiling.sent_ratio(1000.0), 1.0);
    }

    #[test]
    fn negative_rate_draws_an_empty_bar() {
        let mut ceiling = BarCeiling::new();
        ceiling.observe(100.0, 100.0);
        assert_eq!(ceiling.sent_ratio(-50.0), 0.0);
    }

    #[test]
    fn both_view_shows_raw_and_smoothed() {
        let sample = Sample {
            iface: "eth0".into(),
            interval_secs: 1.0,
            sent_bps: 1024.0,
            recv_bps: 2048.0,
            sent_ema_bps: 512.0,
            recv_ema_bps: 256.0,
            ema_enabled: true,
            ema_alpha: 0.2,
            total_sent: 0,
            total_recv: 0,
            uptime_secs: 0.0,
            timestamp: 0.0,
        };
        let lines = speed_lines(ViewMode::Both, &sample);
        assert!(lines[0].contains("raw") && lines[0].contains("avg"));
        assert!(lines[0].contains("1.0 KB/s") && lines[0].contains("512.0 B/s"));
        let raw_only = speed_lines(ViewMode::Raw, &sample);
        assert!(raw_only[0].contains("1.0 KB/s") && !raw_only[0].contains("raw"));
    }
}
