use anyhow::Result;
use chrono::Local;

use crate::engine::Sample;
use crate::render::Render;
use crate::units::humanize;

/// One human-readable line per tick. Stateless.
pub struct TextRenderer;

impl Render for TextRenderer {
    fn render(&mut self, sample: &Sample) -> Result<()> {
        let clock = Local::now().format("%H:%M:%S").to_string();
        println!("{}", format_line(sample, &clock));
        Ok(())
    }
}

fn format_line(sample: &Sample, clock: &str) -> String {
    format!(
        "[{}] OUT {} | IN {} | TOTAL {}/{}",
        clock,
        humanize(sample.sent_bps, true),
        humanize(sample.recv_bps, true),
        humanize(sample.total_sent as f64, false),
        humanize(sample.total_recv as f64, false),
    )
}
