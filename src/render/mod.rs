mod dashboard;
mod record;
mod text;

use std::time::Duration;

use anyhow::Result;

use crate::cli::{OutputMode, ViewMode};
use crate::engine::Sample;

/// Output backend for samples. Implementations may keep cross-tick
/// state of their own (the dashboard tracks a bar ceiling) but never
/// touch the engine.
pub trait Render {
    fn render(&mut self, sample: &Sample) -> Result<()>;

    /// Wait out at most `timeout` between ticks. Returns true when the
    /// user asked to quit.
    fn poll_quit(&mut self, timeout: Duration) -> Result<bool> {
        std::thread::sleep(timeout);
        Ok(false)
    }
}

/// Chosen once at startup; the loop never switches renderers.
pub fn make_renderer(mode: OutputMode, view: ViewMode) -> Result<Box<dyn Render>> {
    Ok(match mode {
        OutputMode::Text => Box::new(text::TextRenderer),
        OutputMode::Json => Box::new(record::RecordRenderer),
        OutputMode::Dash => Box::new(dashboard::DashboardRenderer::new(view)?),
    })
}
