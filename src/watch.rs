use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::cli::Watch;
use crate::counters::{IfaceSelector, SystemCounters};
use crate::engine::Engine;
use crate::render::{make_renderer, Render};

/// Rejected option values; reported before any sampling starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("EMA alpha must be between 0 (exclusive) and 1, got {0}")]
    InvalidAlpha(f64),
    #[error("interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),
}

// Pure validation for easier testing
pub(crate) fn validate(args: &Watch) -> Result<(), ConfigError> {
    if !(args.ema_alpha > 0.0 && args.ema_alpha <= 1.0) {
        return Err(ConfigError::InvalidAlpha(args.ema_alpha));
    }
    if !(args.interval.is_finite() && args.interval > 0.0) {
        return Err(ConfigError::InvalidInterval(args.interval));
    }
    Ok(())
}

pub fn run_watch(args: Watch) -> Result<()> {
    validate(&args)?;

    let stop_flag = Arc::new(AtomicBool::new(false));
    {
        let stop = stop_flag.clone();
        let _ = ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        });
    }

    let selector = IfaceSelector::parse(&args.iface);
    info!(iface = %selector, mode = ?args.mode, interval = args.interval, "Starting netmon");

    let mut engine = Engine::new(
        SystemCounters::new(),
        selector,
        !args.no_ema,
        args.ema_alpha,
    )
    .context("Reading initial interface counters")?;

    let mut renderer = make_renderer(args.mode, args.view)?;

    let limit = if args.once { Some(1) } else { args.count };
    let interval = Duration::from_secs_f64(args.interval);

    let mut ticks: u64 = 0;
    let interrupted = loop {
        let sample = engine.sample()?;
        renderer.render(&sample)?;
        ticks += 1;

        if let Some(limit) = limit {
            if ticks >= limit {
                break false;
            }
        }
        if sleep_until_tick(renderer.as_mut(), interval, &stop_flag)? {
            break true;
        }
    };

    // The dashboard restores the terminal on drop; the closing line
    // must land on the normal screen.
    drop(renderer);

    info!(ticks, "Shutting down");
    if interrupted {
        println!("\nStopped.");
    }

    Ok(())
}

/// Wait out one tick interval in short slices so an interrupt or a
/// quit key lands between ticks. Returns true when the run should stop.
fn sleep_until_tick(
    renderer: &mut dyn Render,
    interval: Duration,
    stop: &AtomicBool,
) -> Result<bool> {
    let deadline = Instant::now() + interval;
    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(true);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        let slice = (deadline - now).min(Duration::from_millis(200));
        if renderer.poll_quit(slice)? {
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputMode, ViewMode};

    fn args(ema_alpha: f64, interval: f64) -> Watch {
        Watch {
            iface: "all".into(),
            mode: OutputMode::Text,
            interval,
            once: false,
            count: None,
            no_ema: false,
            ema_alpha,
            view: ViewMode::Both,
        }
    }

    #[test]
    fn accepts_default_options() {
        assert_eq!(validate(&args(0.2, 1.0)), Ok(()));
    }

    #[test]
    fn accepts_alpha_of_one() {
        assert_eq!(validate(&args(1.0, 1.0)), Ok(()));
    }

    #[test]
    fn rejects_zero_alpha() {
        assert_eq!(validate(&args(0.0, 1.0)), Err(ConfigError::InvalidAlpha(0.0)));
    }

    #[test]
    fn rejects_alpha_above_one() {
        assert_eq!(validate(&args(1.5, 1.0)), Err(ConfigError::InvalidAlpha(1.5)));
    }

    #[test]
    fn rejects_nan_alpha() {
        assert!(matches!(
            validate(&args(f64::NAN, 1.0)),
            Err(ConfigError::InvalidAlpha(_))
        ));
    }

    #[test]
    fn rejects_non_positive_interval() {
        assert_eq!(
            validate(&args(0.2, 0.0)),
            Err(ConfigError::InvalidInterval(0.0))
        );
        assert_eq!(
            validate(&args(0.2, -1.0)),
            Err(ConfigError::InvalidInterval(-1.0))
        );
    }

    #[test]
    fn rejects_infinite_interval() {
        assert!(matches!(
            validate(&args(0.2, f64::INFINITY)),
            Err(ConfigError::InvalidInterval(_))
        ));
    }
}
