use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use crate::counters::{CounterError, CounterSource, Counters, IfaceSelector};

/// Floor on tick spacing so rate division stays bounded under clock
/// jitter or back-to-back calls.
const MIN_INTERVAL_SECS: f64 = 0.01;

/// One measurement, emitted per tick. Field names are the stable
/// contract for the JSON record output.
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub iface: String,
    pub interval_secs: f64,
    pub sent_bps: f64,
    pub recv_bps: f64,
    pub sent_ema_bps: f64,
    pub recv_ema_bps: f64,
    pub ema_enabled: bool,
    pub ema_alpha: f64,
    pub total_sent: i64,
    pub total_recv: i64,
    pub uptime_secs: f64,
    pub timestamp: f64,
}

#[derive(Debug, Error)]
pub enum SampleError {
    /// The monitored interface disappeared between ticks. Fatal: the
    /// quantity being measured no longer exists.
    #[error("interface '{0}' lost while monitoring")]
    InterfaceLost(String),
    #[error(transparent)]
    Source(#[from] CounterError),
}

/// Run-scoped sampling state (baseline counters, previous tick,
/// EMA accumulators). Mutated only by `sample`.
#[derive(Debug)]
pub struct Engine<S> {
    source: S,
    selector: IfaceSelector,
    use_ema: bool,
    alpha: f64,
    start: Counters,
    prev: Counters,
    started_at: Instant,
    last_tick: Instant,
    sent_ema: f64,
    recv_ema: f64,
    ema_seeded: bool,
}

impl<S: CounterSource> Engine<S> {
    /// Takes the baseline reading; fails if the selector cannot be
    /// resolved against the current interface set.
    pub fn new(
        mut source: S,
        selector: IfaceSelector,
        use_ema: bool,
        alpha: f64,
    ) -> Result<Self, CounterError> {
        let start = source.read(&selector)?;
        let now = Instant::now();
        Ok(Self {
            source,
            selector,
            use_ema,
            alpha,
            start,
            prev: start,
            started_at: now,
            last_tick: now,
            sent_ema: 0.0,
            recv_ema: 0.0,
            ema_seeded: false,
        })
    }

    pub fn sample(&mut self) -> Result<Sample, SampleError> {
        self.sample_at(Instant::now())
    }

    fn sample_at(&mut self, now: Instant) -> Result<Sample, SampleError> {
        let interval = now
            .saturating_duration_since(self.last_tick)
            .as_secs_f64()
            .max(MIN_INTERVAL_SECS);

        let current = match self.source.read(&self.selector) {
            Ok(c) => c,
            Err(CounterError::NotFound(name)) => {
                return Err(SampleError::InterfaceLost(name));
            }
            Err(e) => return Err(e.into()),
        };

        // Signed deltas: a counter reset surfaces as a negative rate
        // instead of being clamped away.
        let sent_bps = (current.sent as f64 - self.prev.sent as f64) / interval;
        let recv_bps = (current.recv as f64 - self.prev.recv as f64) / interval;

        if !self.use_ema {
            // Smoothed fields mirror the raw rates when smoothing is off.
            self.sent_ema = sent_bps;
            self.recv_ema = recv_bps;
        } else if !self.ema_seeded {
            self.sent_ema = sent_bps;
            self.recv_ema = recv_bps;
            self.ema_seeded = true;
        } else {
            self.sent_ema = self.alpha * sent_bps + (1.0 - self.alpha) * self.sent_ema;
            self.recv_ema = self.alpha * recv_bps + (1.0 - self.alpha) * self.recv_ema;
        }

        let total_sent = current.sent as i64 - self.start.sent as i64;
        let total_recv = current.recv as i64 - self.start.recv as i64;

        self.prev = current;
        self.last_tick = now;

        Ok(Sample {
            iface: self.selector.to_string(),
            interval_secs: interval,
            sent_bps,
            recv_bps,
            sent_ema_bps: self.sent_ema,
            recv_ema_bps: self.recv_ema,
            ema_enabled: self.use_ema,
            ema_alpha: self.alpha,
            total_sent,
            total_recv,
            uptime_secs: now.saturating_duration_since(self.started_at).as_secs_f64(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0),
        })
    }
}
