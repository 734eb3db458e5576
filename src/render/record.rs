use anyhow::Result;

use crate::engine::Sample;
use crate::render::Render;

/// One self-describing JSON record per tick, for downstream parsing.
pub struct RecordRenderer;

impl Render for RecordRenderer {
    fn render(&mut self, sample: &Sample) -> Result<()> {
        println!("{}", serde_json::to_string(sample)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_every_field() {
        let sample = Sample {
            iface: "all".into(),
            interval_secs: 1.0,
            sent_bps: 10.0,
            recv_bps: 20.0,
            sent_ema_bps: 12.0,
            recv_ema_bps: 18.0,
            ema_enabled: true,
            ema_alpha: 0.2,
            total_sent: 100,
            total_recv: -5,
            uptime_secs: 42.5,
            timestamp: 1_700_000_000.0,
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&sample).unwrap()).unwrap();
        assert_eq!(value["iface"], "all");
        assert_eq!(value["interval_secs"], 1.0);
        assert_eq!(value["sent_bps"], 10.0);
        assert_eq!(value["recv_bps"], 20.0);
        assert_eq!(value["sent_ema_bps"], 12.0);
        assert_eq!(value["recv_ema_bps"], 18.0);
        assert_eq!(value["ema_enabled"], true);
        assert_eq!(value["ema_alpha"], 0.2);
        assert_eq!(value["total_sent"], 100);
        assert_eq!(value["total_recv"], -5);
        assert_eq!(value["uptime_secs"], 42.5);
        assert_eq!(value["timestamp"], 1_700_000_000.0);
    }
}
