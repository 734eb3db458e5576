use std::fmt;

use sysinfo::Networks;
use thiserror::Error;

/// Cumulative sent/received byte counts as reported by the OS, either
/// for one interface or summed across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub sent: u64,
    pub recv: u64,
}

/// Which interface the counters are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IfaceSelector {
    All,
    Name(String),
}

impl IfaceSelector {
    pub fn parse(s: &str) -> Self {
        if s == "all" {
            IfaceSelector::All
        } else {
            IfaceSelector::Name(s.to_string())
        }
    }
}

impl fmt::Display for IfaceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IfaceSelector::All => f.write_str("all"),
            IfaceSelector::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CounterError {
    #[error("no network interfaces available")]
    NoInterfaces,
    #[error("interface '{0}' not found")]
    NotFound(String),
}

/// Source of cumulative counters. The sampling engine only ever talks
/// to this trait, so tests drive it with scripted readings.
pub trait CounterSource {
    fn read(&mut self, selector: &IfaceSelector) -> Result<Counters, CounterError>;
}

/// Live counters from the operating system.
pub struct SystemCounters {
    networks: Networks,
}

impl SystemCounters {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl CounterSource for SystemCounters {
    fn read(&mut self, selector: &IfaceSelector) -> Result<Counters, CounterError> {
        // true: interfaces that disappeared since the last refresh drop out
        self.networks.refresh(true);
        if self.networks.iter().next().is_none() {
            return Err(CounterError::NoInterfaces);
        }
        match selector {
            IfaceSelector::All => {
                let mut sum = Counters::default();
                for (_, data) in self.networks.iter() {
                    sum.sent += data.total_transmitted();
                    sum.recv += data.total_received();
                }
                Ok(sum)
            }
            IfaceSelector::Name(name) => self
                .networks
                .iter()
                .find(|(candidate, _)| candidate.as_str() == name.as_str())
                .map(|(_, data)| Counters {
                    sent: data.total_transmitted(),
                    recv: data.total_received(),
                })
                .ok_or_else(|| CounterError::NotFound(name.clone())),
        }
    }
}

/// One row for the `ifaces` listing.
pub struct IfaceStat {
    pub name: String,
    pub sent: u64,
    pub recv: u64,
}

pub fn list_interfaces() -> Vec<IfaceStat> {
    let networks = Networks::new_with_refreshed_list();
    let mut stats: Vec<IfaceStat> = networks
        .iter()
        .map(|(name, data)| IfaceStat {
            name: name.clone(),
            sent: data.total_transmitted(),
            recv: data.total_received(),
        })
        .collect();
    stats.sort_by(|a, b| a.name.cmp(&b.name));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_all_keyword() {
        assert_eq!(IfaceSelector::parse("all"), IfaceSelector::All);
    }

    #[test]
    fn selector_named_interface() {
        assert_eq!(
            IfaceSelector::parse("eth0"),
            IfaceSelector::Name("eth0".into())
        );
    }

    #[test]
    fn selector_display_round_trips() {
        assert_eq!(IfaceSelector::parse("all").to_string(), "all");
        assert_eq!(IfaceSelector::parse("wlan0").to_string(), "wlan0");
    }
}
