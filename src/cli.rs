use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List network interfaces and their cumulative byte counters
    Ifaces {
        /// Output format
        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },
    /// Monitor interface throughput at a fixed cadence
    Watch(Watch),
}

#[derive(Parser, Clone, Debug)]
pub struct Watch {
    /// Interface to monitor, or "all" to aggregate every interface
    #[arg(long, default_value = "all")]
    pub iface: String,

    /// Output mode
    #[arg(long, value_enum, default_value_t = OutputMode::Dash)]
    pub mode: OutputMode,

    /// Seconds between samples
    #[arg(long, default_value_t = 1.0)]
    pub interval: f64,

    /// Take a single sample and exit
    #[arg(long)]
    pub once: bool,

    /// Stop after this many samples
    #[arg(long, conflicts_with = "once")]
    pub count: Option<u64>,

    /// Disable smoothing; the smoothed fields mirror the raw rates
    #[arg(long)]
    pub no_ema: bool,

    /// Smoothing factor, 0 < alpha <= 1 (closer to 1 reacts faster)
    #[arg(long, default_value_t = 0.2)]
    pub ema_alpha: f64,

    /// Which rate series drives the dashboard bars
    #[arg(long, value_enum, default_value_t = ViewMode::Both)]
    pub view: ViewMode,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ListFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputMode {
    /// One human-readable line per sample
    Text,
    /// One JSON record per sample
    Json,
    /// Full-screen live dashboard
    Dash,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Raw,
    Ema,
    Both,
}
