mod cli;
mod counters;
mod engine;
mod render;
mod units;
mod watch;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ListFormat};
use crate::counters::{list_interfaces, CounterError};
use crate::units::humanize;
use crate::watch::run_watch;

fn print_ifaces(format: ListFormat) {
    let ifaces = list_interfaces();
    match format {
        ListFormat::Text => {
            if ifaces.is_empty() {
                eprintln!("<no interfaces>");
                std::process::exit(3);
            }
            for iface in ifaces {
                println!(
                    "{}\tsent {}\trecv {}",
                    iface.name,
                    humanize(iface.sent as f64, false),
                    humanize(iface.recv as f64, false),
                );
            }
        }
        ListFormat::Json => {
            #[derive(serde::Serialize)]
            struct IfaceOut {
                name: String,
                total_sent: u64,
                total_recv: u64,
            }

            let out: Vec<IfaceOut> = ifaces
                .into_iter()
                .map(|iface| IfaceOut {
                    name: iface.name,
                    total_sent: iface.sent,
                    total_recv: iface.recv,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out).unwrap());
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();
    let result: Result<()> = match cli.command {
        Some(Commands::Ifaces { format }) => {
            print_ifaces(format);
            Ok(())
        }
        Some(Commands::Watch(args)) => run_watch(args),
        None => {
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(err) = result {
        // Map to stable exit codes
        let code = exit_code_for_error(&err);
        eprintln!("error: {err:?}");
        std::process::exit(code);
    }
}

pub(crate) fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    // 2: bad config, 3: no interfaces, 4: unknown interface, 5: interface lost, 1: other
    for cause in err.chain() {
        if cause.is::<crate::watch::ConfigError>() {
            return 2;
        }
        if let Some(sample) = cause.downcast_ref::<crate::engine::SampleError>() {
            if matches!(sample, crate::engine::SampleError::InterfaceLost(_)) {
                return 5;
            }
        }
        if let Some(counter) = cause.downcast_ref::<CounterError>() {
            return match counter {
                CounterError::NoInterfaces => 3,
                CounterError::NotFound(_) => 4,
            };
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn exit_code_bad_config() {
        let err = anyhow::Error::from(crate::watch::ConfigError::InvalidAlpha(1.5));
        assert_eq!(exit_code_for_error(&err), 2);
    }

    #[test]
    fn exit_code_no_interfaces() {
        let err = anyhow::Error::from(CounterError::NoInterfaces);
        assert_eq!(exit_code_for_error(&err), 3);
    }

    #[test]
    fn exit_code_unknown_interface() {
        let err = anyhow::Error::from(CounterError::NotFound("eth9".into()));
        assert_eq!(exit_code_for_error(&err), 4);
    }

    #[test]
    fn exit_code_interface_lost() {
        let err = anyhow::Error::from(crate::engine::SampleError::InterfaceLost("eth0".into()));
        assert_eq!(exit_code_for_error(&err), 5);
    }

    #[test]
    fn exit_code_survives_context_wrapping() {
        let err = Result::<()>::Err(CounterError::NotFound("eth9".into()).into())
            .context("Reading initial interface counters")
            .unwrap_err();
        assert_eq!(exit_code_for_error(&err), 4);
    }

    #[test]
    fn exit_code_other() {
        let err = anyhow::anyhow!("other");
        assert_eq!(exit_code_for_error(&err), 1);
    }
}
