//! k8s-validate - Kubernetes manifest batch validator
//!
//! Runs kubeconform and kube-linter over local files or a cloned repository
//! branch in fixed-size batches and writes one aggregated report.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod ai;
mod batch;
mod cli;
mod commands;
mod config;
mod discovery;
mod domain;
mod error;
mod fetcher;
mod git;
mod report;
mod temp;
mod ui;
mod validator;

use cli::Cli;
use config::Config;
use error::{EXIT_FAILURE, EXIT_SUCCESS};

/// Install the global subscriber; logs go to stderr so stdout carries only the report
///
/// `RUST_LOG` wins over the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_FAILURE } else { EXIT_SUCCESS };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    let result = Config::from_env().and_then(|config| commands::validate::run(&cli, &config));

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(code);
        }
    }
}
