mod app;
mod args;
mod config;
mod effects;
mod render;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::engine_error;

fn main() -> ExitCode {
    let cli = args::Cli::parse();
    engine_logging::initialize(cli.log.into(), cli.log_level());

    match app::run(cli) {
        Ok(code) => code,
        Err(err) => {
            engine_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
