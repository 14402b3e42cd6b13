//! `bundle-deploy` binary: parses arguments and dispatches to a command.
use anyhow::Result;
use clap::Parser;

use bundle_deploy::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log = logging::Logger::new(command);

    let result = match args.command {
        cli::Command::Deploy(opts) => commands::deploy::run(&args.global, &opts, &log),
        cli::Command::Status => commands::status::run(&args.global, &log),
        cli::Command::Verify => commands::verify::run(&args.global, &log),
        cli::Command::Reset => commands::reset::run(&args.global, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    };

    if let Some(path) = log.log_path() {
        log.debug(&format!("log written to {}", path.display()));
    }
    result
}
