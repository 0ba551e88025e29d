mod cli_args;

use std::process::ExitCode;

use clap::Parser;
use cli_args::CliArgs;
use simple_logger::SimpleLogger;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    SimpleLogger::new()
        .with_level(log::Level::from(args.verbosity.clone()).to_level_filter())
        .init()
        .expect("logger can only be initialized once");

    log::info!("compiling {}", args.input.display());

    match bfc::compile_file(&args.input, &args.output, args.debug) {
        Ok(()) => {
            log::info!("wrote {}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
