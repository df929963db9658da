//! docweave CLI entry point.

use clap::Parser;
use docweave::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose, cli.quiet);
    docweave::init();

    let result = match &cli.command {
        Commands::Apply(args) => cli::run_apply(args),
        Commands::Model(args) => cli::run_model(args),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
