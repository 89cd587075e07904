//! RedeKids command line front end.
//!
//! # Responsibility
//! - Load `.env`, parse flags, start file logging and dispatch commands.
//! - Print a short user-facing message and exit with status 1 on failure.

mod cli;

use clap::Parser;

fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let args = cli::Cli::parse();
    if let Err(err) = cli::run(args) {
        eprintln!("{}", cli::helpers::user_message(&err));
        log::error!("event=cli_command module=cli status=error error={err:#}");
        std::process::exit(1);
    }
}
