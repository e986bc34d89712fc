//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use microscore_cli::CliError;

fn main() {
    match microscore_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("microscore: {err}");
            std::process::exit(1);
        }
    }
}
