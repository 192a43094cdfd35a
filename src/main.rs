//! modelgate CLI entry point
//!
//! A minimal entrypoint that:
//! 1. Parses CLI arguments and dispatches commands (via cli::run)
//! 2. Reports errors to stderr as JSON
//! 3. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use modelgate::cli;

fn main() {
    if let Err(e) = cli::run() {
        cli::write_error(&e);
        std::process::exit(1);
    }
}
