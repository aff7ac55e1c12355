//! Binary entrypoint for the `ripple` CLI.

use std::process::ExitCode;

use ripple::Outcome;

fn main() -> ExitCode {
    match ripple::run(std::env::args()) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::BreakingChanges) => ExitCode::from(2),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
