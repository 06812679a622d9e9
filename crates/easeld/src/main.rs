//! `easeld` binary: serves the bridge against the demo host.

use std::process::ExitCode;

fn main() -> ExitCode {
    match easeld::run_bridge() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("easeld: {error}");
            ExitCode::FAILURE
        }
    }
}
