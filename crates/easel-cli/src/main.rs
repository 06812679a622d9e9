//! CLI entrypoint for the Easel controller.
//!
//! Delegates to [`easel_cli::run`], which loads configuration, parses the
//! requested tool and talks to the bridge.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    easel_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
