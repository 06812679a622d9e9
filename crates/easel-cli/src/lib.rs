//! Controller runtime for the Easel command bridge.
//!
//! The crate owns the controller side of the bridge: a connection manager
//! that sends one request per connection, typed tools built on top of it, a
//! capability manifest, and the `easel` command-line front end. The runtime
//! can be driven from the binary entrypoint or from tests where configuration
//! loading and IO streams are substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use easel_config::Config;
use easel_proto::Kwargs;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
pub mod connection;
mod errors;
pub mod manifest;
pub mod tools;

use cli::{Cli, CliCommand};
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub use connection::{CallError, ConnectionManager};
pub(crate) use errors::AppError;
pub use manifest::{ToolDescriptor, openapi_document, tool_registry};
pub use tools::{ToolError, Tools};

const CLI_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::cli");

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let cli = match Cli::try_parse_from(cli_arguments) {
            Ok(cli) => cli,
            Err(error) => return self.report_usage(&error),
        };

        let result = self
            .loader
            .load(&split.config_arguments)
            .and_then(|config| self.dispatch(cli, &config));

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                self.report_failure(&error);
                ExitCode::FAILURE
            }
        }
    }

    fn dispatch(&mut self, cli: Cli, config: &Config) -> Result<(), AppError> {
        init_logging(config);
        if cli.capabilities {
            let document = openapi_document(&tool_registry());
            return emit_json(&document, self.io.stdout);
        }
        let command = cli.command.ok_or(AppError::MissingCommand)?;
        let mut connection = ConnectionManager::from_config(config).map_err(ToolError::from)?;
        let value = execute_command(command, &mut connection, config.root_namespace())?;
        emit_json(&value, self.io.stdout)
    }

    fn report_usage(&mut self, error: &clap::Error) -> ExitCode {
        if error.use_stderr() {
            let _ = write!(self.io.stderr, "{error}");
            ExitCode::FAILURE
        } else {
            let _ = write!(self.io.stdout, "{error}");
            ExitCode::SUCCESS
        }
    }

    fn report_failure(&mut self, error: &AppError) {
        let _ = writeln!(self.io.stderr, "Error: {error}");
        if let Some(traceback) = error.traceback() {
            let _ = writeln!(self.io.stderr, "Traceback:\n{traceback}");
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}

fn execute_command(
    command: CliCommand,
    connection: &mut ConnectionManager,
    root: &str,
) -> Result<Value, AppError> {
    let mut tools = Tools::new(connection, root);
    let value = match command {
        CliCommand::Call { path, args, kwargs } => {
            let args = args.iter().map(|raw| parse_value(raw)).collect();
            let kwargs = parse_kwargs(&kwargs)?;
            tools.call_api(&path, args, kwargs)?
        }
        CliCommand::Images => tools.get_images()?,
        CliCommand::ImageInfo { image_id } => tools.get_image_info(image_id)?,
        CliCommand::Blur { image_id, radius } => tools.apply_gaussian_blur(image_id, radius)?,
    };
    Ok(value)
}

/// Parses an argument as JSON, keeping it as a string when it is not JSON.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn parse_kwargs(raw: &[String]) -> Result<Kwargs, AppError> {
    raw.iter()
        .map(|argument| {
            let (key, value) = argument
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| AppError::InvalidKeywordArgument {
                    argument: argument.clone(),
                })?;
            Ok((key.to_owned(), parse_value(value)))
        })
        .collect()
}

fn emit_json<W: Write>(value: &Value, stdout: &mut W) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *stdout, value).map_err(AppError::SerialiseOutput)?;
    stdout.write_all(b"\n").map_err(AppError::WriteOutput)?;
    stdout.flush().map_err(AppError::WriteOutput)
}

/// Installs a compact stderr subscriber honouring the configured filter.
///
/// Installation is skipped when a global subscriber already exists.
fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_new(config.log_filter()).unwrap_or_else(|_| EnvFilter::new("warn"));
    let installed = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();
    debug!(target: CLI_TARGET, installed, "controller logging configured");
}

#[cfg(test)]
mod tests;
