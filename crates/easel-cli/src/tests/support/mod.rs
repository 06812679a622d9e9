//! Test support utilities for controller coverage.
//!
//! Supplies a scripted fake host, a static configuration loader and the
//! behavioural test world so step definitions and unit tests stay focused
//! on their assertions.

mod fake_host;

use std::cell::RefCell;
use std::ffi::OsString;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use easel_config::{BridgeEndpoint, Config};
use easel_proto::Request;
use rstest::fixture;

use crate::{AppError, ConfigLoader, ConnectionManager, IoStreams, run_with_loader};

pub(super) use fake_host::{FakeHost, Reply};

pub(super) const TEST_RESPONSE_TIMEOUT: Duration = Duration::from_millis(300);
const TEST_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const TEST_MAX_BYTES: usize = 64 * 1024;

/// A config loader that returns a fixed configuration for tests.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Connection manager pointed at a fake host on `port`.
pub(super) fn manager_for(port: u16) -> ConnectionManager {
    ConnectionManager::new(
        BridgeEndpoint::new("127.0.0.1", port),
        TEST_CONNECT_TIMEOUT,
        TEST_RESPONSE_TIMEOUT,
        TEST_MAX_BYTES,
    )
}

/// Configuration pointed at a fake host on `port`.
pub(super) fn config_for(port: u16) -> Config {
    Config {
        bridge_host: String::from("127.0.0.1"),
        bridge_port: port,
        response_timeout_ms: 2_000,
        connect_timeout_ms: 1_000,
        log_filter: String::from("off"),
        ..Config::default()
    }
}

/// A port that nothing listens on.
pub(super) fn closed_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).context("bind probe")?;
    let port = listener.local_addr().context("probe address")?.port();
    drop(listener);
    Ok(port)
}

/// Operation paths of the recorded requests, in order.
pub(super) fn operation_paths(requests: &[Request]) -> Vec<&str> {
    requests
        .iter()
        .map(|request| request.params.operation_path.as_str())
        .collect()
}

/// Test world holding CLI state, the fake host, and captured output.
#[derive(Default)]
pub(super) struct TestWorld {
    pub config: Config,
    pub host: Option<FakeHost>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<ExitCode>,
    pub requests: Vec<Request>,
}

impl TestWorld {
    pub fn start_host(&mut self, replies: Vec<Reply>) -> Result<()> {
        let host = FakeHost::spawn(replies)?;
        self.config = config_for(host.port());
        self.host = Some(host);
        Ok(())
    }

    pub fn point_at_closed_port(&mut self) -> Result<()> {
        self.config = config_for(closed_port()?);
        Ok(())
    }

    pub fn run(&mut self, command: &str) -> Result<()> {
        self.stdout.clear();
        self.stderr.clear();
        self.requests.clear();
        let args = Self::build_args(command);
        let loader = StaticConfigLoader::new(self.config.clone());
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        let exit = run_with_loader(args, &mut io, &loader);
        self.exit_code = Some(exit);
        if let Some(host) = self.host.as_mut() {
            self.requests = host.take_requests()?;
        }
        self.host = None;
        Ok(())
    }

    fn build_args(command: &str) -> Vec<OsString> {
        std::iter::once("easel")
            .chain(command.split_whitespace())
            .map(|token| OsString::from(token.trim_matches('"')))
            .collect()
    }

    pub fn stdout_text(&self) -> Result<String> {
        String::from_utf8(self.stdout.clone()).context("stdout utf8")
    }

    pub fn stderr_text(&self) -> Result<String> {
        String::from_utf8(self.stderr.clone()).context("stderr utf8")
    }

    pub fn stdout_json(&self) -> Result<serde_json::Value> {
        serde_json::from_slice(&self.stdout).context("stdout json")
    }

    pub fn assert_exit(&self, expected: ExitCode) -> Result<()> {
        let exit = self.exit_code.context("exit code recorded")?;
        ensure!(exit == expected, "expected exit code {expected:?}, got {exit:?}");
        Ok(())
    }
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
