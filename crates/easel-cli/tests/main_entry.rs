//! Integration tests for the `easel` binary entry point.
//!
//! Verifies the capability manifest probe and user-facing error reporting
//! when the bridge cannot be reached.

use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn capabilities_probe_prints_the_manifest() {
    let mut command = cargo_bin_cmd!("easel");
    command.arg("--capabilities");
    command
        .assert()
        .success()
        .stdout(contains("\"openapi\": \"3.0.0\""))
        .stdout(contains("/apply_gaussian_blur"));
}

#[test]
fn unreachable_bridge_exits_with_failure() {
    let port = {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe");
        listener.local_addr().expect("probe address").port()
    };
    let mut command = cargo_bin_cmd!("easel");
    command
        .args(["--bridge-port", &port.to_string(), "--connect-timeout-ms", "500"])
        .arg("images");
    command
        .assert()
        .failure()
        .stderr(contains("Error: failed to connect to bridge"));
}

#[test]
fn missing_tool_exits_with_failure() {
    let mut command = cargo_bin_cmd!("easel");
    command
        .assert()
        .failure()
        .stderr(contains("a tool must be provided"));
}
