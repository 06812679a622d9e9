//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::net::TcpListener;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};

use easel_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader that binds an ephemeral loopback port.
#[derive(Debug, Clone)]
pub struct TestConfigLoader {
    config: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_port(0)
    }

    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self {
            config: Config {
                bridge_host: "127.0.0.1".to_owned(),
                bridge_port: port,
                ..Config::default()
            },
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("easeld"),
            OsString::from("--bridge-port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}

/// Returns a loader pointing at a port held by the returned listener.
pub fn occupied_port_loader() -> (TcpListener, TestConfigLoader) {
    let holder = TcpListener::bind(("127.0.0.1", 0)).expect("bind placeholder listener");
    let port = holder.local_addr().expect("placeholder address").port();
    (holder, TestConfigLoader::with_port(port))
}
