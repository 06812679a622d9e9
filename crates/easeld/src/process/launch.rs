//! Runs the bridge against the demo host until shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::{error, info};

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::studio::Studio;

use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::PROCESS_TARGET;

/// Runs the bridge using the production collaborators.
///
/// The calling thread becomes the host execution context: it owns the demo
/// host and serves marshaled requests until a termination signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails or the listener does not
/// stop cleanly.
pub fn run_bridge() -> Result<(), LaunchError> {
    let reporter = Arc::new(StructuredHealthReporter::new());
    let shutdown = SystemShutdownSignal::new();
    run_bridge_with(&SystemConfigLoader, reporter, shutdown)
}

/// Runs the bridge with injected collaborators.
pub(crate) fn run_bridge_with<L, S>(
    loader: &L,
    reporter: Arc<dyn HealthReporter>,
    shutdown: S,
) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal + 'static,
{
    info!(target: PROCESS_TARGET, "starting bridge runtime");
    let bridge = bootstrap_with(loader, reporter)?;
    let studio = Studio::with_sample_image(bridge.config().root_namespace());
    let running = bridge.start()?;

    let stop = Arc::new(AtomicBool::new(false));
    watch_for_shutdown(shutdown, Arc::clone(&stop))?;
    running.serve(&studio, &stop);

    running
        .stop()
        .map_err(|source| LaunchError::Stop { source })?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

fn watch_for_shutdown<S>(shutdown: S, stop: Arc<AtomicBool>) -> Result<(), LaunchError>
where
    S: ShutdownSignal + 'static,
{
    thread::Builder::new()
        .name("easeld-shutdown".to_owned())
        .spawn(move || {
            if let Err(error) = shutdown.wait() {
                error!(
                    target: PROCESS_TARGET,
                    error = %error,
                    "shutdown watcher failed; stopping bridge"
                );
            }
            stop.store(true, Ordering::SeqCst);
        })
        .map(drop)
        .map_err(|source| LaunchError::Watcher { source })
}
