//! Work queue shared by connection threads and the host loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::{debug, error};

use crate::host::HostNamespace;

use super::{MARSHAL_TARGET, MarshalError};

type Job = Box<dyn FnOnce(&dyn HostNamespace) + Send>;

/// Creates a connected submitter and host-side queue.
#[must_use]
pub fn channel() -> (Marshaler, HostQueue) {
    let (sender, receiver) = mpsc::channel();
    (Marshaler { sender }, HostQueue { receiver })
}

/// Posts work to the host execution context and waits for its outcome.
#[derive(Debug, Clone)]
pub struct Marshaler {
    sender: Sender<Job>,
}

impl Marshaler {
    /// Runs `job` on the host execution context, blocking until it completes.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Unavailable`] when the host queue has been
    /// dropped or the job did not complete.
    pub fn run<F, T>(&self, job: F) -> Result<T, MarshalError>
    where
        F: FnOnce(&dyn HostNamespace) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply, completion) = mpsc::sync_channel(1);
        let job: Job = Box::new(move |namespace| {
            if reply.send(job(namespace)).is_err() {
                debug!(target: MARSHAL_TARGET, "submitter abandoned marshaled work");
            }
        });
        self.sender
            .send(job)
            .map_err(|_| MarshalError::Unavailable)?;
        completion.recv().map_err(|_| MarshalError::Unavailable)
    }
}

/// Host-side end of the work queue.
///
/// Owned by the thread that may touch the host graph.
#[derive(Debug)]
pub struct HostQueue {
    receiver: Receiver<Job>,
}

impl HostQueue {
    /// Runs every unit of work already queued and returns how many ran.
    ///
    /// Intended to be called between iterations of a host event loop.
    pub fn drain(&self, namespace: &dyn HostNamespace) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            run_job(job, namespace);
            ran += 1;
        }
        ran
    }

    /// Waits up to `wait` for work, then drains the queue.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Disconnected`] once every submitter is gone.
    pub fn run_once(
        &self,
        namespace: &dyn HostNamespace,
        wait: Duration,
    ) -> Result<usize, MarshalError> {
        match self.receiver.recv_timeout(wait) {
            Ok(job) => {
                run_job(job, namespace);
                Ok(1 + self.drain(namespace))
            }
            Err(RecvTimeoutError::Timeout) => Ok(0),
            Err(RecvTimeoutError::Disconnected) => Err(MarshalError::Disconnected),
        }
    }

    /// Serves work until `shutdown` is set or every submitter is gone.
    pub fn run_until(&self, namespace: &dyn HostNamespace, shutdown: &AtomicBool, poll: Duration) {
        while !shutdown.load(Ordering::SeqCst) {
            if self.run_once(namespace, poll).is_err() {
                debug!(target: MARSHAL_TARGET, "work queue disconnected");
                break;
            }
        }
    }
}

fn run_job(job: Job, namespace: &dyn HostNamespace) {
    if panic::catch_unwind(AssertUnwindSafe(|| job(namespace))).is_err() {
        error!(target: MARSHAL_TARGET, "marshaled work panicked on the host");
    }
}
