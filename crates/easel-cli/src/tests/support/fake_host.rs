//! Fake bridge host for controller tests.
//!
//! Accepts one connection per scripted reply, records the request received
//! on each, and answers according to the script.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use easel_proto::Request;

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);

/// Scripted behaviour for one accepted connection.
#[derive(Debug, Clone)]
pub(in crate::tests) enum Reply {
    /// Writes the line and closes the connection.
    Line(String),
    /// Sends nothing and holds the connection until the peer hangs up.
    Silent,
    /// Closes the connection without sending anything.
    Close,
}

impl Reply {
    pub(in crate::tests) fn success(result: serde_json::Value) -> Self {
        Self::Line(serde_json::json!({ "status": "success", "result": result }).to_string())
    }

    pub(in crate::tests) fn error(message: &str, traceback: Option<&str>) -> Self {
        let mut body = serde_json::json!({ "status": "error", "error": message });
        if let Some(traceback) = traceback {
            body["traceback"] = serde_json::Value::from(traceback);
        }
        Self::Line(body.to_string())
    }
}

/// A scripted host listening on an ephemeral loopback port.
pub(in crate::tests) struct FakeHost {
    port: u16,
    requests: Arc<Mutex<Vec<Request>>>,
    result: Arc<Mutex<Option<Result<()>>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeHost {
    pub fn spawn(replies: Vec<Reply>) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake host")?;
        listener
            .set_nonblocking(true)
            .context("fake host nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests: Arc<Mutex<Vec<Request>>> = Arc::new(Mutex::new(Vec::new()));
        let result: Arc<Mutex<Option<Result<()>>>> = Arc::new(Mutex::new(None));
        let requests_clone = Arc::clone(&requests);
        let result_clone = Arc::clone(&result);
        let handle = thread::spawn(move || {
            let outcome = serve(&listener, &replies, &requests_clone);
            if let Ok(mut guard) = result_clone.lock() {
                *guard = Some(outcome);
            }
        });
        Ok(Self {
            port,
            requests,
            result,
            handle: Some(handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the script to finish and returns the recorded requests.
    pub fn take_requests(&mut self) -> Result<Vec<Request>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake host thread panicked"))?;
        }
        if let Some(outcome) = self
            .result
            .lock()
            .map_err(|error| anyhow!("lock fake host result: {error}"))?
            .take()
        {
            outcome.context("fake host failed")?;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }
}

impl Drop for FakeHost {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(listener: &TcpListener, replies: &[Reply], requests: &Mutex<Vec<Request>>) -> Result<()> {
    for reply in replies {
        let Some(stream) = accept_before_deadline(listener)? else {
            // The controller stopped before using every scripted reply.
            return Ok(());
        };
        stream
            .set_nonblocking(false)
            .context("fake host blocking stream")?;
        if let Some(request) = read_request(&stream)? {
            requests
                .lock()
                .map_err(|error| anyhow!("lock requests: {error}"))?
                .push(request);
        }
        respond(stream, reply)?;
    }
    Ok(())
}

fn accept_before_deadline(listener: &TcpListener) -> Result<Option<TcpStream>> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => return Ok(Some(stream)),
            Err(ref error)
                if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
            {
                thread::sleep(Duration::from_millis(10));
            }
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(error) => return Err(error).context("accept connection"),
        }
    }
}

fn read_request(stream: &TcpStream) -> Result<Option<Request>> {
    let mut line = String::new();
    let mut reader = BufReader::new(stream.try_clone().context("clone stream")?);
    if reader.read_line(&mut line).context("read request")? == 0 {
        return Ok(None);
    }
    let request = serde_json::from_str(&line).context("parse request")?;
    Ok(Some(request))
}

fn respond(mut stream: TcpStream, reply: &Reply) -> Result<()> {
    match reply {
        Reply::Line(line) => {
            stream.write_all(line.as_bytes())?;
            stream.write_all(b"\n")?;
            stream.flush().context("flush reply")
        }
        Reply::Silent => {
            let mut sink = Vec::new();
            // Reset is as good as a clean hang-up here.
            let _ = stream.read_to_end(&mut sink);
            Ok(())
        }
        Reply::Close => Ok(()),
    }
}
