//! Child process supervision for Unity Editor runs.

use crate::error::{FleetError, Result};
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawn `command`, naming `program` in the error on failure.
pub fn spawn(command: &mut Command, program: &Path) -> Result<Child> {
    command.spawn().map_err(|e| {
        FleetError::UnityError(format!(
            "failed to launch Unity Editor '{}': {}",
            program.display(),
            e
        ))
    })
}

/// Wait for a child process with timeout. Returns (exit_code, timed_out).
///
/// `exit_code` is `None` when the process was killed or ended by a signal.
/// The child is killed when it outlives `timeout` or its status cannot be read.
pub fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<(Option<i32>, bool)> {
    let start = Instant::now();
    let waited = poll_until(
        || child.try_wait(),
        || start.elapsed() >= timeout,
        POLL_INTERVAL,
    );
    if !matches!(waited, Ok(Some(_))) {
        kill_process(child);
    }
    match waited {
        Ok(Some(status)) => Ok((status.code(), false)),
        Ok(None) => Ok((None, true)),
        Err(e) => Err(FleetError::UnityError(format!(
            "failed to check process status: {}",
            e
        ))),
    }
}

/// Poll `status` until it yields a value, errors, or `expired` turns true.
fn poll_until<T, S, E>(mut status: S, expired: E, interval: Duration) -> io::Result<Option<T>>
where
    S: FnMut() -> io::Result<Option<T>>,
    E: Fn() -> bool,
{
    loop {
        if let Some(value) = status()? {
            return Ok(Some(value));
        }
        if expired() {
            return Ok(None);
        }
        std::thread::sleep(interval);
    }
}

/// Kill a process and reap it.
pub fn kill_process(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("kill failed (process may have exited): {}", e);
    }
    let _ = child.wait();
}

/// Drain a pipe on its own thread so a chatty child never blocks on a full pipe.
pub fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Collect a drained pipe; a panicked reader yields empty output.
pub fn collect(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
