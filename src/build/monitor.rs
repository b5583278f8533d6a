//! Build progress reporting from the growing Unity log.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Log keywords reported as build milestones, in priority order.
pub const MILESTONES: [&str; 10] = [
    "Compiling scripts",
    "Building Library",
    "Building player",
    "Building WebGL Player",
    "IL2CPP",
    "Building il2cpp",
    "Generating code",
    "Compiling C++ code",
    "Building WASM",
    "Emscripten",
];

const STOP_CHECK: Duration = Duration::from_millis(100);

/// The first milestone found, scanning lines in order.
pub fn first_milestone(text: &str) -> Option<&'static str> {
    text.lines()
        .find_map(|line| MILESTONES.iter().find(|m| line.contains(*m)).copied())
}

pub fn progress_line(project: &str, elapsed: Duration, milestone: Option<&str>) -> String {
    let secs = elapsed.as_secs();
    format!(
        "[{}] {}m {}s elapsed - {}",
        project,
        secs / 60,
        secs % 60,
        milestone.unwrap_or("build in progress")
    )
}

/// Reads whatever was appended to a file since the last poll.
#[derive(Debug)]
pub struct LogTail {
    path: PathBuf,
    offset: u64,
}

impl LogTail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
        }
    }

    #[cfg(test)]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// New content since the previous poll, or `None` if there is none yet.
    ///
    /// A file that shrank is read again from the start.
    pub fn poll(&mut self) -> std::io::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut file = File::open(&self.path)?;
        if file.metadata()?.len() < self.offset {
            self.offset = 0;
        }
        file.seek(SeekFrom::Start(self.offset))?;

        let mut buf = Vec::new();
        let read = file.read_to_end(&mut buf)?;
        self.offset += read as u64;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Background thread that prints build milestones until stopped.
pub struct ProgressMonitor {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressMonitor {
    /// Print progress for `project` to stdout every `interval`.
    pub fn start(project: &str, log: &Path, interval: Duration, started: Instant) -> Self {
        Self::start_with(project, log, interval, started, |line| {
            println!("  {}", line)
        })
    }

    pub fn start_with<F>(
        project: &str,
        log: &Path,
        interval: Duration,
        started: Instant,
        report: F,
    ) -> Self
    where
        F: Fn(String) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let project = project.to_string();
        let mut tail = LogTail::new(log);

        let handle = std::thread::spawn(move || {
            while wait_or_stop(&flag, interval) {
                match tail.poll() {
                    Ok(Some(new)) => report(progress_line(
                        &project,
                        started.elapsed(),
                        first_milestone(&new),
                    )),
                    Ok(None) => {}
                    Err(e) => tracing::debug!(project = %project, "progress poll failed: {}", e),
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::debug!("progress monitor thread panicked");
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sleep up to `interval` in short slices. Returns false once stop is set.
fn wait_or_stop(stop: &AtomicBool, interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(STOP_CHECK.min(deadline - now));
    }
}
