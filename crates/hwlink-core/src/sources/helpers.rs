//! Shared helpers used by multiple metric adapters.
//!
//! Keeps the file reading and subprocess plumbing in one place so each
//! adapter only deals with parsing its own format.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use log::{debug, trace};

/// Poll interval while waiting for a child process.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

// ---------------------------------------------------------------------------
// sysfs / procfs
// ---------------------------------------------------------------------------

/// Read a small text file and return its trimmed content.
///
/// Returns `None` if the file is missing, unreadable or blank.
pub fn read_trimmed(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let v = raw.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

/// Read a file holding a single unsigned integer.
pub fn read_u64(path: &Path) -> Option<u64> {
    read_trimmed(path)?.parse().ok()
}

/// Read a file holding a single signed integer.
pub fn read_i64(path: &Path) -> Option<i64> {
    read_trimmed(path)?.parse().ok()
}

// ---------------------------------------------------------------------------
// Subprocess with timeout
// ---------------------------------------------------------------------------

/// Run `program` with `args` and return its stdout, bounded by `timeout`.
///
/// Returns `None` if the program cannot be spawned (not installed), exits
/// with a non-zero status, prints nothing, or is still running when the
/// timeout expires. A timed-out child is killed and reaped.
pub fn run_command(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            debug!("{program}: cannot spawn: {e}");
            return None;
        }
    };

    // Drain stdout on a separate thread so a chatty child cannot fill the
    // pipe and stall before it exits.
    let mut stdout = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        let mut out = Vec::new();
        let _ = stdout.read_to_end(&mut out);
        out
    });

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let out = reader.join().ok()?;
                if !status.success() {
                    debug!("{program}: exited with {status}");
                    return None;
                }
                let s = String::from_utf8_lossy(&out).trim().to_string();
                trace!("{program}: {} bytes of output", s.len());
                return if s.is_empty() { None } else { Some(s) };
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    debug!("{program}: timed out after {timeout:?}");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                debug!("{program}: wait failed: {e}");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}
