//! Serial port discovery and opening.
//!
//! [`PortOpener`] is the seam between the transport and the OS. The
//! production [`SystemPorts`] scans `/dev` for USB serial adapters and opens
//! them with the `serialport` crate; tests substitute in-memory openers.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, trace};
use serialport::{DataBits, FlowControl, Parity, StopBits};

use crate::error::TransportError;

/// Returned by [`discover_port`] when nothing better is found, so the
/// connect attempt fails with a diagnosable error.
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Device name prefixes scanned, in priority order.
const CANDIDATE_PREFIXES: &[&str] = &["ttyUSB", "ttyACM"];

/// Read/write timeout applied to an open port.
const PORT_TIMEOUT: Duration = Duration::from_secs(1);

/// An open, writable serial link.
pub type Link = Box<dyn Write + Send>;

/// Enumerates and opens serial devices.
pub trait PortOpener: Send {
    /// Candidate device paths in discovery order.
    fn candidates(&self) -> Vec<String>;

    /// Open `path` at `baud`.
    fn open(&self, path: &str, baud: u32) -> Result<Link, TransportError>;
}

/// Real serial devices under `/dev`.
pub struct SystemPorts {
    dev_dir: PathBuf,
}

impl SystemPorts {
    pub fn new() -> Self {
        Self::with_dev_dir("/dev")
    }

    /// Scan `dir` instead of `/dev`.
    pub fn with_dev_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dev_dir: dir.into(),
        }
    }
}

impl Default for SystemPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl PortOpener for SystemPorts {
    fn candidates(&self) -> Vec<String> {
        let names: Vec<String> = match std::fs::read_dir(&self.dev_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .collect(),
            Err(e) => {
                debug!("{}: {e}", self.dev_dir.display());
                return Vec::new();
            }
        };

        let mut out = Vec::new();
        for prefix in CANDIDATE_PREFIXES {
            let mut group: Vec<(u32, &String)> = names
                .iter()
                .filter_map(|n| {
                    let index = n.strip_prefix(prefix)?.parse().ok()?;
                    Some((index, n))
                })
                .collect();
            group.sort();
            out.extend(
                group
                    .into_iter()
                    .map(|(_, n)| self.dev_dir.join(n).display().to_string()),
            );
        }
        out
    }

    fn open(&self, path: &str, baud: u32) -> Result<Link, TransportError> {
        let mut port = serialport::new(path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(PORT_TIMEOUT)
            .open()
            .map_err(|e| TransportError::Open {
                port: path.to_string(),
                source: e.into(),
            })?;
        // Some boards reset or stay silent unless RTS is raised.
        if let Err(e) = port.write_request_to_send(true) {
            trace!("{path}: cannot assert RTS: {e}");
        }
        Ok(Box::new(port))
    }
}

/// Pick the port to connect to.
///
/// A configured port is returned as-is. Otherwise the first candidate that
/// opens wins (the probe handle is dropped immediately); failing that, the
/// first candidate; failing that, [`DEFAULT_PORT`].
pub fn discover_port(opener: &dyn PortOpener, configured: Option<&str>, baud: u32) -> String {
    if let Some(port) = configured {
        return port.to_string();
    }

    let candidates = opener.candidates();
    for path in &candidates {
        match opener.open(path, baud) {
            Ok(_probe) => {
                debug!("discovered serial port {path}");
                return path.clone();
            }
            Err(e) => debug!("{e}"),
        }
    }

    candidates
        .into_iter()
        .next()
        .unwrap_or_else(|| DEFAULT_PORT.to_string())
}
