//! Serial transport state machine.
//!
//! ```text
//!            connect ok
//! Connecting ──────────► Connected ──┐ tick: sample → encode → write
//!     ▲  │ open failed       │  ▲     │
//!     │  ▼                   │  └─────┘
//! Disconnected ◄─────────────┘ write failed / tick panicked
//! ```
//!
//! Recovery from `Disconnected` waits [`RECONNECT_SHORT_DELAY`], tries one
//! reconnect, and on failure waits [`RECONNECT_LONG_DELAY`] before the next
//! round. Ticks are separated by the configured interval, measured from the
//! end of one tick to the start of the next.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::config::LinkConfig;
use crate::error::TransportError;
use crate::frame::{DISCONNECT_FRAME, encode};
use crate::port::{Link, PortOpener, discover_port};
use crate::sampler::Sampler;

/// Wait before a reconnect attempt after losing the link.
pub const RECONNECT_SHORT_DELAY: Duration = Duration::from_secs(1);
/// Wait after a reconnect attempt failed.
pub const RECONNECT_LONG_DELAY: Duration = Duration::from_secs(5);

/// Granularity at which [`ShutdownAwareSleeper`] checks the shutdown flag.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Every delay the transport takes goes through here.
pub trait Sleeper: Send {
    fn sleep(&mut self, duration: Duration);
}

/// Sleeps in short slices and returns early once shutdown is requested.
pub struct ShutdownAwareSleeper {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownAwareSleeper {
    pub fn new(shutdown: Arc<AtomicBool>) -> Self {
        Self { shutdown }
    }
}

impl Sleeper for ShutdownAwareSleeper {
    fn sleep(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}

/// Owns the serial link and drives the sample → encode → write loop.
pub struct Transport {
    opener: Box<dyn PortOpener>,
    sampler: Sampler,
    config: LinkConfig,
    sleeper: Box<dyn Sleeper>,
    state: LinkState,
    link: Option<Link>,
    /// Port of the current or last connection attempt.
    port: Option<String>,
}

impl Transport {
    pub fn new(
        opener: Box<dyn PortOpener>,
        sampler: Sampler,
        config: LinkConfig,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            opener,
            sampler,
            config,
            sleeper,
            state: LinkState::Disconnected,
            link: None,
            port: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Port of the current or most recent connection attempt.
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Discover a port and open it.
    pub fn connect(&mut self) -> Result<(), TransportError> {
        self.state = LinkState::Connecting;
        let port = discover_port(
            self.opener.as_ref(),
            self.config.port.as_deref(),
            self.config.baud,
        );
        let result = self.opener.open(&port, self.config.baud);
        self.port = Some(port);

        match result {
            Ok(link) => {
                self.link = Some(link);
                self.state = LinkState::Connected;
                info!(
                    "connected to {} at {} baud",
                    self.port.as_deref().unwrap_or_default(),
                    self.config.baud
                );
                Ok(())
            }
            Err(e) => {
                self.link = None;
                self.state = LinkState::Disconnected;
                warn!("{e}");
                Err(e)
            }
        }
    }

    /// Sample, encode and write one frame.
    ///
    /// A write failure or a panic while sampling drops the link.
    pub fn tick(&mut self) -> Result<(), TransportError> {
        if self.link.is_none() {
            return Err(TransportError::NotConnected);
        }

        let sampler = &mut self.sampler;
        let frame = match catch_unwind(AssertUnwindSafe(|| encode(&sampler.sample()))) {
            Ok(frame) => frame,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                self.drop_link(&format!("tick panicked: {reason}"));
                return Err(TransportError::TickPanicked(reason));
            }
        };

        trace!("frame: {}", String::from_utf8_lossy(&frame));
        if let Err(e) = self.try_send(&frame) {
            self.drop_link(&e.to_string());
            return Err(e);
        }
        Ok(())
    }

    /// One recovery round: short wait, one reconnect, long wait on failure.
    pub fn recover(&mut self) -> bool {
        self.sleeper.sleep(RECONNECT_SHORT_DELAY);
        info!("reconnecting");
        if self.connect().is_ok() {
            return true;
        }
        debug!("retrying in {}s", RECONNECT_LONG_DELAY.as_secs());
        self.sleeper.sleep(RECONNECT_LONG_DELAY);
        false
    }

    /// Advance the state machine by one tick or one recovery round.
    pub fn step(&mut self) {
        if self.state == LinkState::Connected {
            if self.tick().is_ok() {
                self.sleeper.sleep(self.config.interval());
            }
        } else {
            self.recover();
        }
    }

    /// Run until `shutdown` is set, then send the goodbye frame.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        // A failed first attempt is handled by the recovery path.
        let _ = self.connect();
        while !shutdown.load(Ordering::Relaxed) {
            self.step();
        }
        self.shutdown();
    }

    /// Write raw bytes to the open link.
    pub fn try_send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let link = self.link.as_mut().ok_or(TransportError::NotConnected)?;
        link.write_all(bytes)?;
        link.flush()?;
        Ok(())
    }

    /// Send the goodbye frame if connected, then release the link.
    ///
    /// A failed goodbye write is ignored: the device may already be gone.
    pub fn shutdown(&mut self) {
        if self.state == LinkState::Connected {
            let _ = self.try_send(DISCONNECT_FRAME);
        }
        self.link = None;
        self.state = LinkState::Disconnected;
        info!("link closed");
    }

    fn drop_link(&mut self, reason: &str) {
        self.link = None;
        self.state = LinkState::Disconnected;
        warn!("link lost: {reason}");
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        if self.link.take().is_some() {
            debug!("releasing serial link");
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
