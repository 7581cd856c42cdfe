//! Active TCP connectivity check.
//!
//! # Responsibilities
//! - Open a TCP connection to a subject's address
//! - Bound every attempt by a connect timeout
//!
//! # Design Decisions
//! - Synchronous: the scheduler runs probes on tokio's blocking pool
//! - The timeout bounds how long a dead peer holds up its tick

use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

/// Raw pass/fail check that succeeds when `address` accepts a connection.
#[derive(Debug, Clone)]
pub struct TcpCheck {
    pub address: SocketAddr,
    pub timeout: Duration,
}

impl TcpCheck {
    pub fn new(address: SocketAddr, timeout: Duration) -> Self {
        Self { address, timeout }
    }

    pub fn check(&self) -> Result<(), String> {
        match TcpStream::connect_timeout(&self.address, self.timeout) {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::trace!(addr = %self.address, error = %e, "TCP check failed");
                Err(e.to_string())
            }
        }
    }

    /// Adapt into the closure form consumed by [`ThresholdProbe`](crate::health::ThresholdProbe).
    pub fn into_check(self) -> impl FnMut() -> Result<(), String> + Send {
        move || self.check()
    }
}
