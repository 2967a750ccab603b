//! Session transport contract.
//!
//! The sequencer never talks to the network directly. It goes through the
//! [`Transport`] trait, which only knows how to open and close a session and
//! how to move the two raw assembly buffers:
//!
//! - [`Transport::read_status`] gets assembly instance
//!   [`STATUS_INSTANCE`](crate::layout::STATUS_INSTANCE) (100)
//! - [`Transport::write_command`] sets assembly instance
//!   [`COMMAND_INSTANCE`](crate::layout::COMMAND_INSTANCE) (101)
//!
//! The EtherNet/IP session and encapsulation layers belong to the
//! implementation of this trait and live outside this crate. Implementations
//! should report failures as
//! [`VisionError::Connection`](crate::VisionError::Connection) or
//! [`VisionError::Io`](crate::VisionError::Io).
//!
//! # Example
//!
//! A loopback transport that always reports an idle device:
//!
//! ```
//! use keyence_vision::{Result, Transport, STATUS_ASSEMBLY_SIZE};
//!
//! struct Idle;
//!
//! impl Transport for Idle {
//!     fn connect(&mut self) -> Result<()> { Ok(()) }
//!     fn disconnect(&mut self) -> Result<()> { Ok(()) }
//!     fn read_status(&mut self) -> Result<Vec<u8>> {
//!         Ok(vec![0u8; STATUS_ASSEMBLY_SIZE])
//!     }
//!     fn write_command(&mut self, _data: &[u8]) -> Result<()> { Ok(()) }
//! }
//! ```

use crate::error::Result;

/// Default EtherNet/IP explicit messaging port.
pub const DEFAULT_PORT: u16 = 44818;

/// Default sensor address.
pub const DEFAULT_HOST: &str = "10.13.37.150";

/// Blocking access to the two assembly buffers of one device.
pub trait Transport {
    /// Opens the session.
    fn connect(&mut self) -> Result<()>;

    /// Closes the session.
    fn disconnect(&mut self) -> Result<()>;

    /// Reads the raw status assembly.
    fn read_status(&mut self) -> Result<Vec<u8>>;

    /// Writes the raw command assembly.
    fn write_command(&mut self, data: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }

    fn read_status(&mut self) -> Result<Vec<u8>> {
        (**self).read_status()
    }

    fn write_command(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_command(data)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }

    fn read_status(&mut self) -> Result<Vec<u8>> {
        (**self).read_status()
    }

    fn write_command(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_command(data)
    }
}

/// Where to reach the sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sensor host name or IP address.
    pub host: String,
    /// Explicit messaging TCP port.
    pub port: u16,
}

impl SessionConfig {
    /// Creates a session configuration for `host` on the default port.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::{SessionConfig, DEFAULT_PORT};
    ///
    /// let config = SessionConfig::new("192.168.0.10");
    /// assert_eq!(config.port, DEFAULT_PORT);
    /// ```
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
        }
    }

    /// Sets a custom port (default is 44818).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

impl std::fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
