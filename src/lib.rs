//! # Keyence Vision Sensor Sequencer
//!
//! A Rust library for triggering Keyence vision sensors over EtherNet/IP
//! explicit messaging and collecting their inspection results.
//!
//! The device exposes two fixed-layout assembly buffers:
//!
//! | Instance | Direction | Size | Content |
//! |----------|-----------|------|---------|
//! | 100 | read (get) | 392 bytes | control results, handshake flags, judgement, result info, statistics, 16 tool blocks |
//! | 101 | write (set) | 12 bytes | control request bits, program number, setting number/value |
//!
//! This crate decodes and encodes those buffers, classifies device faults and
//! sequences one inspection run on top of a pluggable [`Transport`]. The
//! EtherNet/IP session itself is supplied by the caller.
//!
//! ## Features
//!
//! - **Codec**: [`StatusSnapshot`] and [`CommandRequest`] map the assembly
//!   bytes to typed fields
//! - **Classification**: nonzero error and warning codes become
//!   [`DeviceFault`]s with named categories
//! - **Sequencing**: [`Sequencer`] runs reset, readiness check, program
//!   selection and trigger with per-phase timeouts
//! - **Cancellable**: every poll loop honours a [`CancellationToken`]
//! - **No panics**: all errors are returned as `Result<T, VisionError>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use keyence_vision::{
//!     CancellationToken, InspectionReport, Sequencer, SequencerConfig, Transport,
//! };
//!
//! fn inspect<T: Transport>(transport: T) -> keyence_vision::Result<()> {
//!     // Select program 3 before triggering
//!     let config = SequencerConfig::new(3)?;
//!     let mut sequencer = Sequencer::new(transport, config, CancellationToken::new());
//!
//!     sequencer.connect()?;
//!     sequencer.run()?;
//!
//!     if let Some(status) = sequencer.context().result() {
//!         // Report the first two tools
//!         println!("{}", InspectionReport::from_status(status, 2).to_json()?);
//!     }
//!
//!     sequencer.disconnect()
//! }
//! ```
//!
//! ## Decoding a Status Assembly
//!
//! ```
//! use keyence_vision::{StatusSnapshot, STATUS_ASSEMBLY_SIZE};
//!
//! let mut raw = vec![0u8; STATUS_ASSEMBLY_SIZE];
//! raw[2] = 0b0011_0000; // run + ready
//! raw[16] = 5;          // current program no.
//!
//! let status = StatusSnapshot::from_bytes(&raw)?;
//! assert!(status.is_run_and_ready());
//! assert_eq!(status.info.current_program_no, 5);
//! # Ok::<(), keyence_vision::VisionError>(())
//! ```
//!
//! ## Device Faults
//!
//! A status with the error flag set and a nonzero error code is an error; a
//! status with the warning flag set and a nonzero warning code is a warning.
//! Errors take priority.
//!
//! | Code | Category |
//! |------|----------|
//! | 75 | `EEPROM` |
//! | 76 | `FLASHROM` |
//! | 1-32 | `PROGRAM_CORRUPTION` |
//! | other error | `ERROR` |
//! | 58-74 | named warnings, e.g. `FTP_TRANSFER` (71) |
//! | other warning | `WARNING` |
//!
//! ```
//! use keyence_vision::{classify, DeviceFault, ErrorCategory, StatusSnapshot};
//!
//! let mut status = StatusSnapshot::default();
//! status.handshake.error = true;
//! status.info.error_code = 76;
//!
//! assert_eq!(
//!     classify(&status),
//!     Some(DeviceFault::Error { category: ErrorCategory::FlashRom, code: 76 })
//! );
//! ```
//!
//! ## Error Handling
//!
//! Every failure maps to one diagnostic code through [`VisionError::code`]:
//!
//! ```
//! use keyence_vision::VisionError;
//!
//! let err = VisionError::ProgramSelectionFailed { program: 4 };
//! match err {
//!     VisionError::Cancelled => println!("interrupted"),
//!     err => assert_eq!(err.code(), "ERR_PROGRAM_SELECTION_FAILED"),
//! }
//! ```
//!
//! ## Command Line
//!
//! The [`cli`] module implements the `keyence-vision` command line on top of
//! any [`Transport`]. See `demos/simulated_sensor.rs` for a runnable example
//! against a simulated device.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

mod cancel;
mod classify;
pub mod cli;
mod command;
mod error;
pub mod layout;
mod report;
mod sequencer;
mod status;
mod transport;
pub mod utils;

// Public re-exports
pub use cancel::CancellationToken;
pub use classify::{check, classify, DeviceFault, ErrorCategory, WarningCategory};
pub use command::{CommandRequest, MAX_PROGRAM_NO};
pub use error::{Result, VisionError};
pub use layout::{COMMAND_ASSEMBLY_SIZE, STATUS_ASSEMBLY_SIZE};
pub use report::{InspectionReport, ToolReport};
pub use sequencer::{
    Clock, Phase, PhaseTiming, Sequencer, SequencerConfig, SequencerContext, SystemClock,
    DEFAULT_INITIAL_CONDITIONS_TIMING, DEFAULT_PROGRAM_SELECTION_TIMING, DEFAULT_SETTLE_DELAY,
    DEFAULT_TRIGGER_TIMING,
};
pub use status::{
    ControlErrors, ControlResults, Handshake, Judgement, PositionCorrectionStats, ResultInfo,
    Statistics, StatusSnapshot, Tool,
};
pub use transport::{SessionConfig, Transport, DEFAULT_HOST, DEFAULT_PORT};
