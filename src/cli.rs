//! Command-line front end.
//!
//! The CLI parses its arguments, connects once, and runs inspection cycles.
//! It runs a single cycle by default, or one cycle every `--repeat` ms until
//! interrupted. The captured result goes to stdout as one JSON line. Failures
//! go to stderr as one `ERR_*` line each.
//!
//! ```text
//! keyence-vision [--debug 0|1] [--repeat <ms>] [--host <addr>] [--port <n>]
//!                [--program <0-31>] [--tools <0-16>]
//! ```
//!
//! | Exit code | Meaning |
//! |-----------|---------|
//! | 0 | Run succeeded, help/version shown, or a repeat loop was stopped |
//! | 1 | Invalid arguments, connection failure or a failed single run |
//!
//! The crate ships no EtherNet/IP stack, so the entry point is generic over
//! the [`Transport`] to use. [`main_with`] builds it from the parsed
//! [`SessionConfig`].

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;
use log::{info, warn};

use crate::cancel::CancellationToken;
use crate::command::MAX_PROGRAM_NO;
use crate::error::{Result, VisionError};
use crate::layout::TOOL_COUNT;
use crate::report::InspectionReport;
use crate::sequencer::{Clock, Sequencer, SequencerConfig, SystemClock};
use crate::transport::{SessionConfig, Transport, DEFAULT_HOST, DEFAULT_PORT};

/// Process exit code on success.
pub const EXIT_SUCCESS: u8 = 0;

/// Process exit code on failure.
pub const EXIT_FAILURE: u8 = 1;

/// Keyence vision sensor trigger over EtherNet/IP
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "keyence-vision", version, long_about = None)]
pub struct Args {
    /// Debug logging of every status read (0 or 1)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub debug: u8,

    /// Repeat interval in milliseconds (0 = run once)
    #[arg(long, default_value_t = 0)]
    pub repeat: u64,

    /// Sensor host name or IP address
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// EtherNet/IP port
    #[arg(long, default_value_t = DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Program number to select (0-31)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u16).range(0..=MAX_PROGRAM_NO as i64))]
    pub program: u16,

    /// Number of tools to include in the result (0-16)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=TOOL_COUNT as i64))]
    pub tools: u8,
}

impl Args {
    /// Returns whether debug logging was requested.
    pub fn debug_enabled(&self) -> bool {
        self.debug == 1
    }

    /// Returns the repeat interval, or `None` for a single run.
    pub fn repeat_interval(&self) -> Option<Duration> {
        match self.repeat {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Returns where to reach the sensor.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.host.clone()).with_port(self.port)
    }

    /// Returns the sequencer configuration for the selected program.
    ///
    /// # Errors
    ///
    /// Returns `VisionError::InvalidParameter` if the program is out of range.
    pub fn sequencer_config(&self) -> Result<SequencerConfig> {
        SequencerConfig::new(self.program)
    }
}

/// Parses `argv` (including the program name).
///
/// # Errors
///
/// Returns the clap error, which also covers `--help` and `--version`.
///
/// # Example
///
/// ```
/// use keyence_vision::cli::parse_args;
///
/// let args = parse_args(["keyence-vision", "--program", "3", "--tools", "2"]).unwrap();
/// assert_eq!(args.program, 3);
/// assert_eq!(args.port, 44818);
///
/// assert!(parse_args(["keyence-vision", "--program", "32"]).is_err());
/// ```
pub fn parse_args<I, A>(argv: I) -> std::result::Result<Args, clap::Error>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    Args::try_parse_from(argv)
}

/// Initializes `env_logger`, at debug level when `debug` is set.
///
/// `RUST_LOG` is honoured for module filters. Calling this more than once is
/// harmless.
pub fn init_logging(debug: bool) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(if debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .try_init();
}

/// Cancels `cancellation` on SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns the `ctrlc` error if a handler is already installed.
pub fn install_interrupt_handler(
    cancellation: CancellationToken,
) -> std::result::Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        info!("Shutdown signal received...");
        cancellation.cancel();
    })
}

/// Process entry point: parses `argv`, builds the transport with `connect`
/// and runs the inspection loop against stdout and stderr.
pub fn main_with<I, A, T, F>(argv: I, connect: F) -> ExitCode
where
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
    T: Transport,
    F: FnOnce(&SessionConfig) -> T,
{
    let args = match parse_args(argv) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let mut err = std::io::stderr().lock();
            emit(&mut err, &format!("Failed to parse arguments: {}", e));
            emit(&mut err, "ERR_INVALID_ARGS");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    init_logging(args.debug_enabled());

    let cancellation = CancellationToken::new();
    if let Err(e) = install_interrupt_handler(cancellation.clone()) {
        warn!("Interrupt handler not installed: {}", e);
    }

    let transport = connect(&args.session_config());
    let code = execute(
        &args,
        transport,
        SystemClock,
        cancellation,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    );
    ExitCode::from(code)
}

/// Connects, runs the inspection loop described by `args` and disconnects.
///
/// Writes the result line to `out` and the `ERR_*` lines to `err`, and
/// returns the process exit code.
pub fn execute<T, C, O, E>(
    args: &Args,
    transport: T,
    clock: C,
    cancellation: CancellationToken,
    out: &mut O,
    err: &mut E,
) -> u8
where
    T: Transport,
    C: Clock,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let config = match args.sequencer_config() {
        Ok(config) => config,
        Err(e) => {
            emit(err, &format!("Failed to parse arguments: {}", e));
            emit(err, "ERR_INVALID_ARGS");
            return EXIT_FAILURE;
        }
    };

    let mut sequencer = Sequencer::with_clock(transport, clock, config, cancellation);

    info!("Connecting to {}...", args.session_config());
    if let Err(e) = sequencer.connect() {
        emit(err, &format!("Failed to connect: {}", e));
        emit(err, "ERR_CONNECTION_FAILURE");
        return EXIT_FAILURE;
    }

    let repeat = args.repeat_interval();
    let mut code = EXIT_SUCCESS;

    loop {
        match sequencer.run() {
            Ok(()) => info!("Run complete"),
            Err(e) => {
                report_failure(err, &e, sequencer.is_cancelled());
                if repeat.is_none() {
                    code = EXIT_FAILURE;
                }
            }
        }

        let Some(interval) = repeat else { break };
        if sequencer.is_cancelled() {
            break;
        }
        sequencer.idle_for(interval);
        if sequencer.is_cancelled() {
            break;
        }
    }

    info!("Closing the connection...");
    if let Err(e) = sequencer.disconnect() {
        warn!("Failed to close the connection: {}", e);
    }

    if code == EXIT_SUCCESS {
        if let Some(status) = sequencer.context().result() {
            match InspectionReport::from_status(status, args.tools).to_json() {
                Ok(line) => emit(out, &line),
                Err(e) => {
                    report_failure(err, &e, false);
                    return EXIT_FAILURE;
                }
            }
        }
    }

    code
}

/// Writes the diagnostic line(s) for a failed run.
fn report_failure<E: Write + ?Sized>(err: &mut E, error: &VisionError, cancelled: bool) {
    if cancelled || error.is_cancellation() {
        emit(err, &VisionError::Cancelled.code());
    } else if error.is_unexpected() {
        emit(err, &error.to_string());
        emit(err, &error.code());
    } else {
        warn!("Run failed: {}", error);
        emit(err, &error.code());
    }
}

fn emit<W: Write + ?Sized>(stream: &mut W, line: &str) {
    let _ = writeln!(stream, "{}", line);
    let _ = stream.flush();
}
