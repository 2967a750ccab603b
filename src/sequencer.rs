//! Control sequencer for one inspection run.
//!
//! This module provides the [`Sequencer`], which drives the sensor through
//! one inspection cycle over a [`Transport`]:
//!
//! ```text
//! Idle → Resetting → CheckingConditions → SelectingProgram → Triggering → Resetting → Idle
//! ```
//!
//! Phases run strictly in order and the first failure aborts the rest. Every
//! polled status read is classified first, so a device error or warning stops
//! the run wherever it shows up. The trailing readiness read and the reference
//! reads taken before a command are not classified.
//!
//! # Polling
//!
//! Each waiting phase polls the status assembly at a fixed interval until its
//! condition holds or its timeout elapses:
//!
//! | Phase | Timeout | Interval | Done when |
//! |-------|---------|----------|-----------|
//! | Initial conditions | 5000 ms | 500 ms | `run && ready` |
//! | Program selection | 2500 ms | 100 ms | switching acknowledged without failure |
//! | Trigger | 5000 ms | 100 ms | trigger acknowledged, result available, toggle bit flipped |
//!
//! The cancellation token is checked at the top of every poll iteration and
//! surfaces as [`VisionError::Cancelled`], never as a timeout.
//!
//! # Example
//!
//! ```no_run
//! use keyence_vision::{CancellationToken, Sequencer, SequencerConfig, Transport};
//!
//! fn inspect<T: Transport>(transport: T) -> keyence_vision::Result<()> {
//!     let config = SequencerConfig::new(3)?;
//!     let mut sequencer = Sequencer::new(transport, config, CancellationToken::new());
//!
//!     sequencer.connect()?;
//!     sequencer.run()?;
//!     if let Some(result) = sequencer.context().result() {
//!         println!("OK = {}", result.judgement.overall);
//!     }
//!     sequencer.disconnect()
//! }
//! ```

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::classify;
use crate::command::{CommandRequest, MAX_PROGRAM_NO};
use crate::error::{Result, VisionError};
use crate::status::StatusSnapshot;
use crate::transport::Transport;
use crate::utils::{format_binary, format_hex};

/// Default delay after every command write.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(30);

/// Default timing of the readiness check.
pub const DEFAULT_INITIAL_CONDITIONS_TIMING: PhaseTiming =
    PhaseTiming::new(Duration::from_millis(5000), Duration::from_millis(500));

/// Default timing of program selection.
pub const DEFAULT_PROGRAM_SELECTION_TIMING: PhaseTiming =
    PhaseTiming::new(Duration::from_millis(2500), Duration::from_millis(100));

/// Default timing of the trigger phase.
pub const DEFAULT_TRIGGER_TIMING: PhaseTiming =
    PhaseTiming::new(Duration::from_millis(5000), Duration::from_millis(100));

/// Longest single sleep while idling between repeated runs.
const IDLE_SLICE: Duration = Duration::from_millis(100);

/// Deadline and poll interval of one waiting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTiming {
    /// How long the phase keeps polling.
    pub timeout: Duration,
    /// Fixed sleep between two polls.
    pub poll_interval: Duration,
}

impl PhaseTiming {
    /// Creates a phase timing.
    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// Configuration for creating a [`Sequencer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Program to select before triggering.
    pub program: u16,
    /// Timing of the readiness check.
    pub initial_conditions: PhaseTiming,
    /// Timing of program selection.
    pub program_selection: PhaseTiming,
    /// Timing of the trigger phase.
    pub trigger: PhaseTiming,
    /// Delay after every command write.
    pub settle_delay: Duration,
}

impl SequencerConfig {
    /// Creates a configuration targeting `program` with default timings.
    ///
    /// # Errors
    ///
    /// Returns `VisionError::InvalidParameter` if `program > 31`.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::SequencerConfig;
    ///
    /// let config = SequencerConfig::new(4).unwrap();
    /// assert_eq!(config.program, 4);
    /// assert!(SequencerConfig::new(32).is_err());
    /// ```
    pub fn new(program: u16) -> Result<Self> {
        if program > MAX_PROGRAM_NO {
            return Err(VisionError::invalid_parameter(
                "program",
                format!("must be between 0 and {}, got {}", MAX_PROGRAM_NO, program),
            ));
        }

        Ok(Self {
            program,
            ..Self::default()
        })
    }

    /// Sets the readiness check timing (default 5000 ms / 500 ms).
    pub fn with_initial_conditions(mut self, timing: PhaseTiming) -> Self {
        self.initial_conditions = timing;
        self
    }

    /// Sets the program selection timing (default 2500 ms / 100 ms).
    pub fn with_program_selection(mut self, timing: PhaseTiming) -> Self {
        self.program_selection = timing;
        self
    }

    /// Sets the trigger timing (default 5000 ms / 100 ms).
    pub fn with_trigger(mut self, timing: PhaseTiming) -> Self {
        self.trigger = timing;
        self
    }

    /// Sets the delay after every command write (default 30 ms).
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::SequencerConfig;
    /// use std::time::Duration;
    ///
    /// let config = SequencerConfig::new(0)
    ///     .unwrap()
    ///     .with_settle_delay(Duration::ZERO);
    /// assert_eq!(config.settle_delay, Duration::ZERO);
    /// ```
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl Default for SequencerConfig {
    /// Targets program 0 with default timings.
    fn default() -> Self {
        Self {
            program: 0,
            initial_conditions: DEFAULT_INITIAL_CONDITIONS_TIMING,
            program_selection: DEFAULT_PROGRAM_SELECTION_TIMING,
            trigger: DEFAULT_TRIGGER_TIMING,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Source of time for poll deadlines and sleeps.
pub trait Clock {
    /// Returns the current monotonic time.
    fn now(&self) -> Instant;

    /// Blocks for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Phase the sequencer is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No phase active.
    Idle,
    /// Clearing warnings, statistics and buffers.
    Resetting,
    /// Waiting for run and ready.
    CheckingConditions,
    /// Switching to the target program.
    SelectingProgram,
    /// Waiting for a fresh inspection result.
    Triggering,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Resetting => write!(f, "resetting"),
            Phase::CheckingConditions => write!(f, "checking conditions"),
            Phase::SelectingProgram => write!(f, "selecting program"),
            Phase::Triggering => write!(f, "triggering"),
        }
    }
}

/// State carried across the phases of a run.
#[derive(Debug, Clone)]
pub struct SequencerContext {
    latest: Option<StatusSnapshot>,
    result: Option<StatusSnapshot>,
    target_program: u16,
    cancellation: CancellationToken,
}

impl SequencerContext {
    fn new(target_program: u16, cancellation: CancellationToken) -> Self {
        Self {
            latest: None,
            result: None,
            target_program,
            cancellation,
        }
    }

    /// Returns the most recent status read.
    pub fn latest(&self) -> Option<&StatusSnapshot> {
        self.latest.as_ref()
    }

    /// Returns the status captured by the last successful trigger.
    pub fn result(&self) -> Option<&StatusSnapshot> {
        self.result.as_ref()
    }

    /// Removes and returns the captured result.
    pub fn take_result(&mut self) -> Option<StatusSnapshot> {
        self.result.take()
    }

    /// Returns the program selected before triggering.
    pub fn target_program(&self) -> u16 {
        self.target_program
    }

    /// Returns the cancellation token checked by every poll loop.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

/// Verdict of one poll iteration.
enum Step<R> {
    Done(R),
    Retry,
}

/// How a poll loop ended. Faults travel separately as `Err`.
enum PollOutcome<R> {
    Completed(R),
    TimedOut,
}

/// Drives the sensor through reset, readiness check, program selection and
/// trigger.
///
/// The sequencer owns its transport, clock and context; nothing is shared.
/// Each method call performs blocking round trips and returns once its phase
/// has finished.
pub struct Sequencer<T: Transport, C: Clock = SystemClock> {
    transport: T,
    clock: C,
    config: SequencerConfig,
    context: SequencerContext,
    phase: Phase,
}

impl<T: Transport> Sequencer<T, SystemClock> {
    /// Creates a sequencer using the wall clock.
    pub fn new(transport: T, config: SequencerConfig, cancellation: CancellationToken) -> Self {
        Self::with_clock(transport, SystemClock, config, cancellation)
    }
}

impl<T: Transport, C: Clock> Sequencer<T, C> {
    /// Creates a sequencer reading time from `clock`.
    pub fn with_clock(
        transport: T,
        clock: C,
        config: SequencerConfig,
        cancellation: CancellationToken,
    ) -> Self {
        let context = SequencerContext::new(config.program, cancellation);
        Self {
            transport,
            clock,
            config,
            context,
            phase: Phase::Idle,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Returns the run context.
    pub fn context(&self) -> &SequencerContext {
        &self.context
    }

    /// Returns the run context mutably.
    pub fn context_mut(&mut self) -> &mut SequencerContext {
        &mut self.context
    }

    /// Returns the phase being executed.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.context.cancellation.is_cancelled()
    }

    /// Opens the transport session.
    ///
    /// # Errors
    ///
    /// Returns the transport's connection error.
    pub fn connect(&mut self) -> Result<()> {
        self.transport.connect()?;
        info!("Connected");
        Ok(())
    }

    /// Closes the transport session.
    ///
    /// # Errors
    ///
    /// Returns the transport's connection error.
    pub fn disconnect(&mut self) -> Result<()> {
        self.transport.disconnect()?;
        info!("Disconnected");
        Ok(())
    }

    /// Executes one full inspection cycle:
    /// reset, readiness check, program selection, trigger, reset.
    ///
    /// On success the captured status is available through
    /// [`SequencerContext::result`].
    ///
    /// # Errors
    ///
    /// Returns the first phase failure; the remaining phases are skipped.
    pub fn run(&mut self) -> Result<()> {
        self.ensure_not_cancelled()?;

        self.reset_state()?;
        self.check_initial_conditions()?;
        self.select_program()?;
        self.trigger()?;
        self.reset_state()
    }

    /// Clears warnings, statistics and result buffers.
    ///
    /// Fire-and-forget: writes the request, waits the settle delay and does
    /// not wait for a response.
    ///
    /// # Errors
    ///
    /// Returns transport errors.
    pub fn reset_state(&mut self) -> Result<()> {
        self.within(Phase::Resetting, |s| {
            info!("Resetting state...");
            s.write_request(&CommandRequest::reset())
        })
    }

    /// Waits until the device is running and ready.
    ///
    /// # Errors
    ///
    /// - `VisionError::InvalidInitialConditions` if the device is still not
    ///   running and ready after the timeout and one final read
    /// - `VisionError::Device`/`DeviceWarning` on a device fault
    /// - `VisionError::Cancelled` on cancellation
    pub fn check_initial_conditions(&mut self) -> Result<()> {
        self.within(Phase::CheckingConditions, |s| {
            info!("Checking initial conditions...");

            let timing = s.config.initial_conditions;
            let outcome = s.poll_status(timing, |status| {
                if status.is_run_and_ready() {
                    Ok(Step::Done(()))
                } else {
                    debug!("...not running and ready...");
                    Ok(Step::Retry)
                }
            })?;

            if let PollOutcome::Completed(()) = outcome {
                info!("...running and ready");
                return Ok(());
            }

            // Trailing read is not fault-checked; only run and ready decide.
            let status = s.read_status()?;
            if status.is_run_and_ready() {
                info!("...running and ready");
                return Ok(());
            }

            match (status.handshake.run, status.handshake.ready) {
                (false, false) => warn!("...still not running and ready"),
                (false, true) => warn!("...still not running"),
                _ => warn!("...still not ready"),
            }
            Err(VisionError::InvalidInitialConditions)
        })
    }

    /// Switches the device to the target program.
    ///
    /// Does nothing (and writes nothing) when the target program is already
    /// active.
    ///
    /// # Errors
    ///
    /// - `VisionError::ProgramSelectionFailed` if the device reports the
    ///   switch as failed or never acknowledges it before the timeout
    /// - `VisionError::Device`/`DeviceWarning` on a device fault
    /// - `VisionError::Cancelled` on cancellation
    pub fn select_program(&mut self) -> Result<()> {
        self.within(Phase::SelectingProgram, |s| {
            let program = s.context.target_program;
            info!("Selecting program no. {}...", program);

            if s.read_status()?.info.current_program_no == program {
                info!("Program {} already selected", program);
                return Ok(());
            }

            s.write_request(&CommandRequest::switch_program(program)?)?;

            let timing = s.config.program_selection;
            let outcome = s.poll_status(timing, |status| {
                if !status.control.program_switching {
                    debug!("...program not selected yet...");
                    return Ok(Step::Retry);
                }
                if status.failed.program_switching {
                    warn!("Device rejected program {}", program);
                    return Err(VisionError::ProgramSelectionFailed { program });
                }
                Ok(Step::Done(()))
            })?;

            match outcome {
                PollOutcome::Completed(()) => {
                    info!("...program {} selected", program);
                    Ok(())
                }
                PollOutcome::TimedOut => Err(VisionError::ProgramSelectionFailed { program }),
            }
        })
    }

    /// Triggers one inspection and captures its result.
    ///
    /// A result counts as fresh only when the trigger is acknowledged, a
    /// result is available and the result-update-complete toggle differs from
    /// its value before the trigger.
    ///
    /// # Errors
    ///
    /// - `VisionError::ResultNotAvailable` if no fresh result appears before
    ///   the timeout
    /// - `VisionError::Device`/`DeviceWarning` on a device fault
    /// - `VisionError::Cancelled` on cancellation
    pub fn trigger(&mut self) -> Result<()> {
        self.within(Phase::Triggering, |s| {
            s.context.result = None;

            let old_toggle = s.read_status()?.handshake.result_update_complete;
            debug!(
                "Result update complete before trigger is {}",
                u8::from(old_toggle)
            );

            info!("Triggering...");
            s.write_request(&CommandRequest::trigger())?;

            let timing = s.config.trigger;
            let outcome = s.poll_status(timing, |status| {
                let h = &status.handshake;
                if status.control.trigger
                    && h.result_available
                    && h.result_update_complete != old_toggle
                {
                    Ok(Step::Done(status))
                } else {
                    debug!("...result not available...");
                    Ok(Step::Retry)
                }
            })?;

            match outcome {
                PollOutcome::Completed(status) => {
                    info!(
                        "...result {} available (program {}, {})",
                        status.info.result_no,
                        status.info.program_no_during_judgement,
                        if status.judgement.overall { "OK" } else { "NG" }
                    );
                    s.context.result = Some(status);
                    Ok(())
                }
                PollOutcome::TimedOut => Err(VisionError::ResultNotAvailable),
            }
        })
    }

    /// Sleeps for `duration` between repeated runs, returning early once
    /// cancellation is requested.
    pub fn idle_for(&self, duration: Duration) {
        let started = self.clock.now();
        loop {
            if self.is_cancelled() {
                return;
            }
            let elapsed = self.clock.now().duration_since(started);
            if elapsed >= duration {
                return;
            }
            self.clock.sleep((duration - elapsed).min(IDLE_SLICE));
        }
    }

    /// Runs `f` with `phase` active and returns to the previous phase after.
    fn within<R>(&mut self, phase: Phase, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let previous = std::mem::replace(&mut self.phase, phase);
        let outcome = f(self);
        if let Err(e) = &outcome {
            debug!("Phase '{}' failed: {}", phase, e);
        }
        self.phase = previous;
        outcome
    }

    /// Polls the status assembly until `step` is done or the timing elapses.
    fn poll_status<R>(
        &mut self,
        timing: PhaseTiming,
        mut step: impl FnMut(StatusSnapshot) -> Result<Step<R>>,
    ) -> Result<PollOutcome<R>> {
        let started = self.clock.now();

        while self.clock.now().duration_since(started) <= timing.timeout {
            self.ensure_not_cancelled()?;

            let status = self.read_checked()?;
            match step(status)? {
                Step::Done(value) => return Ok(PollOutcome::Completed(value)),
                Step::Retry => self.clock.sleep(timing.poll_interval),
            }
        }

        self.ensure_not_cancelled()?;
        debug!("Phase '{}' timed out after {:?}", self.phase, timing.timeout);
        Ok(PollOutcome::TimedOut)
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(VisionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Reads and decodes one status assembly.
    fn read_status(&mut self) -> Result<StatusSnapshot> {
        let bytes = self.transport.read_status()?;
        let status = StatusSnapshot::from_bytes(&bytes)?;
        debug!("[{}] {}", self.phase, status.flag_summary());
        self.context.latest = Some(status.clone());
        Ok(status)
    }

    /// Reads one status assembly and fails on a device fault.
    fn read_checked(&mut self) -> Result<StatusSnapshot> {
        let status = self.read_status()?;
        classify::check(&status)?;
        Ok(status)
    }

    /// Writes one command assembly and waits the settle delay.
    fn write_request(&mut self, request: &CommandRequest) -> Result<()> {
        let bytes = request.to_bytes();
        debug!(
            "[{}] command {} (requests {})",
            self.phase,
            format_hex(&bytes),
            format_binary(bytes[0])
        );
        self.transport.write_command(&bytes)?;

        if !self.config.settle_delay.is_zero() {
            self.clock.sleep(self.config.settle_delay);
        }
        Ok(())
    }
}

impl<T: Transport + std::fmt::Debug, C: Clock> std::fmt::Debug for Sequencer<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .field("phase", &self.phase)
            .finish()
    }
}
