//! Shared test doubles: a scripted transport, a manual clock and a status
//! assembly builder.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use keyence_vision::layout::{tool_block_offset, tool_result_bit};
use keyence_vision::utils::{set_bit, write_u16_le};
use keyence_vision::{
    CancellationToken, Clock, CommandRequest, Result, Transport, VisionError,
    STATUS_ASSEMBLY_SIZE,
};

/// What the device has seen when it answers a status read.
pub struct Exchange<'a> {
    /// 1-based index of this read.
    pub read: usize,
    /// Every command written so far, oldest first.
    pub writes: &'a [CommandRequest],
}

impl Exchange<'_> {
    pub fn last_write(&self) -> Option<&CommandRequest> {
        self.writes.last()
    }

    pub fn trigger_count(&self) -> usize {
        self.writes.iter().filter(|w| w.trigger).count()
    }
}

type Responder = Box<dyn FnMut(&Exchange<'_>) -> Vec<u8>>;

/// Transport whose status reads are answered by a closure.
pub struct ScriptedTransport {
    responder: Responder,
    pub reads: usize,
    pub writes: Vec<CommandRequest>,
    pub raw_writes: Vec<Vec<u8>>,
    pub connected: bool,
    pub connects: usize,
    pub disconnects: usize,
    fail_connect: bool,
    fail_disconnect: bool,
    cancel_on_read: Option<(usize, CancellationToken)>,
}

impl ScriptedTransport {
    pub fn new(responder: impl FnMut(&Exchange<'_>) -> Vec<u8> + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            reads: 0,
            writes: Vec::new(),
            raw_writes: Vec::new(),
            connected: false,
            connects: 0,
            disconnects: 0,
            fail_connect: false,
            fail_disconnect: false,
            cancel_on_read: None,
        }
    }

    /// Always answers with the same status.
    pub fn constant(status: Vec<u8>) -> Self {
        Self::new(move |_| status.clone())
    }

    /// Answers with `statuses` in order, repeating the last one.
    pub fn sequence(statuses: Vec<Vec<u8>>) -> Self {
        assert!(!statuses.is_empty());
        Self::new(move |exchange| {
            let index = (exchange.read - 1).min(statuses.len() - 1);
            statuses[index].clone()
        })
    }

    /// Refuses to connect.
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Fails on disconnect.
    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    /// Cancels `token` while serving read number `read`.
    pub fn cancel_on_read(mut self, read: usize, token: &CancellationToken) -> Self {
        self.cancel_on_read = Some((read, token.clone()));
        self
    }

    pub fn triggers(&self) -> usize {
        self.writes.iter().filter(|w| w.trigger).count()
    }

    pub fn written_hex(&self) -> Vec<String> {
        self.raw_writes.iter().map(hex::encode).collect()
    }
}

impl Transport for ScriptedTransport {
    fn connect(&mut self) -> Result<()> {
        if self.fail_connect {
            return Err(VisionError::connection("refused"));
        }
        self.connects += 1;
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.disconnects += 1;
        self.connected = false;
        if self.fail_disconnect {
            return Err(VisionError::connection("reset by peer"));
        }
        Ok(())
    }

    fn read_status(&mut self) -> Result<Vec<u8>> {
        self.reads += 1;
        if let Some((read, token)) = &self.cancel_on_read {
            if *read == self.reads {
                token.cancel();
            }
        }

        let exchange = Exchange {
            read: self.reads,
            writes: &self.writes,
        };
        Ok((self.responder)(&exchange))
    }

    fn write_command(&mut self, data: &[u8]) -> Result<()> {
        self.writes.push(CommandRequest::from_bytes(data)?);
        self.raw_writes.push(data.to_vec());
        Ok(())
    }
}

/// A cooperative device: running and ready on `initial_program`, it switches
/// programs on request and produces a fresh OK result on every trigger.
pub fn cooperative_device(initial_program: u16) -> impl FnMut(&Exchange<'_>) -> Vec<u8> {
    move |exchange: &Exchange<'_>| {
        let program = exchange
            .writes
            .iter()
            .rev()
            .find(|w| w.program_switching)
            .map(|w| w.program_no())
            .unwrap_or(initial_program);

        let mut status = StatusBuilder::new()
            .run_ready()
            .current_program(program)
            .toggle(exchange.trigger_count() % 2 == 1);

        match exchange.last_write() {
            Some(w) if w.program_switching => {
                status = status.program_switching_response();
            }
            Some(w) if w.trigger => {
                status = status
                    .trigger_response()
                    .result_available()
                    .judged(program, true, 42)
                    .result_no(exchange.trigger_count() as u16)
                    .tool(1, true, 980, 700, 1000)
                    .tool(2, false, 310, 700, 1000);
            }
            _ => {}
        }

        status.build()
    }
}

/// Clock that only moves when slept on.
pub struct ManualClock {
    origin: Instant,
    elapsed: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Builds raw status assemblies.
#[derive(Clone)]
pub struct StatusBuilder {
    raw: Vec<u8>,
}

impl StatusBuilder {
    pub fn new() -> Self {
        Self {
            raw: vec![0u8; STATUS_ASSEMBLY_SIZE],
        }
    }

    fn flag(mut self, offset: usize, bit: u8, on: bool) -> Self {
        self.raw[offset] = set_bit(self.raw[offset], bit, on);
        self
    }

    fn word(mut self, offset: usize, value: u16) -> Self {
        write_u16_le(&mut self.raw, offset, value).unwrap();
        self
    }

    pub fn trigger_response(self) -> Self {
        self.flag(0, 0, true)
    }

    pub fn program_switching_response(self) -> Self {
        self.flag(0, 2, true)
    }

    pub fn program_switching_failed(self) -> Self {
        self.flag(1, 2, true)
    }

    pub fn result_available(self) -> Self {
        self.flag(2, 0, true)
    }

    pub fn toggle(self, on: bool) -> Self {
        self.flag(2, 1, on)
    }

    pub fn run(self) -> Self {
        self.flag(2, 4, true)
    }

    pub fn ready(self) -> Self {
        self.flag(2, 5, true)
    }

    pub fn run_ready(self) -> Self {
        self.run().ready()
    }

    pub fn warning(self, code: u16) -> Self {
        self.flag(3, 6, true).word(10, code)
    }

    pub fn error(self, code: u16) -> Self {
        self.flag(3, 7, true).word(8, code)
    }

    pub fn current_program(self, program: u16) -> Self {
        self.word(16, program)
    }

    pub fn judged(self, program: u16, ok: bool, processing_time: u16) -> Self {
        self.flag(4, 0, ok)
            .flag(4, 6, !ok)
            .word(18, program)
            .word(22, processing_time)
    }

    pub fn result_no(self, result_no: u16) -> Self {
        self.word(20, result_no)
    }

    pub fn tool(self, no: u8, ok: bool, rate: u16, lower: u16, upper: u16) -> Self {
        let bit = tool_result_bit(no).unwrap();
        let base = tool_block_offset(no).unwrap();
        self.flag(bit.offset, bit.bit, ok)
            .word(base, rate)
            .word(base + 6, lower)
            .word(base + 8, upper)
    }

    pub fn build(self) -> Vec<u8> {
        self.raw
    }
}
