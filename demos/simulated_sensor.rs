//! Example: Running the command line against a simulated sensor
//!
//! Run with: cargo run --example simulated_sensor -- --program 3 --tools 2 --debug 1
//!
//! This example demonstrates:
//! - Implementing the `Transport` trait
//! - Answering status reads from decoded command requests
//! - Driving a full inspection run through `cli::main_with`

use std::process::ExitCode;

use keyence_vision::layout::{tool_block_offset, tool_result_bit};
use keyence_vision::utils::{set_bit, write_u16_le};
use keyence_vision::{cli, CommandRequest, Result, SessionConfig, Transport, STATUS_ASSEMBLY_SIZE};

/// Polls needed before a triggered inspection completes.
const IMAGING_POLLS: u32 = 3;

/// A sensor that is always running and ready and judges every trigger OK.
struct SimulatedSensor {
    session: SessionConfig,
    program: u16,
    switched: bool,
    triggered: bool,
    imaging: Option<u32>,
    toggle: bool,
    result_no: u16,
}

impl SimulatedSensor {
    fn new(session: &SessionConfig) -> Self {
        Self {
            session: session.clone(),
            program: 0,
            switched: false,
            triggered: false,
            imaging: None,
            toggle: false,
            result_no: 0,
        }
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut raw = vec![0u8; STATUS_ASSEMBLY_SIZE];

        raw[0] = set_bit(raw[0], 0, self.triggered);
        raw[0] = set_bit(raw[0], 2, self.switched);
        raw[2] = set_bit(raw[2], 1, self.toggle);
        raw[2] = set_bit(raw[2], 4, true);
        raw[2] = set_bit(raw[2], 5, true);
        write_u16_le(&mut raw, 16, self.program)?;

        raw[2] = set_bit(raw[2], 3, self.imaging.is_some());

        if self.result_no > 0 {
            raw[2] = set_bit(raw[2], 0, true);
            raw[4] = set_bit(raw[4], 0, true);
            write_u16_le(&mut raw, 18, self.program)?;
            write_u16_le(&mut raw, 20, self.result_no)?;
            write_u16_le(&mut raw, 22, 35 + self.result_no % 10)?;

            for no in 1..=2u8 {
                if let (Some(bit), Some(base)) = (tool_result_bit(no), tool_block_offset(no)) {
                    raw[bit.offset] = set_bit(raw[bit.offset], bit.bit, true);
                    write_u16_le(&mut raw, base, 950 + no as u16)?;
                    write_u16_le(&mut raw, base + 6, 700)?;
                    write_u16_le(&mut raw, base + 8, 1000)?;
                }
            }
        }

        Ok(raw)
    }
}

impl Transport for SimulatedSensor {
    fn connect(&mut self) -> Result<()> {
        println!("[sim] session opened to {}", self.session);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        println!("[sim] session closed");
        Ok(())
    }

    fn read_status(&mut self) -> Result<Vec<u8>> {
        if let Some(remaining) = self.imaging {
            if remaining == 0 {
                self.imaging = None;
                self.toggle = !self.toggle;
                self.result_no += 1;
            } else {
                self.imaging = Some(remaining - 1);
            }
        }
        self.encode()
    }

    fn write_command(&mut self, data: &[u8]) -> Result<()> {
        let request = CommandRequest::from_bytes(data)?;

        self.switched = request.program_switching;
        self.triggered = request.trigger;
        if request.program_switching {
            println!("[sim] switching to program {}", request.program_no());
            self.program = request.program_no();
        }
        if request.trigger {
            println!("[sim] trigger");
            self.imaging = Some(IMAGING_POLLS);
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    cli::main_with(std::env::args_os(), SimulatedSensor::new)
}
