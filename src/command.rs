//! Command assembly encoding.
//!
//! The controller drives the device by writing a 12-byte buffer to assembly
//! instance 101. [`CommandRequest`] is a small builder for that buffer.
//!
//! # Example
//!
//! ```
//! use keyence_vision::CommandRequest;
//!
//! let request = CommandRequest::switch_program(5).unwrap();
//! assert_eq!(
//!     request.to_bytes(),
//!     [0x04, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
//! );
//! ```

use crate::error::{Result, VisionError};
use crate::layout::{self, COMMAND_ASSEMBLY_SIZE};
use crate::utils::{get_bit, read_u16_le, read_u32_le, set_bit};

/// Highest selectable program number.
pub const MAX_PROGRAM_NO: u16 = 31;

/// Control requests written to the command assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandRequest {
    /// Execute one inspection cycle.
    pub trigger: bool,
    /// Register the current image as master.
    pub master_registration: bool,
    /// Switch to [`program_no`](Self::program_no).
    pub program_switching: bool,
    /// Clear the warning status.
    pub warning_clear: bool,
    /// Reset the statistics counters.
    pub statistics_reset: bool,
    /// Clear the result buffer.
    pub buffer_clear: bool,
    /// Apply [`setting_value`](Self::setting_value) to setting
    /// [`setting_no`](Self::setting_no).
    pub setting_value_change: bool,
    /// Result acquisition complete notification.
    pub result_acquired: bool,
    program_no: u16,
    /// Setting number targeted by a setting value change.
    pub setting_no: u16,
    /// New value for a setting value change.
    pub setting_value: u32,
}

impl CommandRequest {
    /// Creates an empty request (all flags cleared).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the request used to return the device to a clean state:
    /// warning clear, statistics reset and buffer clear.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::CommandRequest;
    ///
    /// assert_eq!(CommandRequest::reset().to_bytes()[0], 0b0011_1000);
    /// ```
    pub fn reset() -> Self {
        Self {
            warning_clear: true,
            statistics_reset: true,
            buffer_clear: true,
            ..Self::default()
        }
    }

    /// Creates a trigger request.
    pub fn trigger() -> Self {
        Self {
            trigger: true,
            ..Self::default()
        }
    }

    /// Creates a program switching request for `program_no`.
    ///
    /// # Errors
    ///
    /// Returns `VisionError::InvalidParameter` if `program_no > 31`.
    pub fn switch_program(program_no: u16) -> Result<Self> {
        let mut request = Self {
            program_switching: true,
            ..Self::default()
        };
        request.set_program_no(program_no)?;
        Ok(request)
    }

    /// Returns the program number carried by the request.
    pub fn program_no(&self) -> u16 {
        self.program_no
    }

    /// Sets the program number.
    ///
    /// # Errors
    ///
    /// Returns `VisionError::InvalidParameter` if `program_no > 31`.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::CommandRequest;
    ///
    /// let mut request = CommandRequest::new();
    /// assert!(request.set_program_no(31).is_ok());
    /// assert!(request.set_program_no(32).is_err());
    /// assert_eq!(request.program_no(), 31);
    /// ```
    pub fn set_program_no(&mut self, program_no: u16) -> Result<()> {
        if program_no > MAX_PROGRAM_NO {
            return Err(VisionError::invalid_parameter(
                "program_no",
                format!("must be between 0 and {}, got {}", MAX_PROGRAM_NO, program_no),
            ));
        }
        self.program_no = program_no;
        Ok(())
    }

    /// Serializes the request to the 12-byte command assembly.
    pub fn to_bytes(&self) -> [u8; COMMAND_ASSEMBLY_SIZE] {
        let mut requests = 0u8;
        requests = set_bit(requests, layout::REQUEST_TRIGGER, self.trigger);
        requests = set_bit(
            requests,
            layout::REQUEST_MASTER_REGISTRATION,
            self.master_registration,
        );
        requests = set_bit(
            requests,
            layout::REQUEST_PROGRAM_SWITCHING,
            self.program_switching,
        );
        requests = set_bit(requests, layout::REQUEST_WARNING_CLEAR, self.warning_clear);
        requests = set_bit(
            requests,
            layout::REQUEST_STATISTICS_RESET,
            self.statistics_reset,
        );
        requests = set_bit(requests, layout::REQUEST_BUFFER_CLEAR, self.buffer_clear);
        requests = set_bit(
            requests,
            layout::REQUEST_SETTING_VALUE_CHANGE,
            self.setting_value_change,
        );

        let mut bytes = [0u8; COMMAND_ASSEMBLY_SIZE];
        bytes[layout::COMMAND_REQUESTS] = requests;
        bytes[layout::COMMAND_NOTIFICATION] = u8::from(self.result_acquired);

        let program_no = self.program_no.to_le_bytes();
        bytes[layout::COMMAND_PROGRAM_NO..layout::COMMAND_PROGRAM_NO + 2]
            .copy_from_slice(&program_no);
        let setting_no = self.setting_no.to_le_bytes();
        bytes[layout::COMMAND_SETTING_NO..layout::COMMAND_SETTING_NO + 2]
            .copy_from_slice(&setting_no);
        let setting_value = self.setting_value.to_le_bytes();
        bytes[layout::COMMAND_SETTING_VALUE..layout::COMMAND_SETTING_VALUE + 4]
            .copy_from_slice(&setting_value);

        bytes
    }

    /// Parses a command assembly back into a request.
    ///
    /// Reserved bytes and request bit 6 are ignored.
    ///
    /// # Errors
    ///
    /// Returns `VisionError::InvalidFormat` if the buffer is not 12 bytes,
    /// or `VisionError::InvalidParameter` if it carries a program number
    /// above 31.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::CommandRequest;
    ///
    /// let request = CommandRequest::trigger();
    /// let parsed = CommandRequest::from_bytes(&request.to_bytes()).unwrap();
    /// assert_eq!(parsed, request);
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != COMMAND_ASSEMBLY_SIZE {
            return Err(VisionError::invalid_format(format!(
                "command assembly must be {} bytes, got {}",
                COMMAND_ASSEMBLY_SIZE,
                data.len()
            )));
        }

        let requests = data[layout::COMMAND_REQUESTS];
        let mut request = Self {
            trigger: get_bit(requests, layout::REQUEST_TRIGGER),
            master_registration: get_bit(requests, layout::REQUEST_MASTER_REGISTRATION),
            program_switching: get_bit(requests, layout::REQUEST_PROGRAM_SWITCHING),
            warning_clear: get_bit(requests, layout::REQUEST_WARNING_CLEAR),
            statistics_reset: get_bit(requests, layout::REQUEST_STATISTICS_RESET),
            buffer_clear: get_bit(requests, layout::REQUEST_BUFFER_CLEAR),
            setting_value_change: get_bit(requests, layout::REQUEST_SETTING_VALUE_CHANGE),
            result_acquired: data[layout::COMMAND_NOTIFICATION] != 0,
            program_no: 0,
            setting_no: read_u16_le(data, layout::COMMAND_SETTING_NO)?,
            setting_value: read_u32_le(data, layout::COMMAND_SETTING_VALUE)?,
        };
        request.set_program_no(read_u16_le(data, layout::COMMAND_PROGRAM_NO)?)?;
        Ok(request)
    }
}
