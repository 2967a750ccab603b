//! Assembly instance ids and the offset tables of both buffers.
//!
//! # Status assembly (instance 100, device → controller)
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | Control result: bits 0-5, 7 (bit 6 unused) |
//! | 1 | Control error result: bits 0, 1, 2, 7 |
//! | 2 | Handshake: result available, result update complete, busy, imaging, run, ready |
//! | 3 | Status: bit 5 buffer overrun, bit 6 warning, bit 7 error |
//! | 4 | Judgement: overall, position correction, logic 0-3, overall NG |
//! | 6-7 | Tool results 1-8, 9-16 |
//! | 8-22 | Result information (u16 LE each) |
//! | 24-28 | Processing time max/min/avg (u16 LE) |
//! | 32-44 | Trigger/OK/NG/trigger error counters (u32 LE) |
//! | 52-58 | Position correction tool statistics (u16 LE) |
//! | 72.. | 16 tool blocks of 20 bytes |
//!
//! # Command assembly (instance 101, controller → device)
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | Request bits 0-5, 7 (bit 6 always 0) |
//! | 1 | Reserved (0) |
//! | 2 | Result acquisition complete notification (0/1) |
//! | 3 | Reserved (0) |
//! | 4-5 | Program number (u16 LE) |
//! | 6-7 | Setting number (u16 LE) |
//! | 8-11 | Setting value (u32 LE) |

/// Assembly instance published by the device (status and results).
pub const STATUS_INSTANCE: u8 = 100;

/// Assembly instance written by the controller (commands).
pub const COMMAND_INSTANCE: u8 = 101;

/// Number of inspection tools carried by the status assembly.
pub const TOOL_COUNT: usize = 16;

/// Offset of the first tool block.
pub const TOOL_BLOCK_BASE: usize = 72;

/// Size of one tool block in bytes.
pub const TOOL_BLOCK_SIZE: usize = 20;

/// Minimum status assembly size: header area plus all tool blocks.
pub const STATUS_ASSEMBLY_SIZE: usize = TOOL_BLOCK_BASE + TOOL_COUNT * TOOL_BLOCK_SIZE;

/// Exact command assembly size.
pub const COMMAND_ASSEMBLY_SIZE: usize = 12;

/// Location of a single flag inside an assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitAddress {
    /// Byte offset in the assembly.
    pub offset: usize,
    /// Bit position (0-7) within the byte.
    pub bit: u8,
}

impl BitAddress {
    /// Creates a new bit address.
    pub const fn new(offset: usize, bit: u8) -> Self {
        Self { offset, bit }
    }
}

// Control result (byte 0).
pub(crate) const TRIGGER_RESPONSE: BitAddress = BitAddress::new(0, 0);
pub(crate) const MASTER_IMAGE_REGISTRATION_RESPONSE: BitAddress = BitAddress::new(0, 1);
pub(crate) const PROGRAM_SWITCHING_RESPONSE: BitAddress = BitAddress::new(0, 2);
pub(crate) const WARNING_CLEAR_RESPONSE: BitAddress = BitAddress::new(0, 3);
pub(crate) const STATISTICS_RESET_RESPONSE: BitAddress = BitAddress::new(0, 4);
pub(crate) const BUFFER_CLEAR_RESPONSE: BitAddress = BitAddress::new(0, 5);
pub(crate) const SETTING_VALUE_CHANGE_RESPONSE: BitAddress = BitAddress::new(0, 7);

// Control error result (byte 1).
pub(crate) const TRIGGER_FAILED: BitAddress = BitAddress::new(1, 0);
pub(crate) const MASTER_IMAGE_REGISTRATION_FAILED: BitAddress = BitAddress::new(1, 1);
pub(crate) const PROGRAM_SWITCHING_FAILED: BitAddress = BitAddress::new(1, 2);
pub(crate) const SETTING_VALUE_CHANGE_FAILED: BitAddress = BitAddress::new(1, 7);

// Handshake and status (bytes 2-3).
pub(crate) const RESULT_AVAILABLE: BitAddress = BitAddress::new(2, 0);
pub(crate) const RESULT_UPDATE_COMPLETE: BitAddress = BitAddress::new(2, 1);
pub(crate) const BUSY: BitAddress = BitAddress::new(2, 2);
pub(crate) const IMAGING: BitAddress = BitAddress::new(2, 3);
pub(crate) const RUN: BitAddress = BitAddress::new(2, 4);
pub(crate) const READY: BitAddress = BitAddress::new(2, 5);
pub(crate) const BUFFER_OVERRUN: BitAddress = BitAddress::new(3, 5);
pub(crate) const WARNING: BitAddress = BitAddress::new(3, 6);
pub(crate) const ERROR: BitAddress = BitAddress::new(3, 7);

// Judgement (byte 4). Logic bits 0-3 follow position correction.
pub(crate) const OVERALL_JUDGEMENT: BitAddress = BitAddress::new(4, 0);
pub(crate) const POSITION_CORRECTION: BitAddress = BitAddress::new(4, 1);
pub(crate) const LOGIC_FIRST: BitAddress = BitAddress::new(4, 2);
pub(crate) const OVERALL_JUDGEMENT_NG: BitAddress = BitAddress::new(4, 6);

/// Tools 1-8 live in this byte, tools 9-16 in the next one.
pub(crate) const TOOL_RESULTS_OFFSET: usize = 6;

// Result information.
pub(crate) const ERROR_CODE: usize = 8;
pub(crate) const WARNING_CODE: usize = 10;
pub(crate) const REMAINING_BUFFERS: usize = 12;
pub(crate) const CHECKSUM: usize = 14;
pub(crate) const CURRENT_PROGRAM_NO: usize = 16;
pub(crate) const PROGRAM_NO_DURING_JUDGEMENT: usize = 18;
pub(crate) const RESULT_NO: usize = 20;
pub(crate) const PROCESSING_TIME: usize = 22;

// Statistics.
pub(crate) const PROCESSING_TIME_MAX: usize = 24;
pub(crate) const PROCESSING_TIME_MIN: usize = 26;
pub(crate) const PROCESSING_TIME_AVG: usize = 28;
pub(crate) const NUMBER_OF_TRIGGERS: usize = 32;
pub(crate) const NUMBER_OF_OKS: usize = 36;
pub(crate) const NUMBER_OF_NGS: usize = 40;
pub(crate) const NUMBER_OF_TRIGGER_ERRORS: usize = 44;

// Position correction tool.
pub(crate) const POSITION_MATCHING_RATE: usize = 52;
pub(crate) const POSITION_MATCHING_RATE_MAX: usize = 54;
pub(crate) const POSITION_MATCHING_RATE_MIN: usize = 56;
pub(crate) const POSITION_THRESHOLD: usize = 58;

// Command assembly.
pub(crate) const REQUEST_TRIGGER: u8 = 0;
pub(crate) const REQUEST_MASTER_REGISTRATION: u8 = 1;
pub(crate) const REQUEST_PROGRAM_SWITCHING: u8 = 2;
pub(crate) const REQUEST_WARNING_CLEAR: u8 = 3;
pub(crate) const REQUEST_STATISTICS_RESET: u8 = 4;
pub(crate) const REQUEST_BUFFER_CLEAR: u8 = 5;
pub(crate) const REQUEST_SETTING_VALUE_CHANGE: u8 = 7;
pub(crate) const COMMAND_REQUESTS: usize = 0;
pub(crate) const COMMAND_NOTIFICATION: usize = 2;
pub(crate) const COMMAND_PROGRAM_NO: usize = 4;
pub(crate) const COMMAND_SETTING_NO: usize = 6;
pub(crate) const COMMAND_SETTING_VALUE: usize = 8;

/// Returns the start offset of the block for tool `no` (1-16).
///
/// Returns `None` for tool numbers outside 1-16.
///
/// # Example
///
/// ```
/// use keyence_vision::layout::tool_block_offset;
///
/// assert_eq!(tool_block_offset(1), Some(72));
/// assert_eq!(tool_block_offset(16), Some(372));
/// assert_eq!(tool_block_offset(0), None);
/// ```
pub fn tool_block_offset(no: u8) -> Option<usize> {
    match no as usize {
        n @ 1..=TOOL_COUNT => Some(TOOL_BLOCK_BASE + (n - 1) * TOOL_BLOCK_SIZE),
        _ => None,
    }
}

/// Returns where the pass/fail bit of tool `no` (1-16) lives.
///
/// # Example
///
/// ```
/// use keyence_vision::layout::{tool_result_bit, BitAddress};
///
/// assert_eq!(tool_result_bit(8), Some(BitAddress::new(6, 7)));
/// assert_eq!(tool_result_bit(9), Some(BitAddress::new(7, 0)));
/// ```
pub fn tool_result_bit(no: u8) -> Option<BitAddress> {
    match no {
        1..=8 => Some(BitAddress::new(TOOL_RESULTS_OFFSET, no - 1)),
        9..=16 => Some(BitAddress::new(TOOL_RESULTS_OFFSET + 1, no - 9)),
        _ => None,
    }
}
