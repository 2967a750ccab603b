//! Status assembly decoding.
//!
//! The device publishes its state as one fixed-size buffer (assembly
//! instance 100). [`StatusSnapshot::from_bytes`] turns that buffer into typed
//! records following the offset table in [`layout`](crate::layout).
//!
//! # Example
//!
//! ```
//! use keyence_vision::{StatusSnapshot, STATUS_ASSEMBLY_SIZE};
//!
//! let mut buffer = vec![0u8; STATUS_ASSEMBLY_SIZE];
//! buffer[2] = 0b0011_0000; // run + ready
//! buffer[16] = 7;          // current program number (u16 LE)
//!
//! let status = StatusSnapshot::from_bytes(&buffer).unwrap();
//! assert!(status.is_run_and_ready());
//! assert_eq!(status.info.current_program_no, 7);
//! ```

use crate::error::{Result, VisionError};
use crate::layout::{self, BitAddress, STATUS_ASSEMBLY_SIZE, TOOL_COUNT};
use crate::utils::{read_bit, read_u16_le, read_u32_le};

/// Responses to the corresponding control requests (byte 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlResults {
    /// Trigger request acknowledged.
    pub trigger: bool,
    /// Master image registration request acknowledged.
    pub master_image_registration: bool,
    /// Program switching request acknowledged.
    pub program_switching: bool,
    /// Warning clear request acknowledged.
    pub warning_clear: bool,
    /// Statistics reset request acknowledged.
    pub statistics_reset: bool,
    /// Buffer clear request acknowledged.
    pub buffer_clear: bool,
    /// Setting value change request acknowledged.
    pub setting_value_change: bool,
}

/// Failure markers for the corresponding control requests (byte 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlErrors {
    /// Trigger request failed.
    pub trigger: bool,
    /// Master image registration request failed.
    pub master_image_registration: bool,
    /// Program switching request failed.
    pub program_switching: bool,
    /// Setting value change request failed.
    pub setting_value_change: bool,
}

/// Handshake and device status flags (bytes 2-3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Handshake {
    /// An inspection result is available.
    pub result_available: bool,
    /// Toggled by the device every time a new result is published.
    pub result_update_complete: bool,
    /// Device is busy.
    pub busy: bool,
    /// Device is capturing an image.
    pub imaging: bool,
    /// Device is in run mode.
    pub run: bool,
    /// Device accepts triggers.
    pub ready: bool,
    /// Result buffer overran.
    pub buffer_overrun: bool,
    /// Warning status; see [`ResultInfo::warning_code`].
    pub warning: bool,
    /// Error status; see [`ResultInfo::error_code`].
    pub error: bool,
}

/// Judgement flags of the last inspection (byte 4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Judgement {
    /// Overall judgement (true = OK).
    pub overall: bool,
    /// Position correction succeeded.
    pub position_correction: bool,
    /// Logic outputs 0-3.
    pub logic: [bool; 4],
    /// Overall judgement NG.
    pub overall_ng: bool,
}

/// Error, status and result information words (bytes 8-23).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultInfo {
    /// Device error code, 0 when none.
    pub error_code: u16,
    /// Device warning code, 0 when none.
    pub warning_code: u16,
    /// Free result buffers left on the sensor.
    pub remaining_buffers: u16,
    /// Setting checksum of the active program.
    pub checksum: u16,
    /// Program currently selected.
    pub current_program_no: u16,
    /// Program that produced the last judgement.
    pub program_no_during_judgement: u16,
    /// Result counter, incremented per inspection.
    pub result_no: u16,
    /// Processing time of the last inspection.
    pub processing_time: u16,
}

/// Processing statistics (bytes 24-47).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Longest processing time since the last statistics reset.
    pub processing_time_max: u16,
    /// Shortest processing time.
    pub processing_time_min: u16,
    /// Average processing time.
    pub processing_time_avg: u16,
    /// Triggers received (u32 at byte 32).
    pub triggers: u32,
    /// OK judgements.
    pub oks: u32,
    /// NG judgements.
    pub ngs: u32,
    /// Triggers rejected by the sensor.
    pub trigger_errors: u32,
}

/// Position correction tool statistics (bytes 52-59).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionCorrectionStats {
    /// Matching rate of the last inspection.
    pub matching_rate: u16,
    /// Highest matching rate.
    pub matching_rate_max: u16,
    /// Lowest matching rate.
    pub matching_rate_min: u16,
    /// Judgement threshold.
    pub threshold: u16,
}

/// One inspection tool (1-16) of the active program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tool {
    /// Tool number, 1-16.
    pub no: u8,
    /// Pass/fail result of the tool.
    pub result: bool,
    /// Matching rate of the last inspection (block offset 0).
    pub matching_rate: u16,
    /// Highest matching rate.
    pub matching_rate_max: u16,
    /// Lowest matching rate.
    pub matching_rate_min: u16,
    /// Lower judgement threshold.
    pub lower_threshold: u16,
    /// Upper judgement threshold.
    pub upper_threshold: u16,
    /// Decimal places of the tool's values.
    pub decimal_point_position: u16,
    /// Largest pitch measured.
    pub pitch_present_value_max: u16,
    /// Smallest pitch measured.
    pub pitch_present_value_min: u16,
    /// Pitches counted (block offset 16).
    pub number_of_pitches: u16,
}

impl Tool {
    /// Decodes tool `no` (1-16) from a status assembly.
    ///
    /// # Errors
    ///
    /// Returns `VisionError::InvalidParameter` for tool numbers outside 1-16
    /// and `VisionError::InvalidFormat` if the buffer is too short.
    pub fn from_bytes(no: u8, data: &[u8]) -> Result<Self> {
        let (bit, base) = match (layout::tool_result_bit(no), layout::tool_block_offset(no)) {
            (Some(bit), Some(base)) => (bit, base),
            _ => {
                return Err(VisionError::invalid_parameter(
                    "tool",
                    format!("tool number {} outside 1-{}", no, TOOL_COUNT),
                ))
            }
        };

        Ok(Self {
            no,
            result: flag(data, bit)?,
            matching_rate: read_u16_le(data, base)?,
            matching_rate_max: read_u16_le(data, base + 2)?,
            matching_rate_min: read_u16_le(data, base + 4)?,
            lower_threshold: read_u16_le(data, base + 6)?,
            upper_threshold: read_u16_le(data, base + 8)?,
            decimal_point_position: read_u16_le(data, base + 10)?,
            pitch_present_value_max: read_u16_le(data, base + 12)?,
            pitch_present_value_min: read_u16_le(data, base + 14)?,
            number_of_pitches: read_u16_le(data, base + 16)?,
        })
    }
}

/// One decoded read of the status assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Control result flags.
    pub control: ControlResults,
    /// Control error flags.
    pub failed: ControlErrors,
    /// Handshake and status flags.
    pub handshake: Handshake,
    /// Judgement flags.
    pub judgement: Judgement,
    /// Numeric result information.
    pub info: ResultInfo,
    /// Processing statistics.
    pub statistics: Statistics,
    /// Position correction tool statistics.
    pub position_correction: PositionCorrectionStats,
    /// Tools 1-16, in order.
    pub tools: [Tool; TOOL_COUNT],
}

impl StatusSnapshot {
    /// Decodes a status assembly.
    ///
    /// Bytes beyond the 392-byte layout are ignored.
    ///
    /// # Errors
    ///
    /// Returns `VisionError::InvalidFormat` if the buffer is shorter than
    /// [`STATUS_ASSEMBLY_SIZE`].
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::StatusSnapshot;
    ///
    /// assert!(StatusSnapshot::from_bytes(&[0u8; 391]).is_err());
    /// assert!(StatusSnapshot::from_bytes(&[0u8; 392]).is_ok());
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < STATUS_ASSEMBLY_SIZE {
            return Err(VisionError::invalid_format(format!(
                "status assembly too short: expected at least {} bytes, got {}",
                STATUS_ASSEMBLY_SIZE,
                data.len()
            )));
        }

        let control = ControlResults {
            trigger: flag(data, layout::TRIGGER_RESPONSE)?,
            master_image_registration: flag(data, layout::MASTER_IMAGE_REGISTRATION_RESPONSE)?,
            program_switching: flag(data, layout::PROGRAM_SWITCHING_RESPONSE)?,
            warning_clear: flag(data, layout::WARNING_CLEAR_RESPONSE)?,
            statistics_reset: flag(data, layout::STATISTICS_RESET_RESPONSE)?,
            buffer_clear: flag(data, layout::BUFFER_CLEAR_RESPONSE)?,
            setting_value_change: flag(data, layout::SETTING_VALUE_CHANGE_RESPONSE)?,
        };

        let failed = ControlErrors {
            trigger: flag(data, layout::TRIGGER_FAILED)?,
            master_image_registration: flag(data, layout::MASTER_IMAGE_REGISTRATION_FAILED)?,
            program_switching: flag(data, layout::PROGRAM_SWITCHING_FAILED)?,
            setting_value_change: flag(data, layout::SETTING_VALUE_CHANGE_FAILED)?,
        };

        let handshake = Handshake {
            result_available: flag(data, layout::RESULT_AVAILABLE)?,
            result_update_complete: flag(data, layout::RESULT_UPDATE_COMPLETE)?,
            busy: flag(data, layout::BUSY)?,
            imaging: flag(data, layout::IMAGING)?,
            run: flag(data, layout::RUN)?,
            ready: flag(data, layout::READY)?,
            buffer_overrun: flag(data, layout::BUFFER_OVERRUN)?,
            warning: flag(data, layout::WARNING)?,
            error: flag(data, layout::ERROR)?,
        };

        let mut logic = [false; 4];
        for (i, slot) in logic.iter_mut().enumerate() {
            let first = layout::LOGIC_FIRST;
            *slot = read_bit(data, first.offset, first.bit + i as u8)?;
        }

        let judgement = Judgement {
            overall: flag(data, layout::OVERALL_JUDGEMENT)?,
            position_correction: flag(data, layout::POSITION_CORRECTION)?,
            logic,
            overall_ng: flag(data, layout::OVERALL_JUDGEMENT_NG)?,
        };

        let info = ResultInfo {
            error_code: read_u16_le(data, layout::ERROR_CODE)?,
            warning_code: read_u16_le(data, layout::WARNING_CODE)?,
            remaining_buffers: read_u16_le(data, layout::REMAINING_BUFFERS)?,
            checksum: read_u16_le(data, layout::CHECKSUM)?,
            current_program_no: read_u16_le(data, layout::CURRENT_PROGRAM_NO)?,
            program_no_during_judgement: read_u16_le(data, layout::PROGRAM_NO_DURING_JUDGEMENT)?,
            result_no: read_u16_le(data, layout::RESULT_NO)?,
            processing_time: read_u16_le(data, layout::PROCESSING_TIME)?,
        };

        let statistics = Statistics {
            processing_time_max: read_u16_le(data, layout::PROCESSING_TIME_MAX)?,
            processing_time_min: read_u16_le(data, layout::PROCESSING_TIME_MIN)?,
            processing_time_avg: read_u16_le(data, layout::PROCESSING_TIME_AVG)?,
            triggers: read_u32_le(data, layout::NUMBER_OF_TRIGGERS)?,
            oks: read_u32_le(data, layout::NUMBER_OF_OKS)?,
            ngs: read_u32_le(data, layout::NUMBER_OF_NGS)?,
            trigger_errors: read_u32_le(data, layout::NUMBER_OF_TRIGGER_ERRORS)?,
        };

        let position_correction = PositionCorrectionStats {
            matching_rate: read_u16_le(data, layout::POSITION_MATCHING_RATE)?,
            matching_rate_max: read_u16_le(data, layout::POSITION_MATCHING_RATE_MAX)?,
            matching_rate_min: read_u16_le(data, layout::POSITION_MATCHING_RATE_MIN)?,
            threshold: read_u16_le(data, layout::POSITION_THRESHOLD)?,
        };

        let mut tools = [Tool::default(); TOOL_COUNT];
        for (i, tool) in tools.iter_mut().enumerate() {
            *tool = Tool::from_bytes(i as u8 + 1, data)?;
        }

        Ok(Self {
            control,
            failed,
            handshake,
            judgement,
            info,
            statistics,
            position_correction,
            tools,
        })
    }

    /// Returns whether the device is both running and ready for a trigger.
    pub fn is_run_and_ready(&self) -> bool {
        self.handshake.run && self.handshake.ready
    }

    /// Returns tool `no` (1-16), or `None` when out of range.
    pub fn tool(&self, no: u8) -> Option<&Tool> {
        (no as usize)
            .checked_sub(1)
            .and_then(|index| self.tools.get(index))
    }

    /// Renders the set response, failure and status flags on one line.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::StatusSnapshot;
    ///
    /// let mut status = StatusSnapshot::default();
    /// status.control.trigger = true;
    /// status.handshake.run = true;
    /// assert_eq!(
    ///     status.flag_summary(),
    ///     "Response = Trigger | Failed = | Status = Run"
    /// );
    /// ```
    pub fn flag_summary(&self) -> String {
        let c = &self.control;
        let f = &self.failed;
        let h = &self.handshake;

        let response = names(&[
            (c.trigger, "Trigger"),
            (c.master_image_registration, "MasterImageRegistration"),
            (c.program_switching, "ProgramSwitching"),
            (c.warning_clear, "WarningClear"),
            (c.statistics_reset, "StatisticsReset"),
            (c.buffer_clear, "BufferClear"),
            (c.setting_value_change, "SettingValueChange"),
        ]);
        let failed = names(&[
            (f.trigger, "Trigger"),
            (f.master_image_registration, "MasterImageRegistration"),
            (f.program_switching, "ProgramSwitching"),
            (f.setting_value_change, "SettingValueChange"),
        ]);
        let status = names(&[
            (h.result_available, "ResultAvailable"),
            (h.result_update_complete, "ResultUpdateComplete"),
            (h.busy, "Busy"),
            (h.imaging, "Imaging"),
            (h.run, "Run"),
            (h.ready, "Ready"),
            (h.buffer_overrun, "BufferOverrun"),
            (h.warning, "Warning"),
            (h.error, "Error"),
        ]);

        format!(
            "Response ={} | Failed ={} | Status ={}",
            response, failed, status
        )
    }
}

fn flag(data: &[u8], address: BitAddress) -> Result<bool> {
    read_bit(data, address.offset, address.bit)
}

fn names(flags: &[(bool, &str)]) -> String {
    flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| format!(" {}", name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{write_u16_le, write_u32_le};

    fn blank() -> Vec<u8> {
        vec![0u8; STATUS_ASSEMBLY_SIZE]
    }

    #[test]
    fn test_from_bytes_too_short() {
        let result = StatusSnapshot::from_bytes(&[0u8; STATUS_ASSEMBLY_SIZE - 1]);
        match result {
            Err(VisionError::InvalidFormat { reason }) => {
                assert!(reason.contains("expected at least 392 bytes, got 391"));
            }
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
        assert!(StatusSnapshot::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_from_bytes_accepts_longer_buffer() {
        let mut data = blank();
        data.extend_from_slice(&[0xFF; 8]);
        let status = StatusSnapshot::from_bytes(&data).unwrap();
        assert_eq!(status, StatusSnapshot::from_bytes(&blank()).unwrap());
    }

    #[test]
    fn test_control_results_byte() {
        let mut data = blank();
        data[0] = 0b1001_0001;
        let status = StatusSnapshot::from_bytes(&data).unwrap();

        assert!(status.control.trigger);
        assert!(!status.control.master_image_registration);
        assert!(!status.control.program_switching);
        assert!(!status.control.warning_clear);
        assert!(status.control.statistics_reset);
        assert!(!status.control.buffer_clear);
        assert!(status.control.setting_value_change);
    }

    #[test]
    fn test_control_result_bit_six_unused() {
        let mut data = blank();
        data[0] = 0b0100_0000;
        let status = StatusSnapshot::from_bytes(&data).unwrap();
        assert_eq!(status.control, ControlResults::default());
    }

    #[test]
    fn test_control_errors_byte() {
        let mut data = blank();
        data[1] = 0b1000_0100;
        let status = StatusSnapshot::from_bytes(&data).unwrap();

        assert!(!status.failed.trigger);
        assert!(!status.failed.master_image_registration);
        assert!(status.failed.program_switching);
        assert!(status.failed.setting_value_change);
    }

    #[test]
    fn test_handshake_bytes() {
        let mut data = blank();
        data[2] = 0b0011_0010;
        data[3] = 0b1010_0000;
        let status = StatusSnapshot::from_bytes(&data).unwrap();
        let h = status.handshake;

        assert!(!h.result_available);
        assert!(h.result_update_complete);
        assert!(!h.busy);
        assert!(!h.imaging);
        assert!(h.run);
        assert!(h.ready);
        assert!(h.buffer_overrun);
        assert!(!h.warning);
        assert!(h.error);
        assert!(status.is_run_and_ready());
    }

    #[test]
    fn test_judgement_byte() {
        let mut data = blank();
        data[4] = 0b0101_0101;
        let status = StatusSnapshot::from_bytes(&data).unwrap();

        assert!(status.judgement.overall);
        assert!(!status.judgement.position_correction);
        assert_eq!(status.judgement.logic, [true, false, true, false]);
        assert!(status.judgement.overall_ng);
    }

    #[test]
    fn test_numeric_fields() {
        let mut data = blank();
        let words: [(usize, u16); 15] = [
            (8, 75),
            (10, 65),
            (12, 3),
            (14, 0xBEEF),
            (16, 12),
            (18, 11),
            (20, 4242),
            (22, 137),
            (24, 200),
            (26, 90),
            (28, 140),
            (52, 981),
            (54, 999),
            (56, 901),
            (58, 700),
        ];
        for (offset, value) in words {
            write_u16_le(&mut data, offset, value).unwrap();
        }
        write_u32_le(&mut data, 32, 100_000).unwrap();
        write_u32_le(&mut data, 36, 99_000).unwrap();
        write_u32_le(&mut data, 40, 1_000).unwrap();
        write_u32_le(&mut data, 44, 0x0102_0304).unwrap();

        let status = StatusSnapshot::from_bytes(&data).unwrap();
        assert_eq!(
            status.info,
            ResultInfo {
                error_code: 75,
                warning_code: 65,
                remaining_buffers: 3,
                checksum: 0xBEEF,
                current_program_no: 12,
                program_no_during_judgement: 11,
                result_no: 4242,
                processing_time: 137,
            }
        );
        assert_eq!(
            status.statistics,
            Statistics {
                processing_time_max: 200,
                processing_time_min: 90,
                processing_time_avg: 140,
                triggers: 100_000,
                oks: 99_000,
                ngs: 1_000,
                trigger_errors: 0x0102_0304,
            }
        );
        assert_eq!(
            status.position_correction,
            PositionCorrectionStats {
                matching_rate: 981,
                matching_rate_max: 999,
                matching_rate_min: 901,
                threshold: 700,
            }
        );
    }

    #[test]
    fn test_tool_blocks() {
        let mut data = blank();
        for no in 1..=16u16 {
            let base = 72 + (no as usize - 1) * 20;
            for field in 0..9u16 {
                write_u16_le(&mut data, base + field as usize * 2, no * 100 + field).unwrap();
            }
        }

        let status = StatusSnapshot::from_bytes(&data).unwrap();
        for no in 1..=16u8 {
            let tool = status.tool(no).unwrap();
            let n = no as u16;
            assert_eq!(tool.no, no);
            assert_eq!(tool.matching_rate, n * 100);
            assert_eq!(tool.matching_rate_max, n * 100 + 1);
            assert_eq!(tool.matching_rate_min, n * 100 + 2);
            assert_eq!(tool.lower_threshold, n * 100 + 3);
            assert_eq!(tool.upper_threshold, n * 100 + 4);
            assert_eq!(tool.decimal_point_position, n * 100 + 5);
            assert_eq!(tool.pitch_present_value_max, n * 100 + 6);
            assert_eq!(tool.pitch_present_value_min, n * 100 + 7);
            assert_eq!(tool.number_of_pitches, n * 100 + 8);
        }
    }

    #[test]
    fn test_tool_result_bits_across_bytes() {
        let mut data = blank();
        data[6] = 0b1000_0000; // tool 8
        data[7] = 0b0000_0001; // tool 9
        let status = StatusSnapshot::from_bytes(&data).unwrap();

        let on: Vec<u8> = status
            .tools
            .iter()
            .filter(|tool| tool.result)
            .map(|tool| tool.no)
            .collect();
        assert_eq!(on, vec![8, 9]);
    }

    #[test]
    fn test_tool_lookup_out_of_range() {
        let status = StatusSnapshot::default();
        assert!(status.tool(0).is_none());
        assert!(status.tool(17).is_none());
        assert!(Tool::from_bytes(0, &blank()).is_err());
        assert!(Tool::from_bytes(17, &blank()).is_err());
    }

    #[test]
    fn test_flag_summary() {
        let mut data = blank();
        data[0] = 0b0000_0100;
        data[1] = 0b0000_0100;
        data[2] = 0b0011_0011;
        data[3] = 0b1000_0000;
        let status = StatusSnapshot::from_bytes(&data).unwrap();

        assert_eq!(
            status.flag_summary(),
            "Response = ProgramSwitching | Failed = ProgramSwitching | \
             Status = ResultAvailable ResultUpdateComplete Run Ready Error"
        );
    }
}
