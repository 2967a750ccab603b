//! Error types for the vision sensor sequencer.

use std::io;
use thiserror::Error;

use crate::classify::{ErrorCategory, WarningCategory};

/// Result type alias for vision sensor operations.
pub type Result<T> = std::result::Result<T, VisionError>;

/// Errors that can occur while talking to or sequencing the sensor.
#[derive(Debug, Error)]
pub enum VisionError {
    /// Invalid parameter provided (bad CLI input or out-of-range field).
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// The session transport failed.
    #[error("Connection failure: {reason}")]
    Connection {
        /// Description of the transport failure.
        reason: String,
    },

    /// I/O error raised by a transport implementation.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A buffer received from the device does not match the assembly layout.
    #[error("Invalid assembly format: {reason}")]
    InvalidFormat {
        /// Description of the format error.
        reason: String,
    },

    /// The device reported an error status with a nonzero error code.
    #[error("Device error {category} (code {code})")]
    Device {
        /// Classified error category.
        category: ErrorCategory,
        /// Raw error code reported by the device.
        code: u16,
    },

    /// The device reported a warning status with a nonzero warning code.
    #[error("Device warning {category} (code {code})")]
    DeviceWarning {
        /// Classified warning category.
        category: WarningCategory,
        /// Raw warning code reported by the device.
        code: u16,
    },

    /// The device never became Run and Ready within the readiness window.
    #[error("Device is not running and ready")]
    InvalidInitialConditions,

    /// The device did not confirm the program switch, or reported it failed.
    #[error("Program selection failed for program {program}")]
    ProgramSelectionFailed {
        /// Program number that was requested.
        program: u16,
    },

    /// No fresh inspection result appeared within the trigger window.
    #[error("Inspection result not available")]
    ResultNotAvailable,

    /// The run was interrupted through the cancellation token.
    #[error("Operation cancelled")]
    Cancelled,
}

impl VisionError {
    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::VisionError;
    ///
    /// let err = VisionError::invalid_parameter("program", "must be between 0 and 31");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Connection` error.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::VisionError;
    ///
    /// let err = VisionError::connection("session registration refused");
    /// ```
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidFormat` error.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::VisionError;
    ///
    /// let err = VisionError::invalid_format("status assembly too short");
    /// ```
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Returns the diagnostic code line reported for this error.
    ///
    /// Errors without a dedicated code map to `ERR_EXCEPTION`.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::{ErrorCategory, VisionError};
    ///
    /// let err = VisionError::Device { category: ErrorCategory::Eeprom, code: 75 };
    /// assert_eq!(err.code(), "ERR_KEYENCE_EEPROM=75");
    /// assert_eq!(VisionError::Cancelled.code(), "ERR_CANCELLED");
    /// ```
    pub fn code(&self) -> String {
        match self {
            Self::InvalidParameter { .. } => "ERR_INVALID_ARGS".to_string(),
            Self::Connection { .. } | Self::Io(_) => "ERR_CONNECTION_FAILURE".to_string(),
            Self::Device { category, code } => format!("ERR_KEYENCE_{category}={code}"),
            Self::DeviceWarning { category, code } => format!("ERR_KEYENCE_{category}={code}"),
            Self::InvalidInitialConditions => "ERR_INVALID_INITIAL_CONDITIONS".to_string(),
            Self::ProgramSelectionFailed { .. } => "ERR_PROGRAM_SELECTION_FAILED".to_string(),
            Self::ResultNotAvailable => "ERR_RESULT_NOT_AVAILABLE".to_string(),
            Self::Cancelled => "ERR_CANCELLED".to_string(),
            Self::InvalidFormat { .. } => "ERR_EXCEPTION".to_string(),
        }
    }

    /// Returns whether the error falls outside the dedicated code set and
    /// is reported as a generic `ERR_EXCEPTION`.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. })
    }

    /// Returns whether this error is the cancellation outcome.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
