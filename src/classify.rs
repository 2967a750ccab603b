//! Classification of device error and warning codes.
//!
//! Every status read is checked for a device fault before the sequencer looks
//! at anything else. An active error (error flag plus a nonzero error code)
//! takes priority over an active warning; both abort the current run.
//!
//! | Error code | Category |
//! |------------|----------|
//! | 75 | `EEPROM` |
//! | 76 | `FLASHROM` |
//! | 1-32 | `PROGRAM_CORRUPTION` |
//! | other | `ERROR` |
//!
//! Warning codes 58-74 map to named categories (see [`WarningCategory`]);
//! anything else is reported as `WARNING`. The raw code always travels with
//! the category.
//!
//! # Example
//!
//! ```
//! use keyence_vision::{classify, DeviceFault, ErrorCategory, StatusSnapshot};
//!
//! let mut status = StatusSnapshot::default();
//! status.handshake.error = true;
//! status.info.error_code = 75;
//!
//! assert_eq!(
//!     classify(&status),
//!     Some(DeviceFault::Error { category: ErrorCategory::Eeprom, code: 75 })
//! );
//! ```

use crate::error::{Result, VisionError};
use crate::status::StatusSnapshot;

/// Category of a device error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// EEPROM failure (code 75).
    Eeprom,
    /// Flash ROM failure (code 76).
    FlashRom,
    /// Program data corrupted (codes 1-32).
    ProgramCorruption,
    /// Any other error code.
    Other,
}

impl ErrorCategory {
    /// Maps a raw error code to its category.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::ErrorCategory;
    ///
    /// assert_eq!(ErrorCategory::from_code(76), ErrorCategory::FlashRom);
    /// assert_eq!(ErrorCategory::from_code(5), ErrorCategory::ProgramCorruption);
    /// assert_eq!(ErrorCategory::from_code(999), ErrorCategory::Other);
    /// ```
    pub fn from_code(code: u16) -> Self {
        match code {
            75 => ErrorCategory::Eeprom,
            76 => ErrorCategory::FlashRom,
            1..=32 => ErrorCategory::ProgramCorruption,
            _ => ErrorCategory::Other,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Eeprom => write!(f, "EEPROM"),
            ErrorCategory::FlashRom => write!(f, "FLASHROM"),
            ErrorCategory::ProgramCorruption => write!(f, "PROGRAM_CORRUPTION"),
            ErrorCategory::Other => write!(f, "ERROR"),
        }
    }
}

/// Category of a device warning code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCategory {
    /// 58
    ExternalMasterRegistration,
    /// 59
    Sync,
    /// 60
    FieldNetworkOcr,
    /// 61
    FieldNetworkThreshold,
    /// 62
    FieldNetworkOverrun,
    /// 63
    FieldNetworkMasterRegistration,
    /// 64
    FieldNetworkProgramSwitching,
    /// 65
    Trigger,
    /// 66
    ExternalMasterOutline,
    /// 67
    ExternalMasterArea,
    /// 68
    ExternalMasterBrightnessCorrection,
    /// 69
    ExternalMasterEdge,
    /// 70
    FtpBuffer,
    /// 71
    FtpTransfer,
    /// 72
    FtpConnection,
    /// 73
    ExternalMasterWorkMemory,
    /// 74
    ExternalMasterNoImages,
    /// Any other warning code.
    Other,
}

impl WarningCategory {
    /// Maps a raw warning code to its category.
    pub fn from_code(code: u16) -> Self {
        match code {
            58 => WarningCategory::ExternalMasterRegistration,
            59 => WarningCategory::Sync,
            60 => WarningCategory::FieldNetworkOcr,
            61 => WarningCategory::FieldNetworkThreshold,
            62 => WarningCategory::FieldNetworkOverrun,
            63 => WarningCategory::FieldNetworkMasterRegistration,
            64 => WarningCategory::FieldNetworkProgramSwitching,
            65 => WarningCategory::Trigger,
            66 => WarningCategory::ExternalMasterOutline,
            67 => WarningCategory::ExternalMasterArea,
            68 => WarningCategory::ExternalMasterBrightnessCorrection,
            69 => WarningCategory::ExternalMasterEdge,
            70 => WarningCategory::FtpBuffer,
            71 => WarningCategory::FtpTransfer,
            72 => WarningCategory::FtpConnection,
            73 => WarningCategory::ExternalMasterWorkMemory,
            74 => WarningCategory::ExternalMasterNoImages,
            _ => WarningCategory::Other,
        }
    }

    fn name(self) -> &'static str {
        match self {
            WarningCategory::ExternalMasterRegistration => "EXTERNAL_MASTER_REGISTRATION",
            WarningCategory::Sync => "SYNC",
            WarningCategory::FieldNetworkOcr => "FIELD_NETWORK_OCR",
            WarningCategory::FieldNetworkThreshold => "FIELD_NETWORK_THRESHOLD",
            WarningCategory::FieldNetworkOverrun => "FIELD_NETWORK_OVERRUN",
            WarningCategory::FieldNetworkMasterRegistration => "FIELD_NETWORK_MASTER_REGISTRATION",
            WarningCategory::FieldNetworkProgramSwitching => "FIELD_NETWORK_PROGRAM_SWITCHING",
            WarningCategory::Trigger => "TRIGGER",
            WarningCategory::ExternalMasterOutline => "EXTERNAL_MASTER_OUTLINE",
            WarningCategory::ExternalMasterArea => "EXTERNAL_MASTER_AREA",
            WarningCategory::ExternalMasterBrightnessCorrection => {
                "EXTERNAL_MASTER_BRIGHTNESS_CORRECTION"
            }
            WarningCategory::ExternalMasterEdge => "EXTERNAL_MASTER_EDGE",
            WarningCategory::FtpBuffer => "FTP_BUFFER",
            WarningCategory::FtpTransfer => "FTP_TRANSFER",
            WarningCategory::FtpConnection => "FTP_CONNECTION",
            WarningCategory::ExternalMasterWorkMemory => "EXTERNAL_MASTER_WORK_MEMORY",
            WarningCategory::ExternalMasterNoImages => "EXTERNAL_MASTER_NO_IMAGES",
            WarningCategory::Other => "WARNING",
        }
    }
}

impl std::fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified device fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFault {
    /// Error status with a nonzero error code.
    Error {
        /// Classified category.
        category: ErrorCategory,
        /// Raw error code.
        code: u16,
    },
    /// Warning status with a nonzero warning code.
    Warning {
        /// Classified category.
        category: WarningCategory,
        /// Raw warning code.
        code: u16,
    },
}

impl From<DeviceFault> for VisionError {
    fn from(fault: DeviceFault) -> Self {
        match fault {
            DeviceFault::Error { category, code } => VisionError::Device { category, code },
            DeviceFault::Warning { category, code } => {
                VisionError::DeviceWarning { category, code }
            }
        }
    }
}

/// Classifies the fault reported by a status read, if any.
///
/// The error check runs first and short-circuits, so a status carrying both
/// an error and a warning reports only the error.
pub fn classify(status: &StatusSnapshot) -> Option<DeviceFault> {
    let info = &status.info;

    if status.handshake.error && info.error_code > 0 {
        return Some(DeviceFault::Error {
            category: ErrorCategory::from_code(info.error_code),
            code: info.error_code,
        });
    }

    if status.handshake.warning && info.warning_code > 0 {
        return Some(DeviceFault::Warning {
            category: WarningCategory::from_code(info.warning_code),
            code: info.warning_code,
        });
    }

    None
}

/// Fails with the classified fault of a status read.
///
/// # Errors
///
/// Returns `VisionError::Device` or `VisionError::DeviceWarning` when
/// [`classify`] reports a fault.
pub fn check(status: &StatusSnapshot) -> Result<()> {
    match classify(status) {
        Some(fault) => Err(fault.into()),
        None => Ok(()),
    }
}
