//! Structured result output.
//!
//! A successful run leaves one captured [`StatusSnapshot`]. The CLI reports it
//! as a single JSON line:
//!
//! ```text
//! {"program":3,"result":true,"processingTime":42,"tools":[{"result":true,"matchingRate":980,"lowerThreshold":700,"upperThreshold":1000}]}
//! ```
//!
//! `tools` is omitted when no tools were requested.

use serde::Serialize;

use crate::error::{Result, VisionError};
use crate::status::{StatusSnapshot, Tool};

/// Summary of one tool in the result line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReport {
    /// Pass/fail result of the tool.
    pub result: bool,
    /// Matching rate of the tool.
    pub matching_rate: u16,
    /// Lower judgement threshold.
    pub lower_threshold: u16,
    /// Upper judgement threshold.
    pub upper_threshold: u16,
}

impl From<&Tool> for ToolReport {
    fn from(tool: &Tool) -> Self {
        Self {
            result: tool.result,
            matching_rate: tool.matching_rate,
            lower_threshold: tool.lower_threshold,
            upper_threshold: tool.upper_threshold,
        }
    }
}

/// The result line written after a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    /// Program number active during judgement.
    pub program: u16,
    /// Overall judgement.
    pub result: bool,
    /// Processing time of the inspection.
    pub processing_time: u16,
    /// Tools 1..N, present only when tools were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolReport>>,
}

impl InspectionReport {
    /// Builds the report for `status`, including the first `tools` tools.
    ///
    /// `tools` is clamped to the 16 tools the device reports.
    ///
    /// # Example
    ///
    /// ```
    /// use keyence_vision::{InspectionReport, StatusSnapshot};
    ///
    /// let mut status = StatusSnapshot::default();
    /// status.info.program_no_during_judgement = 3;
    /// status.judgement.overall = true;
    /// status.info.processing_time = 42;
    ///
    /// let report = InspectionReport::from_status(&status, 0);
    /// assert_eq!(
    ///     report.to_json().unwrap(),
    ///     r#"{"program":3,"result":true,"processingTime":42}"#
    /// );
    /// ```
    pub fn from_status(status: &StatusSnapshot, tools: u8) -> Self {
        let tools = match tools {
            0 => None,
            n => Some(
                status
                    .tools
                    .iter()
                    .take(n as usize)
                    .map(ToolReport::from)
                    .collect(),
            ),
        };

        Self {
            program: status.info.program_no_during_judgement,
            result: status.judgement.overall,
            processing_time: status.info.processing_time,
            tools,
        }
    }

    /// Serializes the report as one line of JSON.
    ///
    /// # Errors
    ///
    /// Returns `VisionError::InvalidFormat` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| VisionError::invalid_format(format!("report serialization: {}", e)))
    }
}
