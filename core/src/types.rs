//! Domain DTOs shared by the resource facades.
//!
//! # Design
//! Content, metadata and user data are vendor-defined documents, so the
//! facades hand them back as `serde_json::Value`. Only the payloads this SDK
//! assembles itself (usage events, log events) get dedicated types.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{AppGridError, Result};

/// Acknowledgement of a successful POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub status: u16,
    pub status_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UsageEventType {
    Start,
    Quit,
}

/// Body of `POST /event/log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub event_type: UsageEventType,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_time: Option<u64>,
}

/// Severity accepted by the application log endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = AppGridError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(AppGridError::Validation(format!(
                "Unsupported log level: {other}"
            ))),
        }
    }
}

/// Caller-facing description of one application log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDetails {
    pub message: String,
    pub facility_code: Option<u32>,
    pub error_code: Option<u32>,
    pub dim1: Option<String>,
    pub dim2: Option<String>,
    pub dim3: Option<String>,
    pub dim4: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim4: Option<String>,
}

/// Wire body of `POST /application/log/{level}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub code: u64,
    pub message: String,
    pub dimensions: Dimensions,
}

impl LogEvent {
    /// Build the wire event. The code is the facility code followed by the
    /// error code, read back as one decimal number; the metadata is appended
    /// to the message as JSON when present.
    pub fn new(details: &LogDetails, metadata: &[serde_json::Value]) -> Result<Self> {
        let code = concatenated_code(
            details.facility_code.unwrap_or(0),
            details.error_code.unwrap_or(0),
        )?;
        let message = if metadata.is_empty() {
            details.message.clone()
        } else {
            let json = serde_json::to_string(metadata)
                .map_err(|e| AppGridError::Serialization(e.to_string()))?;
            format!("{} | Metadata: {json}", details.message)
        };
        Ok(Self {
            code,
            message,
            dimensions: Dimensions {
                dim1: details.dim1.clone(),
                dim2: details.dim2.clone(),
                dim3: details.dim3.clone(),
                dim4: details.dim4.clone(),
            },
        })
    }
}

fn concatenated_code(facility_code: u32, error_code: u32) -> Result<u64> {
    format!("{facility_code}{error_code}")
        .parse::<u64>()
        .map_err(|e| AppGridError::Validation(format!("log code out of range: {e}")))
}

/// Namespace for user data: private to one user, or shared by the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDataScope {
    Application,
    ApplicationGroup,
}

impl UserDataScope {
    pub fn path_segment(self) -> &'static str {
        match self {
            UserDataScope::Application => "user",
            UserDataScope::ApplicationGroup => "group",
        }
    }
}

/// AppGrid time-of-day dimension for the given hour (0-23).
pub fn time_of_day_bucket(hour: u32) -> &'static str {
    match hour {
        1..=4 => "01-05",
        5..=8 => "05-09",
        9..=12 => "09-13",
        13..=16 => "13-17",
        17..=20 => "17-21",
        _ => "21-01",
    }
}

/// Time-of-day dimension for the current local hour, for use as a log
/// dimension.
pub fn time_of_day_dim_value() -> &'static str {
    time_of_day_bucket(Local::now().hour())
}
