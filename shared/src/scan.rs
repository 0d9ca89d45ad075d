//! Scan code value type

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejection reasons for raw scanner or keyboard input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanCodeError {
    #[error("scan code is empty")]
    Empty,
}

/// Membership code, camera-decoded or typed by the operator.
///
/// Always trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScanCode(String);

impl ScanCode {
    /// Trim raw input and reject blank codes
    pub fn parse(raw: &str) -> Result<Self, ScanCodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScanCodeError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ScanCode {
    type Error = ScanCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ScanCode> for String {
    fn from(code: ScanCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ScanCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
