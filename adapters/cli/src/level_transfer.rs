//! Single-line share codes for level layouts.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use encircle_core::{LevelData, LevelError};
use thiserror::Error;

/// Identifier emitted before the version segment.
const CODE_DOMAIN: &str = "encircle";
const CODE_VERSION: &str = "v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding share codes.
#[derive(Debug, Error)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("share code was empty")]
    EmptyPayload,
    /// The encoded level did not contain a version segment.
    #[error("share code is missing the version")]
    MissingVersion,
    /// The encoded level did not include the payload segment.
    #[error("share code is missing the payload")]
    MissingPayload,
    /// The encoded level used an unexpected prefix segment.
    #[error("share code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded level used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode level payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be converted to or from JSON.
    #[error("could not parse level payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The decoded level breaks a content rule.
    #[error("shared level is invalid: {0}")]
    InvalidLevel(#[from] LevelError),
}

/// Encodes the level into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(level: &LevelData) -> Result<String, LevelTransferError> {
    let json = serde_json::to_vec(level).map_err(LevelTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{CODE_DOMAIN}{FIELD_DELIMITER}{CODE_VERSION}{FIELD_DELIMITER}{encoded}"
    ))
}

/// Decodes and validates a level from its share code.
pub(crate) fn decode(value: &str) -> Result<LevelData, LevelTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelTransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;

    if domain != CODE_DOMAIN {
        return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LevelTransferError::InvalidEncoding)?;
    let level: LevelData =
        serde_json::from_slice(&bytes).map_err(LevelTransferError::InvalidPayload)?;
    level.validate()?;
    Ok(level)
}
