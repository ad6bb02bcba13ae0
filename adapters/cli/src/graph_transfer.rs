#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use outpost_core::GraphSnapshot;
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "graph";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded graph payload.
pub(crate) const TRANSFER_HEADER: &str = "graph:v1";
/// Delimiter used to separate the prefix, cell count and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a graph snapshot into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(snapshot: &GraphSnapshot) -> Result<String, TransferError> {
    let json = serde_json::to_vec(snapshot).map_err(TransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{TRANSFER_HEADER}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{encoded}",
        snapshot.cells.len()
    ))
}

/// Decodes a graph snapshot from the provided string representation.
pub(crate) fn decode(value: &str) -> Result<GraphSnapshot, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let cell_count = parts.next().ok_or(TransferError::MissingCellCount)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let expected_cells = cell_count
        .trim()
        .parse::<usize>()
        .map_err(|_| TransferError::InvalidCellCount(cell_count.to_owned()))?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    let snapshot: GraphSnapshot =
        serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)?;

    if snapshot.cells.len() != expected_cells {
        return Err(TransferError::CellCountMismatch {
            declared: expected_cells,
            actual: snapshot.cells.len(),
        });
    }

    Ok(snapshot)
}

/// Errors that can occur while encoding or decoding graph transfer strings.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("graph string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded graph.
    #[error("graph string is missing the prefix")]
    MissingPrefix,
    /// The encoded graph did not contain a version segment.
    #[error("graph string is missing the version")]
    MissingVersion,
    /// The encoded graph did not include its cell count.
    #[error("graph string is missing the cell count")]
    MissingCellCount,
    /// The encoded graph did not include the payload segment.
    #[error("graph string is missing the payload")]
    MissingPayload,
    /// The encoded graph used an unexpected prefix segment.
    #[error("graph prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded graph used an unsupported version identifier.
    #[error("graph version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The cell count could not be parsed.
    #[error("could not parse cell count '{0}'")]
    InvalidCellCount(String),
    /// The declared cell count disagrees with the payload.
    #[error("graph string declares {declared} cells but carries {actual}")]
    CellCountMismatch {
        /// Count written in the header.
        declared: usize,
        /// Count found in the payload.
        actual: usize,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode graph payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse graph payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}
