//! Line collaborator error types

use super::LineId;

/// Result type for line collaborator operations
pub type Result<T> = std::result::Result<T, BusError>;

/// Errors surfaced by a [`LineBus`](super::LineBus) implementation
///
/// Protocol findings are never reported through this type; they are records.
/// A `BusError` means the collaborator itself can no longer serve the checker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// The collaborator tore the scenario down; ends the run loop
    #[error("line bus closed")]
    Closed,

    /// The line identifier is not wired to this bus
    #[error("unknown line: {0}")]
    UnknownLine(LineId),

    /// Backend-specific failure
    #[error("line backend error: {0}")]
    Backend(String),
}
