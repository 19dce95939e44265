use thiserror::Error;

/// Errors surfaced by the puzzle engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// Grid dimensions must both be at least 1.
    #[error("invalid grid dimensions {cols}x{rows}")]
    InvalidGridDimension { cols: u32, rows: u32 },

    /// The source image could not be loaded or decoded.
    #[error("image load failed: {reason}")]
    ImageLoadFailure { reason: String },

    /// A persistence call was rejected. Calls that already completed are
    /// left as-is; there is no automatic retry.
    #[error("persistence call {operation} failed: {reason}")]
    PersistenceFailure { operation: String, reason: String },

    /// A location update referenced a piece outside the loaded set.
    #[error("unknown piece {local_id}")]
    UnknownPiece { local_id: u32 },

    /// Location text did not match the `(x,y)` wire form.
    #[error("malformed location {text:?}")]
    MalformedLocation { text: String },
}
