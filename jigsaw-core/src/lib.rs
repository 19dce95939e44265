//! Grid-jigsaw puzzle engine: piece geometry, session state, grid-snapped
//! dragging and shuffle/verify bookkeeping. Independent of any rendering
//! or persistence layer; the browser client lives in `jigsaw-wasm`.

pub mod drag;
pub mod error;
pub mod geometry;
pub mod location;
pub mod piece;
pub mod session;
pub mod shuffle;

pub use drag::{DEFAULT_SNAP_STEP, DragOutcome, DragState};
pub use error::PuzzleError;
pub use geometry::{DisplayBudget, PieceGeometry};
pub use location::{Dimensions, Location};
pub use piece::Piece;
pub use session::PuzzleSession;
pub use shuffle::{ShuffleConfig, ShuffleRng};
