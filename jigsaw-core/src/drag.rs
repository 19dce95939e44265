use crate::location::Location;

/// Grid-snap increment in pixels. Drag deltas and shuffle offsets are
/// whole multiples of this, which keeps exact-equality completion checks
/// sound despite imprecise pointer input.
pub const DEFAULT_SNAP_STEP: i32 = 50;

/// What a finished drag asks the state model to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragOutcome {
    pub piece: u32,
    pub delta: (i32, i32),
}

/// Pointer-driven piece selection.
///
/// Idle until a drag starts on a piece; while dragging, the pointer is
/// tracked by the view but the location only changes on drag-end, when
/// the pointer travel is snapped to the grid in one write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { piece: u32, anchor: Location },
}

impl DragState {
    /// Drag-start: remember the piece and the pointer anchor.
    pub fn begin(&mut self, piece: u32, anchor: Location) {
        *self = DragState::Dragging { piece, anchor };
    }

    /// Drag-end: snap the pointer travel to the grid and return to Idle.
    /// `None` when no drag was in progress.
    pub fn finish(&mut self, end: Location, step: i32) -> Option<DragOutcome> {
        let DragState::Dragging { piece, anchor } = *self else {
            return None;
        };
        *self = DragState::Idle;
        Some(DragOutcome {
            piece,
            delta: (snap(end.x - anchor.x, step), snap(end.y - anchor.y, step)),
        })
    }

    /// Abandon a drag without moving anything.
    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    pub fn dragging(&self) -> Option<u32> {
        match self {
            DragState::Dragging { piece, .. } => Some(*piece),
            DragState::Idle => None,
        }
    }
}

/// Snap pointer travel to a whole number of grid steps. Halves round
/// toward positive infinity, matching the browser's `Math.round`.
fn snap(travel: i32, step: i32) -> i32 {
    step * (travel as f64 / step as f64 + 0.5).floor() as i32
}
