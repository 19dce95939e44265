use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, Window,
};

use jigsaw_core::{DragState, Location, PieceGeometry, PuzzleSession};

/// State of the play view, shared across the WASM callbacks behind an
/// `Rc<RefCell<_>>`.
pub struct PlayState {
    pub window: Window,
    pub document: Document,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub puzzle_id: u32,
    pub session: PuzzleSession,
    /// Decoded piece images, index-aligned with `session.pieces()`.
    pub images: Vec<HtmlImageElement>,
    pub drag: DragState,
    /// Live pointer position in canvas coordinates, updated on every
    /// move; locations only change on drag-end.
    pub cursor: Location,
}

/// The play view: its state plus the pointer/button subscriptions.
/// Listeners live here rather than in `PlayState` so dropping the view
/// releases them without a reference cycle through the callbacks.
pub struct PlayView {
    pub state: Rc<RefCell<PlayState>>,
    pub listeners: Vec<EventListener>,
}

thread_local! {
    pub static PLAY: RefCell<Option<PlayView>> = const { RefCell::new(None) };
}

/// State of the creation flow. The grid form is gated on `image`: no
/// geometry work happens until the source image has actually loaded.
pub struct CreateState {
    pub window: Window,
    pub document: Document,
    pub image: Option<HtmlImageElement>,
    pub image_path: String,
    pub geometry: Option<PieceGeometry>,
}

thread_local! {
    pub static CREATE: RefCell<Option<Rc<RefCell<CreateState>>>> = const { RefCell::new(None) };
}
