//! Play view: load a persisted puzzle, render its pieces on the canvas
//! and wire up grid-snapped dragging plus the shuffle/check/save buttons.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent};

use jigsaw_core::{DragState, Location, PuzzleError, PuzzleSession, ShuffleConfig, ShuffleRng};

use crate::api;
use crate::state::{PLAY, PlayState, PlayView};
use crate::utils::{event_canvas_coords, log};

/// Canvas border around the puzzle, in snap steps, so shuffled pieces
/// that land left of or above the origin stay visible.
const MARGIN_STEPS: i32 = 2;

pub async fn init(puzzle_id: u32) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let response = api::fetch_puzzle(puzzle_id).await?;
    let info = response
        .info
        .first()
        .copied()
        .ok_or_else(|| JsValue::from_str("puzzle info missing from response"))?;
    let session = PuzzleSession::new(response.pieces, info.num_cols, info.num_rows)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let canvas = document
        .get_element_by_id("puzzle")
        .ok_or_else(|| JsValue::from_str("canvas #puzzle not found"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let dims = session.dimensions();
    let margin = (MARGIN_STEPS * session.step()) as u32;
    canvas.set_width(dims.x + margin * 2);
    canvas.set_height(dims.y + margin * 2);

    // One image element per piece, fed the reconstructed payload
    // (overflow concatenated after the primary chunk).
    let mut images = Vec::with_capacity(session.pieces().len());
    for piece in session.pieces() {
        let img = HtmlImageElement::new()?;
        img.set_src(&piece.full_image_src());
        images.push(img);
    }

    let state = Rc::new(RefCell::new(PlayState {
        window,
        document,
        canvas,
        ctx,
        puzzle_id,
        session,
        images,
        drag: DragState::default(),
        cursor: Location::default(),
    }));
    let listeners = attach_play_ui(&state);
    draw(&state.borrow());

    PLAY.with(|view| {
        view.replace(Some(PlayView {
            state,
            listeners,
        }))
    });
    Ok(())
}

/// Drop the play view. Releasing the `PlayView` removes every pointer
/// and button subscription it registered.
pub fn teardown() {
    PLAY.with(|view| view.replace(None));
}

fn attach_play_ui(state: &Rc<RefCell<PlayState>>) -> Vec<EventListener> {
    let mut listeners = Vec::new();
    let (canvas, window, document, images) = {
        let s = state.borrow();
        (
            s.canvas.clone(),
            s.window.clone(),
            s.document.clone(),
            s.images.clone(),
        )
    };

    // Piece images decode after init; redraw as each one arrives.
    for img in images {
        let st = state.clone();
        listeners.push(EventListener::once(&img, "load", move |_| {
            draw(&st.borrow());
        }));
    }

    // Drag-start: select the topmost piece under the pointer.
    {
        let st = state.clone();
        listeners.push(EventListener::new(&canvas, "mousedown", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let mut s = st.borrow_mut();
            let pt = event_canvas_coords(event, &s.canvas);
            s.cursor = Location::new(pt.0 as i32, pt.1 as i32);
            if let Some(id) = hit_test(&s, pt) {
                let anchor = s.cursor;
                s.drag.begin(id, anchor);
            }
        }));
    }

    // Track the pointer continuously; the piece itself only moves on
    // drag-end.
    {
        let st = state.clone();
        listeners.push(EventListener::new(&window, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let mut s = st.borrow_mut();
            let pt = event_canvas_coords(event, &s.canvas);
            s.cursor = Location::new(pt.0 as i32, pt.1 as i32);
        }));
    }

    // Drag-end: snap the travel to the grid and commit one write.
    {
        let st = state.clone();
        listeners.push(EventListener::new(&window, "mouseup", move |event| {
            let mut s = st.borrow_mut();
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let pt = event_canvas_coords(event, &s.canvas);
                s.cursor = Location::new(pt.0 as i32, pt.1 as i32);
            }
            let end = s.cursor;
            let step = s.session.step();
            if let Some(outcome) = s.drag.finish(end, step) {
                match s.session.apply_drag(outcome) {
                    Ok(_) => draw(&s),
                    Err(err) => log(&format!("drag rejected: {err}")),
                }
            }
        }));
    }

    if let Some(btn) = document.get_element_by_id("shuffle-btn") {
        let st = state.clone();
        listeners.push(EventListener::new(&btn, "click", move |_| {
            let mut s = st.borrow_mut();
            let seed = (js_sys::Math::random() * u32::MAX as f64) as u32;
            let mut rng = ShuffleRng::new(seed);
            s.session.shuffle(&ShuffleConfig::default(), &mut rng);
            draw(&s);
        }));
    }

    if let Some(btn) = document.get_element_by_id("check-btn") {
        let st = state.clone();
        listeners.push(EventListener::new(&btn, "click", move |_| {
            let s = st.borrow();
            let message = if s.session.is_solved() {
                "Congrats!! It's correct!!"
            } else {
                "Sorry! Something's wrong..."
            };
            let _ = s.window.alert_with_message(message);
        }));
    }

    if let Some(btn) = document.get_element_by_id("save-btn") {
        let st = state.clone();
        listeners.push(EventListener::new(&btn, "click", move |_| {
            let st = st.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let report = save_progress(&st).await;
                let window = st.borrow().window.clone();
                let message = if report.failed.is_empty() {
                    "Saved successfully!".to_string()
                } else {
                    format!(
                        "Saved {} of {} pieces; the rest kept their last stored location.",
                        report.attempted - report.failed.len(),
                        report.attempted
                    )
                };
                let _ = window.alert_with_message(&message);
            });
        }));
    }

    listeners
}

struct SaveReport {
    attempted: usize,
    failed: Vec<u32>,
}

/// Persist every piece's current location: one independent update call
/// per piece, issued sequentially. Failures are collected rather than
/// fatal, so a partial save leaves a mix of old and new stored locations
/// and the user gets a single aggregate notification.
async fn save_progress(state: &Rc<RefCell<PlayState>>) -> SaveReport {
    let (puzzle_id, locations) = {
        let s = state.borrow();
        let locations: Vec<(u32, Location)> = s
            .session
            .pieces()
            .iter()
            .map(|piece| (piece.local_id, piece.current_location))
            .collect();
        (s.puzzle_id, locations)
    };

    let mut failed = Vec::new();
    for (piece_id, location) in &locations {
        if let Err(err) = api::update_piece_location(puzzle_id, *piece_id, *location).await {
            let err = PuzzleError::PersistenceFailure {
                operation: "updatePieceLocation".to_string(),
                reason: format!("piece {piece_id}: {err:?}"),
            };
            log(&err.to_string());
            failed.push(*piece_id);
        }
    }
    SaveReport {
        attempted: locations.len(),
        failed,
    }
}

fn margin_px(session: &PuzzleSession) -> i32 {
    MARGIN_STEPS * session.step()
}

/// Topmost piece under a canvas point: pieces draw in ascending
/// `local_id` order, so scan them in reverse.
fn hit_test(state: &PlayState, pt: (f64, f64)) -> Option<u32> {
    let margin = margin_px(&state.session) as f64;
    for piece in state.session.pieces().iter().rev() {
        let x = piece.current_location.x as f64 + margin;
        let y = piece.current_location.y as f64 + margin;
        let w = piece.dimensions.x as f64;
        let h = piece.dimensions.y as f64;
        if pt.0 >= x && pt.0 < x + w && pt.1 >= y && pt.1 < y + h {
            return Some(piece.local_id);
        }
    }
    None
}

fn draw(state: &PlayState) {
    let ctx = &state.ctx;
    let canvas_w = state.canvas.width() as f64;
    let canvas_h = state.canvas.height() as f64;
    ctx.clear_rect(0.0, 0.0, canvas_w, canvas_h);

    // Outline of the solved footprint.
    let dims = state.session.dimensions();
    let margin = margin_px(&state.session) as f64;
    ctx.set_line_width(1.6);
    ctx.set_stroke_style_str("#333");
    ctx.stroke_rect(margin, margin, dims.x as f64, dims.y as f64);

    for (piece, img) in state.session.pieces().iter().zip(&state.images) {
        if !img.complete() {
            continue;
        }
        let loc = piece.current_location;
        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            loc.x as f64 + margin,
            loc.y as f64 + margin,
            piece.dimensions.x as f64,
            piece.dimensions.y as f64,
        );
    }
}
