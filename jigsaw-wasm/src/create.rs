//! Creation view: load a source image, pick the grid, slice the image
//! into pieces and persist the puzzle.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, HtmlInputElement,
};

use jigsaw_core::{DisplayBudget, PieceGeometry, PuzzleError};
use jigsaw_slicer::image::RgbaImage;
use jigsaw_slicer::{DEFAULT_SPLIT_THRESHOLD, slice_pieces, split_payload};

use crate::api;
use crate::models::SavePieceRequest;
use crate::state::{CREATE, CreateState};
use crate::utils::log;

/// Owner recorded on created puzzles until there are real accounts.
const DEFAULT_USER_ID: u32 = 1;

pub fn init() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let state = Rc::new(RefCell::new(CreateState {
        window,
        document,
        image: None,
        image_path: String::new(),
        geometry: None,
    }));
    CREATE.with(|st| st.replace(Some(state.clone())));
    attach_create_ui(state)
}

/// The create view lives for the whole page, so its closures are handed
/// to the DOM with `forget`; only the play view needs scoped teardown.
fn attach_create_ui(state: Rc<RefCell<CreateState>>) -> Result<(), JsValue> {
    let document = state.borrow().document.clone();

    // Image URL input. Loading the image gates everything else: the grid
    // form does nothing until a source image has decoded.
    if let Some(input) = document.get_element_by_id("image-url") {
        let input: HtmlInputElement = input.dyn_into()?;
        let input_for_closure = input.clone();
        let st = state.clone();
        let onchange = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let url = input_for_closure.value();
            if url.trim().is_empty() {
                return;
            }
            load_source_image(&st, url.trim().to_string());
        }));
        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();
    }

    // Grid form: validate and derive geometry, then preview the cut.
    if let Some(btn) = document.get_element_by_id("generate-btn") {
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            let Some(image) = s.image.clone() else {
                let err = PuzzleError::ImageLoadFailure {
                    reason: "no source image loaded yet".to_string(),
                };
                let _ = s.window.alert_with_message(&err.to_string());
                return;
            };
            let cols = grid_input(&s.document, "num-cols");
            let rows = grid_input(&s.document, "num-rows");
            match PieceGeometry::new(
                image.natural_width() as f64,
                image.natural_height() as f64,
                cols,
                rows,
                DisplayBudget::default(),
            ) {
                Ok(geometry) => {
                    log(&format!("scale factor set to {}", geometry.scale_factor()));
                    s.geometry = Some(geometry);
                    if let Err(err) = draw_preview(&s.document, &image, &geometry) {
                        log(&format!("preview failed: {err:?}"));
                    }
                }
                Err(err) => {
                    let _ = s.window.alert_with_message(&err.to_string());
                }
            }
        }));
        let btn: web_sys::HtmlElement = btn.dyn_into()?;
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Save: slice and persist, then report once for the whole batch.
    if let Some(btn) = document.get_element_by_id("save-btn") {
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let st = st.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let window = st.borrow().window.clone();
                match create_and_save(&st).await {
                    Ok((puzzle_id, failed)) if failed.is_empty() => {
                        let _ = window.alert_with_message(&format!(
                            "Puzzle {puzzle_id} was successfully saved!"
                        ));
                    }
                    Ok((puzzle_id, failed)) => {
                        let _ = window.alert_with_message(&format!(
                            "Puzzle {puzzle_id} saved, but {} piece(s) failed.",
                            failed.len()
                        ));
                    }
                    Err(err) => {
                        log(&format!("puzzle save failed: {err:?}"));
                        let _ = window.alert_with_message("Could not save the puzzle.");
                    }
                }
            });
        }));
        let btn: web_sys::HtmlElement = btn.dyn_into()?;
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    Ok(())
}

/// Start decoding the image at `url`. On success the state accepts grid
/// input; on error the user is told before any geometry work happens.
fn load_source_image(state: &Rc<RefCell<CreateState>>, url: String) {
    let Ok(image) = HtmlImageElement::new() else {
        return;
    };
    image.set_cross_origin(Some("anonymous"));

    {
        let st = state.clone();
        let loaded = image.clone();
        let loaded_url = url.clone();
        let onload = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            log(&format!(
                "image loaded: {}x{}",
                loaded.natural_width(),
                loaded.natural_height()
            ));
            s.image = Some(loaded.clone());
            s.image_path = loaded_url.clone();
            s.geometry = None;
        }));
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();
    }

    {
        let st = state.clone();
        let failed_url = url.clone();
        let onerror = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            s.image = None;
            s.geometry = None;
            let err = PuzzleError::ImageLoadFailure {
                reason: format!("could not load {failed_url}"),
            };
            let _ = s.window.alert_with_message(&err.to_string());
        }));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    image.set_src(&url);
}

/// Read a grid dimension input; anything unparseable counts as 0 and is
/// rejected downstream as an invalid grid dimension.
fn grid_input(document: &Document, id: &str) -> u32 {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .and_then(|input| input.value().trim().parse().ok())
        .unwrap_or(0)
}

/// Draw the scaled image with cut lines on the preview canvas.
fn draw_preview(
    document: &Document,
    image: &HtmlImageElement,
    geometry: &PieceGeometry,
) -> Result<(), JsValue> {
    let Some(canvas) = document.get_element_by_id("preview") else {
        return Ok(());
    };
    let canvas: HtmlCanvasElement = canvas.dyn_into()?;
    let piece = geometry.scaled_piece_size();
    let width = piece.x * geometry.cols();
    let height = piece.y * geometry.rows();
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(
        image,
        0.0,
        0.0,
        width as f64,
        height as f64,
    )?;

    ctx.set_line_width(1.0);
    ctx.set_stroke_style_str("#fff");
    for col in 1..geometry.cols() {
        let x = (col * piece.x) as f64;
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, height as f64);
        ctx.stroke();
    }
    for row in 1..geometry.rows() {
        let y = (row * piece.y) as f64;
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(width as f64, y);
        ctx.stroke();
    }
    Ok(())
}

/// Creation flow: slice the loaded image, register the puzzle, then
/// insert the pieces one call at a time. Piece inserts are independent
/// failure domains: a bad one is logged and collected, never a reason to
/// stop its siblings.
async fn create_and_save(state: &Rc<RefCell<CreateState>>) -> Result<(u32, Vec<u32>), JsValue> {
    let (document, image, image_path, geometry) = {
        let s = state.borrow();
        let image = s
            .image
            .clone()
            .ok_or_else(|| JsValue::from_str("no source image loaded"))?;
        let geometry = s
            .geometry
            .ok_or_else(|| JsValue::from_str("no grid generated"))?;
        (s.document.clone(), image, s.image_path.clone(), geometry)
    };

    let source = image_pixels(&document, &image)?;
    let pieces =
        slice_pieces(&source, &geometry).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let puzzle_id =
        api::create_puzzle(&image_path, geometry.cols(), geometry.rows(), DEFAULT_USER_ID).await?;

    let mut failed = Vec::new();
    for piece in &pieces {
        let (img_src, overflow) = split_payload(&piece.img_src, DEFAULT_SPLIT_THRESHOLD);
        let request = SavePieceRequest {
            local_id: piece.local_id,
            img_src,
            dimensions: piece.dimensions,
            current_location: piece.location,
            true_location: piece.location,
            puzzle_id,
        };
        if let Err(err) = api::save_piece(&request).await {
            log(&persistence_failure("savePiece", piece.local_id, &err).to_string());
            failed.push(piece.local_id);
            continue;
        }
        if let Some(extra) = overflow
            && let Err(err) = api::save_extra_characters(piece.local_id, extra, puzzle_id).await
        {
            log(&persistence_failure("saveExtraCharacters", piece.local_id, &err).to_string());
            failed.push(piece.local_id);
        }
    }
    Ok((puzzle_id, failed))
}

fn persistence_failure(operation: &str, local_id: u32, err: &JsValue) -> PuzzleError {
    PuzzleError::PersistenceFailure {
        operation: operation.to_string(),
        reason: format!("piece {local_id}: {err:?}"),
    }
}

/// Pull the raw RGBA pixels out of the loaded image via a scratch canvas.
fn image_pixels(document: &Document, image: &HtmlImageElement) -> Result<RgbaImage, JsValue> {
    let width = image.natural_width();
    let height = image.natural_height();
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    ctx.draw_image_with_html_image_element(image, 0.0, 0.0)?;

    let data = ctx.get_image_data(0.0, 0.0, width as f64, height as f64)?;
    RgbaImage::from_raw(width, height, data.data().0)
        .ok_or_else(|| JsValue::from_str("image data size mismatch"))
}
