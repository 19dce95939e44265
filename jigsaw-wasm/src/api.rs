//! Persistence collaborator: thin async wrappers over `window.fetch`.
//!
//! Every call is independent; there is no retry and no cancellation. A
//! rejected call surfaces as an error to the flow that issued it and
//! leaves whatever already completed in place.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use jigsaw_core::Location;

use crate::models::{
    CreatePuzzleRequest, CreatedPuzzle, PuzzleResponse, SaveExtraCharactersRequest,
    SavePieceRequest, UpdateLocationRequest,
};
use crate::utils::api_base_url;

/// `fetchPuzzle`: piece rows plus grid info for one puzzle.
pub async fn fetch_puzzle(puzzle_id: u32) -> Result<PuzzleResponse, JsValue> {
    let text = request_text("GET", &format!("{}/puzzles/{puzzle_id}", api_base_url()), None).await?;
    parse_json(&text)
}

/// `createPuzzle`: register the puzzle row, returning its id.
pub async fn create_puzzle(
    image_path: &str,
    num_cols: u32,
    num_rows: u32,
    user_id: u32,
) -> Result<u32, JsValue> {
    let body = to_body(&CreatePuzzleRequest {
        image_path,
        num_cols,
        num_rows,
        user_id,
    })?;
    let text = request_text("POST", &format!("{}/puzzles", api_base_url()), Some(body)).await?;
    let created: CreatedPuzzle = parse_json(&text)?;
    Ok(created.id)
}

/// `savePiece`: insert one piece row (primary payload chunk).
pub async fn save_piece(request: &SavePieceRequest<'_>) -> Result<(), JsValue> {
    let body = to_body(request)?;
    request_text("POST", &format!("{}/pieces", api_base_url()), Some(body)).await?;
    Ok(())
}

/// `saveExtraCharacters`: insert the overflow chunk of a split payload.
pub async fn save_extra_characters(
    local_id: u32,
    img_src_extra: &str,
    puzzle_id: u32,
) -> Result<(), JsValue> {
    let body = to_body(&SaveExtraCharactersRequest {
        local_id,
        img_src_extra,
        puzzle_id,
    })?;
    request_text("POST", &format!("{}/pieces/extra", api_base_url()), Some(body)).await?;
    Ok(())
}

/// `updatePieceLocation`: persist one piece's current location.
pub async fn update_piece_location(
    puzzle_id: u32,
    piece_id: u32,
    current_location: Location,
) -> Result<(), JsValue> {
    let body = to_body(&UpdateLocationRequest {
        puzzle_id,
        piece_id,
        current_location,
    })?;
    request_text("PUT", &format!("{}/pieces", api_base_url()), Some(body)).await?;
    Ok(())
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, JsValue> {
    serde_json::from_str(text).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Issue one request and hand back the response body text. Non-2xx
/// responses become errors carrying the status code.
async fn request_text(method: &str, url: &str, body: Option<String>) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or("no window")?;

    let opts = RequestInit::new();
    opts.set_method(method);
    if let Some(body) = &body {
        opts.set_body(&JsValue::from_str(body));
    }
    let request = Request::new_with_str_and_init(url, &opts)?;
    if body.is_some() {
        request.headers().set("Content-Type", "application/json")?;
    }

    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!(
            "{method} {url} failed with status {}",
            resp.status()
        )));
    }
    let text_js = JsFuture::from(resp.text()?).await?;
    Ok(text_js.as_string().unwrap_or_default())
}
