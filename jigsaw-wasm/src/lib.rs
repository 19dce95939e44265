//! Browser client for the grid jigsaw app: a creation view that slices a
//! source image into persisted pieces, and a play view that reloads a
//! puzzle for grid-snapped drag play with win detection.

use wasm_bindgen::prelude::*;

mod api;
mod create;
mod models;
mod play;
mod state;
mod utils;

use utils::{get_query_param, log};

/// Entry point. `?puzzle=<id>` opens the play view for that puzzle;
/// without it the creation view is wired up.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    if let Ok(search) = window.location().search()
        && let Some(raw) = get_query_param(&search, "puzzle")
    {
        let puzzle_id: u32 = raw
            .parse()
            .map_err(|_| JsValue::from_str("puzzle id must be a number"))?;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = play::init(puzzle_id).await {
                log(&format!("Failed to load puzzle {puzzle_id}: {err:?}"));
            }
        });
        return Ok(());
    }
    create::init()
}

/// Release the play view and the pointer listeners it registered.
/// Exposed so a host page that swaps views can tear the subscriptions
/// down instead of leaking a window-wide mousemove handler.
#[wasm_bindgen]
pub fn teardown_play_view() {
    play::teardown();
}
