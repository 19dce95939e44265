use serde::{Deserialize, Serialize};

use jigsaw_core::{Dimensions, Location, Piece};

/// Grid metadata returned alongside the pieces of a puzzle.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct GridInfo {
    pub num_cols: u32,
    pub num_rows: u32,
}

/// Response of the puzzle-fetch operation: piece rows in store order plus
/// a one-element info list carrying the grid size.
#[derive(Clone, Debug, Deserialize)]
pub struct PuzzleResponse {
    pub pieces: Vec<Piece>,
    pub info: Vec<GridInfo>,
}

/// Body of the puzzle-creation request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePuzzleRequest<'a> {
    pub image_path: &'a str,
    pub num_cols: u32,
    pub num_rows: u32,
    pub user_id: u32,
}

/// Row handed back for a created puzzle; only the id matters here.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CreatedPuzzle {
    pub id: u32,
}

/// Body of the per-piece insert. Locations serialize as `"(x,y)"` text,
/// dimensions as a structured pair.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePieceRequest<'a> {
    pub local_id: u32,
    pub img_src: &'a str,
    pub dimensions: Dimensions,
    pub current_location: Location,
    pub true_location: Location,
    pub puzzle_id: u32,
}

/// Body of the overflow insert for payloads past the transport threshold.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveExtraCharactersRequest<'a> {
    pub local_id: u32,
    pub img_src_extra: &'a str,
    pub puzzle_id: u32,
}

/// Body of the location update issued on save.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct UpdateLocationRequest {
    pub puzzle_id: u32,
    pub piece_id: u32,
    pub current_location: Location,
}
