//! Piece slicing: crop each grid cell out of an RGBA source image,
//! rescale it by the display scale factor and package it as a PNG data
//! URL ready to persist, splitting oversized payloads at the transport
//! threshold.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use log::debug;
use png::{BitDepth, ColorType, Encoder};

use jigsaw_core::{Dimensions, Location, PieceGeometry, PuzzleError};

pub use image;

/// Transport guard for encoded payloads. Chunks longer than this are
/// split into a primary piece record plus an overflow record; the value
/// is a store limitation, not a domain constant, so callers may override
/// it.
pub const DEFAULT_SPLIT_THRESHOLD: usize = 99_999;

/// One sliced piece, ready to persist. `location` doubles as the new
/// piece's true and initial current location.
#[derive(Clone, Debug)]
pub struct EncodedPiece {
    pub local_id: u32,
    pub img_src: String,
    pub dimensions: Dimensions,
    pub location: Location,
}

/// Slice every grid cell of `source` according to `geometry`.
///
/// Pieces are independent: the caller persists each one on its own and a
/// failure for one must not stop the others, so this produces the full
/// batch up front.
pub fn slice_pieces(
    source: &RgbaImage,
    geometry: &PieceGeometry,
) -> Result<Vec<EncodedPiece>, PuzzleError> {
    (0..geometry.piece_count())
        .map(|id| slice_piece(source, geometry, id))
        .collect()
}

fn slice_piece(
    source: &RgbaImage,
    geometry: &PieceGeometry,
    id: u32,
) -> Result<EncodedPiece, PuzzleError> {
    let (origin_x, origin_y) = geometry.crop_origin(id);
    let (piece_w, piece_h) = geometry.piece_size();

    // Crop rectangle clamped to the source bounds; fractional cell sizes
    // round outward so no source pixel column is lost between cells.
    let x = (origin_x.floor() as u32).min(source.width().saturating_sub(1));
    let y = (origin_y.floor() as u32).min(source.height().saturating_sub(1));
    let w = (piece_w.ceil() as u32).clamp(1, source.width() - x);
    let h = (piece_h.ceil() as u32).clamp(1, source.height() - y);
    let cell = imageops::crop_imm(source, x, y, w, h).to_image();

    let target = geometry.scaled_piece_size();
    let target = Dimensions::new(target.x.max(1), target.y.max(1));
    let scaled = if (cell.width(), cell.height()) == (target.x, target.y) {
        cell
    } else {
        imageops::resize(&cell, target.x, target.y, FilterType::Lanczos3)
    };

    let bytes = encode_png(&scaled).map_err(|err| PuzzleError::ImageLoadFailure {
        reason: format!("piece {id} encode failed: {err}"),
    })?;
    let img_src = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
    debug!("piece {id}: {} encoded chars", img_src.len());

    Ok(EncodedPiece {
        local_id: id,
        img_src,
        dimensions: target,
        location: geometry.true_location(id),
    })
}

/// Deterministic PNG encoding: fixed filter and depth so the same pixels
/// always produce the same payload.
fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    let mut enc = Encoder::new(&mut buf, image.width(), image.height());
    enc.set_color(ColorType::Rgba);
    enc.set_depth(BitDepth::Eight);
    enc.set_filter(png::FilterType::NoFilter);
    {
        let mut writer = enc.write_header()?;
        writer.write_image_data(image.as_raw())?;
    }
    Ok(buf)
}

/// Split an encoded payload at the transport threshold. Concatenating
/// primary and overflow reproduces the payload exactly; payloads at or
/// under the threshold pass through whole.
pub fn split_payload(encoded: &str, threshold: usize) -> (&str, Option<&str>) {
    if encoded.len() <= threshold {
        (encoded, None)
    } else {
        // Data URLs are ASCII, so the byte index is a char boundary.
        let (primary, overflow) = encoded.split_at(threshold);
        (primary, Some(overflow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use jigsaw_core::DisplayBudget;

    const QUADRANTS: [Rgba<u8>; 4] = [
        Rgba([255, 0, 0, 255]),
        Rgba([0, 255, 0, 255]),
        Rgba([0, 0, 255, 255]),
        Rgba([255, 255, 0, 255]),
    ];

    /// 2x2 grid of solid-color quadrants, each `cell` pixels square.
    fn quadrant_image(cell: u32) -> RgbaImage {
        RgbaImage::from_fn(cell * 2, cell * 2, |x, y| {
            let col = (x / cell) as usize;
            let row = (y / cell) as usize;
            QUADRANTS[row * 2 + col]
        })
    }

    fn wide_budget() -> DisplayBudget {
        DisplayBudget {
            max_width: 1000.0,
            max_height: 1000.0,
        }
    }

    #[test]
    fn slices_every_cell_at_scale_one() {
        let source = quadrant_image(4);
        let geometry = PieceGeometry::new(8.0, 8.0, 2, 2, wide_budget()).unwrap();
        let pieces = slice_pieces(&source, &geometry).unwrap();
        assert_eq!(pieces.len(), 4);

        for piece in &pieces {
            assert_eq!(piece.dimensions, Dimensions::new(4, 4));
            assert!(piece.img_src.starts_with("data:image/png;base64,"));

            let b64 = piece.img_src.trim_start_matches("data:image/png;base64,");
            let bytes = STANDARD.decode(b64).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
            assert_eq!((decoded.width(), decoded.height()), (4, 4));
            // Every pixel carries the quadrant's color.
            let expected = QUADRANTS[piece.local_id as usize];
            assert!(decoded.pixels().all(|px| *px == expected));
        }

        assert_eq!(pieces[3].location, Location::new(4, 4));
    }

    #[test]
    fn oversized_source_is_rescaled_per_piece() {
        let source = quadrant_image(8);
        let budget = DisplayBudget {
            max_width: 8.0,
            max_height: 8.0,
        };
        // 16x16 source against an 8x8 budget: scale 0.5, 4x4 pieces.
        let geometry = PieceGeometry::new(16.0, 16.0, 2, 2, budget).unwrap();
        let pieces = slice_pieces(&source, &geometry).unwrap();

        for piece in &pieces {
            assert_eq!(piece.dimensions, Dimensions::new(4, 4));
            let b64 = piece.img_src.trim_start_matches("data:image/png;base64,");
            let decoded = image::load_from_memory(&STANDARD.decode(b64).unwrap())
                .unwrap()
                .to_rgba8();
            let expected = QUADRANTS[piece.local_id as usize];
            assert!(decoded.pixels().all(|px| *px == expected));
        }
        assert_eq!(pieces[1].location, Location::new(4, 0));
    }

    #[test]
    fn split_round_trips_under_and_over_threshold() {
        let short = "a".repeat(10);
        let (primary, overflow) = split_payload(&short, 10);
        assert_eq!(primary, short);
        assert!(overflow.is_none());

        let long: String = ('a'..='z').cycle().take(25).collect();
        let (primary, overflow) = split_payload(&long, 10);
        assert_eq!(primary.len(), 10);
        let overflow = overflow.unwrap();
        assert_eq!(overflow.len(), 15);
        assert_eq!(format!("{primary}{overflow}"), long);
    }

    #[test]
    fn default_threshold_matches_the_store_guard() {
        assert_eq!(DEFAULT_SPLIT_THRESHOLD, 99_999);
        let payload = "x".repeat(DEFAULT_SPLIT_THRESHOLD + 1);
        let (primary, overflow) = split_payload(&payload, DEFAULT_SPLIT_THRESHOLD);
        assert_eq!(primary.len(), DEFAULT_SPLIT_THRESHOLD);
        assert_eq!(overflow.unwrap().len(), 1);
    }
}
