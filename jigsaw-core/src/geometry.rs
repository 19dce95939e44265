use crate::error::PuzzleError;
use crate::location::{Dimensions, Location};

/// Largest on-screen footprint a puzzle may take, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayBudget {
    pub max_width: f64,
    pub max_height: f64,
}

impl Default for DisplayBudget {
    fn default() -> Self {
        Self {
            max_width: 650.0,
            max_height: 450.0,
        }
    }
}

/// Per-piece geometry derived from the source image size and the grid.
///
/// Unscaled piece sizes may be fractional; everything rendered on screen
/// uses the scaled size floored to whole pixels, the same for every piece,
/// so true-location arithmetic stays exact on integers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceGeometry {
    cols: u32,
    rows: u32,
    scale_factor: f64,
    piece_width: f64,
    piece_height: f64,
}

impl PieceGeometry {
    /// Pure derivation from image size, grid size and display budget.
    /// Rejects non-positive grid dimensions; the image must already have
    /// loaded, so its size is taken at face value.
    pub fn new(
        image_width: f64,
        image_height: f64,
        cols: u32,
        rows: u32,
        budget: DisplayBudget,
    ) -> Result<Self, PuzzleError> {
        if cols == 0 || rows == 0 {
            return Err(PuzzleError::InvalidGridDimension { cols, rows });
        }
        let width_ratio = image_width / budget.max_width;
        let height_ratio = image_height / budget.max_height;
        // Uniform downscale when the image exceeds the budget; never upscale.
        let scale_factor = if width_ratio > 1.0 || height_ratio > 1.0 {
            1.0 / width_ratio.max(height_ratio)
        } else {
            1.0
        };
        Ok(Self {
            cols,
            rows,
            scale_factor,
            piece_width: image_width / cols as f64,
            piece_height: image_height / rows as f64,
        })
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn piece_count(&self) -> u32 {
        self.cols * self.rows
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Unscaled piece size in source-image space.
    pub fn piece_size(&self) -> (f64, f64) {
        (self.piece_width, self.piece_height)
    }

    /// Source-space origin of the crop rectangle for `id`.
    pub fn crop_origin(&self, id: u32) -> (f64, f64) {
        (
            self.piece_width * (id % self.cols) as f64,
            self.piece_height * (id / self.cols) as f64,
        )
    }

    /// On-screen piece size shared by every piece.
    pub fn scaled_piece_size(&self) -> Dimensions {
        Dimensions::new(
            (self.piece_width * self.scale_factor) as u32,
            (self.piece_height * self.scale_factor) as u32,
        )
    }

    /// Where piece `id` belongs on the scaled play grid.
    pub fn true_location(&self, id: u32) -> Location {
        let size = self.scaled_piece_size();
        Location::new(
            (size.x * (id % self.cols)) as i32,
            (size.y * (id / self.cols)) as i32,
        )
    }
}
