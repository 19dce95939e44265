use serde::{Deserialize, Serialize};

use crate::location::{Dimensions, Location};

/// One grid cell of the source image: a fixed correct position and a
/// mutable current position, plus the encoded image it renders with.
///
/// `img_src` is a PNG data URL. Payloads longer than the transport
/// threshold arrive split, with the tail in `img_src_extra`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Piece {
    pub local_id: u32,
    pub img_src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_src_extra: Option<String>,
    pub dimensions: Dimensions,
    pub current_location: Location,
    pub true_location: Location,
}

impl Piece {
    /// Rebuild the full encoded image, overflow concatenated after the
    /// primary chunk.
    pub fn full_image_src(&self) -> String {
        match &self.img_src_extra {
            Some(extra) => format!("{}{}", self.img_src, extra),
            None => self.img_src.clone(),
        }
    }

    pub fn is_home(&self) -> bool {
        self.current_location == self.true_location
    }
}
