//! Decoded sprite-sheet bitmaps.

use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;

use crate::{SheetError, SheetResult};

/// Image path used when no sheet is supplied.
pub const DEFAULT_SHEET_PATH: &str = "assets/sprite-sheet.png";
/// Frame count assumed for the default sheet.
pub const DEFAULT_TOTAL_FRAMES: u32 = 8;

static NEXT_SHEET_ID: AtomicU64 = AtomicU64::new(1);

/// Pixel dimensions of a loaded sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetInfo {
    pub width: u32,
    pub height: u32,
}

/// An immutable RGBA bitmap holding a grid of frames.
///
/// Each sheet gets a process-unique id so surfaces can cache per-sheet
/// resources and notice when a sheet is replaced.
#[derive(Clone)]
pub struct SpriteSheet {
    id: u64,
    pixels: RgbaImage,
}

impl SpriteSheet {
    /// Decode an encoded image (PNG, JPEG, GIF, WebP or BMP).
    ///
    /// ```rust
    /// use sprite_core_view::{SheetError, SpriteSheet};
    ///
    /// let err = SpriteSheet::decode(b"definitely not an image").unwrap_err();
    /// assert!(matches!(err, SheetError::UnreadableImage(_)));
    /// ```
    pub fn decode(bytes: &[u8]) -> SheetResult<Self> {
        if bytes.is_empty() {
            return Err(SheetError::unreadable("empty byte stream"));
        }
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| SheetError::unreadable(e.to_string()))?;
        let sheet = Self::from_rgba(decoded.to_rgba8());
        if sheet.width() == 0 || sheet.height() == 0 {
            return Err(SheetError::unreadable("image has no pixels"));
        }
        Ok(sheet)
    }

    /// Wrap an already decoded RGBA buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            id: NEXT_SHEET_ID.fetch_add(1, Ordering::Relaxed),
            pixels,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn info(&self) -> SheetInfo {
        SheetInfo {
            width: self.width(),
            height: self.height(),
        }
    }

    #[inline]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl std::fmt::Debug for SpriteSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteSheet")
            .field("id", &self.id)
            .field("dimensions", &format!("{}x{}", self.width(), self.height()))
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba};

    use super::*;

    /// Encode a sheet whose frames are filled with distinct colors.
    pub(crate) fn encoded_grid_png(columns: u32, rows: u32, frame_w: u32, frame_h: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(columns * frame_w, rows * frame_h, |x, y| {
            let index = (y / frame_h) * columns + x / frame_w;
            Rgba([(index * 30) as u8, 255 - (index * 30) as u8, 0, 255])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_png_dimensions() {
        let bytes = encoded_grid_png(4, 2, 8, 8);
        let sheet = SpriteSheet::decode(&bytes).unwrap();
        assert_eq!(sheet.info(), SheetInfo { width: 32, height: 16 });
        assert_eq!(sheet.pixels().get_pixel(9, 0), &Rgba([30, 225, 0, 255]));
    }

    #[test]
    fn decode_rejects_non_images() {
        assert!(matches!(
            SpriteSheet::decode(&[]),
            Err(SheetError::UnreadableImage(_))
        ));
        assert!(matches!(
            SpriteSheet::decode(b"GIF89a but truncated"),
            Err(SheetError::UnreadableImage(_))
        ));
    }

    #[test]
    fn sheets_get_distinct_ids() {
        let a = SpriteSheet::from_rgba(RgbaImage::new(1, 1));
        let b = SpriteSheet::from_rgba(RgbaImage::new(1, 1));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }
}
