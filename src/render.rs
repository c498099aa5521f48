//! Rendering a frame region of a sheet onto a destination surface.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::{Rect, SheetError, SheetInfo, SheetResult, SpriteSheet};

/// A platform-agnostic copy instruction.
///
/// Consumers interpret it for their backend: copy `source` from the sheet
/// and stretch it over `dest_width` x `dest_height` at the surface origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlitCommand {
    /// Region of the sheet to copy
    pub source: Rect,
    /// Destination width in pixels
    pub dest_width: u32,
    /// Destination height in pixels
    pub dest_height: u32,
}

/// Plan a blit of `rect` onto a `dest_width` x `dest_height` surface.
///
/// ## Example
///
/// ```rust
/// use sprite_core_view::{Rect, SheetInfo};
/// use sprite_core_view::render::plan_blit;
///
/// let sheet = SheetInfo { width: 1024, height: 512 };
/// let cmd = plan_blit(sheet, Rect::new(256, 0, 256, 256), 512, 512).unwrap();
/// assert_eq!(cmd.dest_width, 512);
///
/// // Regions outside the sheet are rejected
/// assert!(plan_blit(sheet, Rect::new(1000, 0, 256, 256), 512, 512).is_err());
/// ```
pub fn plan_blit(
    sheet: SheetInfo,
    rect: Rect,
    dest_width: u32,
    dest_height: u32,
) -> SheetResult<BlitCommand> {
    if !rect.fits_within(sheet.width, sheet.height) {
        return Err(SheetError::out_of_bounds(format!(
            "frame {}x{} at ({}, {}) exceeds the {}x{} sheet",
            rect.width, rect.height, rect.x, rect.y, sheet.width, sheet.height
        )));
    }
    Ok(BlitCommand {
        source: rect,
        dest_width,
        dest_height,
    })
}

/// Destination for rendered frames.
pub trait RenderSurface {
    /// Current `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Clear the whole surface.
    fn clear(&mut self);

    /// Execute a planned blit.
    fn draw(&mut self, sheet: &SpriteSheet, command: &BlitCommand) -> SheetResult<()>;
}

/// Clear `surface` and draw the `rect` region of `sheet`, scaled to fill it.
///
/// Returns `Ok(false)` without touching the surface when no sheet is loaded.
pub fn render<S: RenderSurface + ?Sized>(
    sheet: Option<&SpriteSheet>,
    rect: Rect,
    surface: &mut S,
) -> SheetResult<bool> {
    let Some(sheet) = sheet else {
        return Ok(false);
    };
    let (width, height) = surface.size();
    let command = plan_blit(sheet.info(), rect, width, height)?;

    surface.clear();
    surface.draw(sheet, &command)?;
    Ok(true)
}

/// In-memory RGBA surface using nearest-neighbour scaling.
#[derive(Clone, Debug)]
pub struct PixelSurface {
    image: RgbaImage,
}

impl PixelSurface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Resize, discarding the current contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl RenderSurface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw(&mut self, sheet: &SpriteSheet, command: &BlitCommand) -> SheetResult<()> {
        if command.dest_width == 0 || command.dest_height == 0 {
            return Ok(());
        }
        let src = command.source;
        let region =
            imageops::crop_imm(sheet.pixels(), src.x, src.y, src.width, src.height).to_image();
        let scaled = if (src.width, src.height) == (command.dest_width, command.dest_height) {
            region
        } else {
            imageops::resize(&region, command.dest_width, command.dest_height, FilterType::Nearest)
        };
        imageops::replace(&mut self.image, &scaled, 0, 0);
        Ok(())
    }
}

/// Web-specific rendering implementation.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::{Clamped, JsCast};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

    /// An HTML canvas used as the render destination.
    ///
    /// The sheet is uploaded once into an offscreen canvas and reused, so each
    /// frame is a single `drawImage` call. A new sheet id invalidates it.
    #[derive(Clone, Debug)]
    pub struct CanvasSurface {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        cached_sheet: Option<(u64, HtmlCanvasElement)>,
    }

    impl CanvasSurface {
        pub fn new(canvas: HtmlCanvasElement) -> SheetResult<Self> {
            let ctx = context_2d(&canvas)?;
            Ok(Self {
                canvas,
                ctx,
                cached_sheet: None,
            })
        }

        #[inline]
        pub fn canvas(&self) -> &HtmlCanvasElement {
            &self.canvas
        }

        /// Resize the canvas backing store.
        pub fn resize(&mut self, width: u32, height: u32) {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }

        fn sheet_canvas(&mut self, sheet: &SpriteSheet) -> SheetResult<HtmlCanvasElement> {
            if let Some((id, canvas)) = &self.cached_sheet {
                if *id == sheet.id() {
                    return Ok(canvas.clone());
                }
            }

            let canvas = upload_sheet(sheet)?;
            self.cached_sheet = Some((sheet.id(), canvas.clone()));
            Ok(canvas)
        }
    }

    impl RenderSurface for CanvasSurface {
        fn size(&self) -> (u32, u32) {
            (self.canvas.width(), self.canvas.height())
        }

        fn clear(&mut self) {
            let (w, h) = self.size();
            self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        }

        fn draw(&mut self, sheet: &SpriteSheet, command: &BlitCommand) -> SheetResult<()> {
            let source = self.sheet_canvas(sheet)?;
            let src = command.source;

            self.ctx.set_image_smoothing_enabled(false);
            self.ctx
                .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    &source,
                    src.x as f64,
                    src.y as f64,
                    src.width as f64,
                    src.height as f64,
                    0.0,
                    0.0,
                    command.dest_width as f64,
                    command.dest_height as f64,
                )
                .map_err(|_| SheetError::surface("Failed to draw frame"))
        }
    }

    fn context_2d(canvas: &HtmlCanvasElement) -> SheetResult<CanvasRenderingContext2d> {
        canvas
            .get_context("2d")
            .map_err(|_| SheetError::surface("Failed to get 2d context"))?
            .ok_or_else(|| SheetError::surface("No 2d context available"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SheetError::surface("Failed to cast to CanvasRenderingContext2d"))
    }

    /// Copy the decoded sheet into a newly created offscreen canvas.
    fn upload_sheet(sheet: &SpriteSheet) -> SheetResult<HtmlCanvasElement> {
        let window = web_sys::window().ok_or_else(|| SheetError::surface("No window available"))?;
        let document = window
            .document()
            .ok_or_else(|| SheetError::surface("No document available"))?;
        let canvas = document
            .create_element("canvas")
            .map_err(|_| SheetError::surface("Failed to create canvas element"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SheetError::surface("Failed to cast element to HtmlCanvasElement"))?;
        canvas.set_width(sheet.width());
        canvas.set_height(sheet.height());

        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(sheet.pixels().as_raw().as_slice()),
            sheet.width(),
            sheet.height(),
        )
        .map_err(|_| SheetError::unreadable("Sheet pixels rejected by ImageData"))?;
        context_2d(&canvas)?
            .put_image_data(&data, 0.0, 0.0)
            .map_err(|_| SheetError::surface("Failed to upload sheet pixels"))?;
        Ok(canvas)
    }
}
