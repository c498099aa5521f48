//! Display sizing for fitting a frame into a container.

/// Display sizing configuration and calculations.
///
/// Computes the destination size for a frame so that it fills as much of a
/// container as possible while keeping its aspect ratio.
#[derive(Clone, Debug)]
pub struct DisplaySizing {
    /// Padding to subtract from container dimensions
    pub padding: f64,
    /// Minimum allowed scale factor
    pub min_scale: f64,
    /// Maximum allowed scale factor
    pub max_scale: f64,
    /// Round scale down to a whole number when at least 1 (crisp pixel art)
    pub integer_scaling: bool,
}

impl Default for DisplaySizing {
    fn default() -> Self {
        Self {
            padding: 20.0,
            min_scale: 0.1,
            max_scale: 16.0,
            integer_scaling: false,
        }
    }
}

impl DisplaySizing {
    /// Create a new DisplaySizing with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate the scale factor that fits a frame into a container.
    ///
    /// ## Arguments
    ///
    /// * `frame_width` - Frame width in pixels
    /// * `frame_height` - Frame height in pixels
    /// * `container_width` - Available container width in pixels
    /// * `container_height` - Available container height in pixels
    ///
    /// ## Example
    ///
    /// ```rust
    /// use sprite_core_view::DisplaySizing;
    ///
    /// // A 256x256 frame in a 404x532 container (20px padding)
    /// let scale = DisplaySizing::default().scale(256, 256, 404.0, 532.0);
    /// assert_eq!(scale, 1.5);
    /// ```
    pub fn scale(
        &self,
        frame_width: u32,
        frame_height: u32,
        container_width: f64,
        container_height: f64,
    ) -> f64 {
        if frame_width == 0 || frame_height == 0 {
            return self.min_scale;
        }

        let available_width = container_width - self.padding;
        let available_height = container_height - self.padding;

        if available_width <= 0.0 || available_height <= 0.0 {
            return self.min_scale;
        }

        // Use the tighter of the two axes so both dimensions fit
        let scale = (available_width / frame_width as f64)
            .min(available_height / frame_height as f64);
        let scale = if self.integer_scaling && scale >= 1.0 {
            scale.floor()
        } else {
            scale
        };

        scale.max(self.min_scale).min(self.max_scale)
    }

    /// Destination size in pixels as `(width, height)`.
    pub fn fit(
        &self,
        frame_width: u32,
        frame_height: u32,
        container_width: f64,
        container_height: f64,
    ) -> (f64, f64) {
        let scale = self.scale(frame_width, frame_height, container_width, container_height);
        (frame_width as f64 * scale, frame_height as f64 * scale)
    }
}
