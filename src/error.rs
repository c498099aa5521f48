//! Error types shared by grid resolution, sheet loading and rendering.

/// Result alias used throughout the crate.
pub type SheetResult<T> = Result<T, SheetError>;

/// Failure kinds reported by the engine.
///
/// Every failure is local and non-fatal: the operation that produced it
/// leaves the previous layout, sheet and playback state untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// Requested frame count is below 1.
    #[error("invalid frame count: {0} (at least 1 frame is required)")]
    InvalidFrameCount(u32),

    /// A manual grid field is out of range.
    #[error("invalid grid parameters: {0}")]
    InvalidGridParameters(String),

    /// The byte stream could not be read or decoded as an image.
    #[error("unreadable image: {0}")]
    UnreadableImage(String),

    /// Frame rectangles would extend past the sheet bounds.
    #[error("layout out of bounds: {0}")]
    LayoutOutOfBounds(String),

    /// The operation needs sheet dimensions but no sheet is loaded yet.
    #[error("no sprite sheet loaded")]
    SheetNotLoaded,

    /// A configuration file could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The destination surface rejected a draw call.
    #[error("surface error: {0}")]
    Surface(String),
}

impl SheetError {
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGridParameters(msg.into())
    }

    pub fn unreadable(msg: impl Into<String>) -> Self {
        Self::UnreadableImage(msg.into())
    }

    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::LayoutOutOfBounds(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(SheetError::InvalidFrameCount(0)
            .to_string()
            .contains("invalid frame count: 0"));
        assert!(SheetError::invalid_grid("x")
            .to_string()
            .contains("invalid grid parameters:"));
        assert!(SheetError::unreadable("x")
            .to_string()
            .contains("unreadable image:"));
        assert!(SheetError::out_of_bounds("x")
            .to_string()
            .contains("layout out of bounds:"));
        assert!(SheetError::surface("x").to_string().contains("surface error:"));
        assert!(SheetError::invalid_config("x")
            .to_string()
            .contains("invalid config:"));
    }

    #[test]
    fn kinds_are_distinguishable() {
        assert_ne!(
            SheetError::invalid_grid("a"),
            SheetError::out_of_bounds("a")
        );
        assert_eq!(SheetError::SheetNotLoaded, SheetError::SheetNotLoaded);
    }
}
