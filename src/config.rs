use crate::sheet::{DEFAULT_SHEET_PATH, DEFAULT_TOTAL_FRAMES};
use crate::{grid, ManualGrid, SheetError, SheetResult};

/// Playback rate used when none is configured.
pub const DEFAULT_FPS: u32 = 12;

/// Player settings, typically read from a `player.toml` file.
///
/// All fields have defaults, so a partial file is fine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerConfig {
    pub sheet_path: String,
    pub total_frames: u32,
    pub fps: u32,
    /// Applied after every sheet load instead of auto-detection
    pub grid: Option<ManualGrid>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sheet_path: DEFAULT_SHEET_PATH.to_string(),
            total_frames: DEFAULT_TOTAL_FRAMES,
            fps: DEFAULT_FPS,
            grid: None,
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a TOML string into `PlayerConfig`.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> SheetResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| SheetError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject structurally invalid settings.
    ///
    /// `fps` is not checked here; playback clamps it into range.
    pub fn validate(&self) -> SheetResult<()> {
        if self.total_frames < 1 {
            return Err(SheetError::InvalidFrameCount(self.total_frames));
        }
        if let Some(grid) = &self.grid {
            grid::apply_manual_grid(grid)?;
        }
        Ok(())
    }
}
