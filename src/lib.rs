//! # sprite-core-view
//!
//! Core sprite-sheet player for teaching frames and frame rate.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Decoding a sprite sheet and partitioning it into a grid of frames
//!   (auto-detected or manual, with offset and spacing)
//! - Driving the frame index at an adjustable 1-60 FPS with phase-preserving
//!   timing, while measuring the achieved tick rate
//! - Rendering the current frame to a surface (with optional web support)
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for data structures
//! - `toml` - Read [`PlayerConfig`] from TOML
//! - `web` - Enable canvas rendering, fetch loading and
//!   `requestAnimationFrame` driving
//!
//! ## Example
//!
//! ```rust,ignore
//! use sprite_core_view::{PixelSurface, SpriteEngine};
//!
//! let mut engine = SpriteEngine::with_defaults();
//! engine.load_sheet(&std::fs::read(engine.sheet_path())?)?;
//!
//! engine.set_fps(24);
//! engine.play();
//!
//! // Once per repaint opportunity
//! if engine.tick().is_some() {
//!     engine.render(&mut surface)?;
//! }
//! ```

mod clock;
mod config;
pub mod driver;
mod engine;
mod error;
mod grid;
pub mod loader;
mod playback;
pub mod render;
mod sheet;
mod sizing;

#[cfg(not(target_arch = "wasm32"))]
pub use clock::SystemClock;
pub use clock::{Clock, ManualClock};
pub use config::{PlayerConfig, DEFAULT_FPS};
pub use engine::SpriteEngine;
pub use error::{SheetError, SheetResult};
pub use grid::{apply_manual_grid, detect_layout, GridLayout, LayoutSummary, ManualGrid, Rect};
pub use loader::{load_sheet, LoadingPhase, SheetSource};
pub use playback::{FpsMeter, PlaybackController, PlaybackState, MAX_FPS, MIN_FPS};
pub use render::{BlitCommand, PixelSurface, RenderSurface};
pub use sheet::{SheetInfo, SpriteSheet, DEFAULT_SHEET_PATH, DEFAULT_TOTAL_FRAMES};
pub use sizing::DisplaySizing;

#[cfg(not(target_arch = "wasm32"))]
pub use loader::FsSheetSource;

#[cfg(feature = "web")]
pub use clock::PerformanceClock;
#[cfg(feature = "web")]
pub use driver::web::AnimationLoop;
#[cfg(feature = "web")]
pub use loader::web::FetchSheetSource;
#[cfg(feature = "web")]
pub use render::web::CanvasSurface;
