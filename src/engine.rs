//! The engine facade owned by the UI layer.

use crate::grid;
use crate::loader::LoadingPhase;
use crate::render::{self, RenderSurface};
use crate::{
    Clock, DisplaySizing, GridLayout, LayoutSummary, ManualGrid, PlaybackController,
    PlaybackState, PlayerConfig, Rect, SheetError, SheetInfo, SheetResult, SpriteSheet,
};

/// Sprite-sheet player: grid resolution plus timed playback.
///
/// The UI constructs one engine and drives it through this small operation
/// set. Layouts are swapped as whole values, and every failed operation
/// leaves the previous sheet, layout and playback state untouched.
///
/// ## Example
///
/// ```rust
/// use std::rc::Rc;
/// use sprite_core_view::{ManualClock, ManualGrid, PlayerConfig, SpriteEngine};
///
/// let clock = Rc::new(ManualClock::new(0.0));
/// let mut engine = SpriteEngine::new(PlayerConfig::default(), Rc::clone(&clock)).unwrap();
/// engine.apply_manual_grid(ManualGrid::new(6, 3, 100, 100)).unwrap();
///
/// engine.set_fps(1);
/// engine.play();
/// clock.set(1001.0);
/// let rect = engine.tick().unwrap();
/// assert_eq!((rect.x, rect.y), (100, 0));
/// ```
pub struct SpriteEngine {
    config: PlayerConfig,
    clock: Box<dyn Clock>,
    sheet: Option<SpriteSheet>,
    phase: LoadingPhase,
    layout: Option<GridLayout>,
    /// Manual geometry that survives sheet reloads until auto-detection is requested
    manual_grid: Option<ManualGrid>,
    total_frames: u32,
    playback: PlaybackController,
    sizing: DisplaySizing,
}

impl SpriteEngine {
    /// Create an engine with no sheet loaded yet.
    ///
    /// Fails with the config's validation error, e.g. `InvalidFrameCount`
    /// for `total_frames = 0`.
    pub fn new(config: PlayerConfig, clock: impl Clock + 'static) -> SheetResult<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: PlayerConfig, clock: impl Clock + 'static) -> Self {
        let mut playback = PlaybackController::new(config.fps);
        playback.set_frame_count(config.total_frames as usize);
        Self {
            manual_grid: config.grid,
            total_frames: config.total_frames,
            config,
            clock: Box::new(clock),
            sheet: None,
            phase: LoadingPhase::Idle,
            layout: None,
            playback,
            sizing: DisplaySizing::default(),
        }
    }

    /// Engine with default settings and the system clock.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_defaults() -> Self {
        Self::build(PlayerConfig::default(), crate::SystemClock::new())
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Path of the sheet to load at startup.
    pub fn sheet_path(&self) -> &str {
        &self.config.sheet_path
    }

    pub fn set_display_sizing(&mut self, sizing: DisplaySizing) {
        self.sizing = sizing;
    }

    // Playback commands

    /// Set the target FPS, clamped to 1..=60. Returns the applied value.
    pub fn set_fps(&mut self, fps: u32) -> u32 {
        let applied = self.playback.set_fps(fps);
        if applied != fps {
            tracing::debug!(requested = fps, applied, "fps clamped");
        }
        applied
    }

    pub fn play(&mut self) {
        let now = self.clock.now_ms();
        self.playback.play(now);
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    pub fn toggle(&mut self) {
        let now = self.clock.now_ms();
        self.playback.toggle(now);
    }

    /// Advance one frame. Returns the rectangle to render, if a layout exists.
    ///
    /// Play state is not changed; the UI pauses first when it wants to.
    pub fn step_forward(&mut self) -> Option<Rect> {
        if self.playback.step_forward() {
            self.current_rect()
        } else {
            None
        }
    }

    /// Go back one frame. Returns the rectangle to render, if a layout exists.
    pub fn step_backward(&mut self) -> Option<Rect> {
        if self.playback.step_backward() {
            self.current_rect()
        } else {
            None
        }
    }

    /// Handle one scheduling opportunity at `now_ms`.
    ///
    /// Returns the rectangle to render when the frame advanced.
    pub fn on_tick(&mut self, now_ms: f64) -> Option<Rect> {
        if self.playback.on_tick(now_ms) {
            self.current_rect()
        } else {
            None
        }
    }

    /// [`on_tick`](Self::on_tick) at the engine clock's current time.
    pub fn tick(&mut self) -> Option<Rect> {
        let now = self.clock.now_ms();
        self.on_tick(now)
    }

    // Sheet loading

    /// Mark an asynchronous load as started.
    pub fn begin_load(&mut self) {
        self.phase = LoadingPhase::Loading;
    }

    /// Install the outcome of an asynchronous load.
    pub fn finish_load(&mut self, result: SheetResult<SpriteSheet>) -> SheetResult<SheetInfo> {
        match result.and_then(|sheet| self.install_sheet(sheet)) {
            Ok(info) => Ok(info),
            Err(err) => {
                tracing::warn!(error = %err, "sprite sheet load failed");
                self.phase = LoadingPhase::Failed;
                Err(err)
            }
        }
    }

    /// Decode and install a sheet from encoded image bytes.
    pub fn load_sheet(&mut self, bytes: &[u8]) -> SheetResult<SheetInfo> {
        self.begin_load();
        self.finish_load(SpriteSheet::decode(bytes))
    }

    /// Replace the sheet and resolve a layout for it.
    ///
    /// An active manual grid is kept when it fits the new sheet; otherwise
    /// the layout is auto-detected. When no layout fits, nothing changes.
    fn install_sheet(&mut self, sheet: SpriteSheet) -> SheetResult<SheetInfo> {
        let info = sheet.info();
        let manual = self.manual_grid.and_then(|grid| {
            let layout = grid::apply_manual_grid(&grid).and_then(|layout| {
                layout.check_bounds(info.width, info.height)?;
                Ok(layout)
            });
            match layout {
                Ok(layout) => Some(layout),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "manual grid does not fit new sheet, detecting instead"
                    );
                    None
                }
            }
        });
        let layout = match manual {
            Some(layout) => layout,
            None => grid::detect_layout(info.width, info.height, self.total_frames)?,
        };
        if manual.is_none() {
            self.manual_grid = None;
        }

        tracing::info!(width = info.width, height = info.height, "sprite sheet installed");
        self.sheet = Some(sheet);
        self.phase = LoadingPhase::Ready;
        self.install_layout(layout);
        Ok(info)
    }

    // Grid resolution

    /// Auto-detect a layout for the current frame count.
    pub fn detect_layout(&mut self) -> SheetResult<GridLayout> {
        self.detect_layout_for(self.total_frames)
    }

    /// Auto-detect a layout for `total_frames` frames.
    pub fn detect_layout_for(&mut self, total_frames: u32) -> SheetResult<GridLayout> {
        if total_frames < 1 {
            return Err(SheetError::InvalidFrameCount(total_frames));
        }
        let info = self.sheet_info().ok_or(SheetError::SheetNotLoaded)?;
        let layout = grid::detect_layout(info.width, info.height, total_frames)?;
        self.manual_grid = None;
        self.install_layout(layout);
        Ok(layout)
    }

    /// Apply explicit grid geometry.
    ///
    /// Bounds are checked against the loaded sheet; without a sheet they are
    /// checked when one is installed.
    pub fn apply_manual_grid(&mut self, grid: ManualGrid) -> SheetResult<GridLayout> {
        let layout = grid::apply_manual_grid(&grid)?;
        if let Some(info) = self.sheet_info() {
            layout.check_bounds(info.width, info.height)?;
        }
        self.manual_grid = Some(grid);
        self.install_layout(layout);
        Ok(layout)
    }

    /// Change the number of frames, re-detecting the layout when a sheet is loaded.
    pub fn set_total_frames(&mut self, total_frames: u32) -> SheetResult<()> {
        if total_frames < 1 {
            return Err(SheetError::InvalidFrameCount(total_frames));
        }
        if self.sheet.is_some() {
            return self.detect_layout_for(total_frames).map(|_| ());
        }
        self.total_frames = total_frames;
        self.playback.set_frame_count(total_frames as usize);
        Ok(())
    }

    fn install_layout(&mut self, layout: GridLayout) {
        tracing::info!(
            columns = layout.columns,
            rows = layout.rows,
            frame_width = layout.frame_width,
            frame_height = layout.frame_height,
            total_frames = layout.total_frames,
            "grid layout installed"
        );
        self.layout = Some(layout);
        self.total_frames = layout.total_frames;
        self.playback.set_frame_count(layout.total_frames as usize);
    }

    // Rendering

    /// Source rectangle of the current frame.
    pub fn current_rect(&self) -> Option<Rect> {
        self.layout
            .map(|layout| layout.frame_rect(self.playback.current_frame()))
    }

    /// Draw the current frame onto `surface`.
    ///
    /// Returns `Ok(false)` and draws nothing before a sheet and layout exist.
    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> SheetResult<bool> {
        match self.current_rect() {
            Some(rect) => render::render(self.sheet.as_ref(), rect, surface),
            None => Ok(false),
        }
    }

    /// Destination size that fits the current frame into a container.
    pub fn display_size(&self, container_width: f64, container_height: f64) -> Option<(f64, f64)> {
        self.layout.map(|layout| {
            self.sizing
                .fit(layout.frame_width, layout.frame_height, container_width, container_height)
        })
    }

    // Observers

    pub fn current_frame_index(&self) -> usize {
        self.playback.current_frame()
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn measured_fps(&self) -> u32 {
        self.playback.measured_fps()
    }

    pub fn fps(&self) -> u32 {
        self.playback.fps()
    }

    pub fn frame_interval_ms(&self) -> f64 {
        self.playback.frame_interval_ms()
    }

    pub fn layout(&self) -> Option<GridLayout> {
        self.layout
    }

    pub fn layout_summary(&self) -> Option<LayoutSummary> {
        self.layout.map(|layout| layout.summary())
    }

    pub fn sheet(&self) -> Option<&SpriteSheet> {
        self.sheet.as_ref()
    }

    pub fn sheet_info(&self) -> Option<SheetInfo> {
        self.sheet.as_ref().map(SpriteSheet::info)
    }

    pub fn loading_phase(&self) -> LoadingPhase {
        self.phase
    }
}
