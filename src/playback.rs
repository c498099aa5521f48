//! Playback controller: frame index, play/pause state and FPS timing.

/// Lowest selectable playback rate.
pub const MIN_FPS: u32 = 1;
/// Highest selectable playback rate.
pub const MAX_FPS: u32 = 60;

/// Length of one achieved-rate measurement window.
const MEASUREMENT_WINDOW_MS: f64 = 1000.0;

/// Current state of playback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PlaybackState {
    /// No frames advance; ticks are ignored
    #[default]
    Paused,
    /// Frames advance on ticks
    Playing {
        /// Phase anchor for the next advance, in milliseconds
        last_advance_ms: f64,
    },
}

/// Measures the rate at which the scheduler actually delivers ticks.
///
/// This counts scheduler invocations, not frame advances, so it reports the
/// achieved display rate independent of the target FPS.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FpsMeter {
    ticks: u32,
    window_start_ms: Option<f64>,
    measured: u32,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new measurement window at `now_ms`.
    pub fn restart(&mut self, now_ms: f64) {
        self.ticks = 0;
        self.window_start_ms = Some(now_ms);
    }

    /// Count one tick. Returns the new measurement when a window closes.
    pub fn record_tick(&mut self, now_ms: f64) -> Option<u32> {
        let Some(start) = self.window_start_ms else {
            self.restart(now_ms);
            return None;
        };

        self.ticks += 1;
        let elapsed = now_ms - start;
        if elapsed < MEASUREMENT_WINDOW_MS {
            return None;
        }

        self.measured = (self.ticks as f64 * 1000.0 / elapsed).round() as u32;
        self.restart(now_ms);
        Some(self.measured)
    }

    /// Last completed measurement (0 before the first window closes).
    #[inline]
    pub fn measured(&self) -> u32 {
        self.measured
    }
}

/// Platform-agnostic playback controller.
///
/// The controller never reads a clock. Callers pass timestamps in
/// milliseconds (e.g. `requestAnimationFrame` times) to [`play`] and
/// [`on_tick`], once per scheduling opportunity.
///
/// ## Example
///
/// ```rust
/// use sprite_core_view::PlaybackController;
///
/// let mut controller = PlaybackController::new(1); // 1 FPS
/// controller.set_frame_count(8);
/// controller.play(0.0);
///
/// assert!(!controller.on_tick(16.0));
/// assert!(controller.on_tick(1001.0));
/// assert!(!controller.on_tick(1990.0));
/// assert_eq!(controller.current_frame(), 1);
/// ```
///
/// [`play`]: PlaybackController::play
/// [`on_tick`]: PlaybackController::on_tick
#[derive(Clone, Debug)]
pub struct PlaybackController {
    /// Current frame index
    current_frame: usize,
    /// Total number of frames
    frame_count: usize,
    /// Target frames per second
    fps: u32,
    /// Current playback state
    state: PlaybackState,
    /// Achieved tick rate
    meter: FpsMeter,
}

impl PlaybackController {
    /// Create a paused controller with the given target FPS (clamped).
    pub fn new(fps: u32) -> Self {
        Self {
            current_frame: 0,
            frame_count: 0,
            fps: clamp_fps(fps),
            state: PlaybackState::Paused,
            meter: FpsMeter::new(),
        }
    }

    /// Set the total number of frames.
    pub fn set_frame_count(&mut self, count: usize) {
        self.frame_count = count;
        // Clamp current frame to valid range
        if count == 0 {
            self.current_frame = 0;
        } else if self.current_frame >= count {
            self.current_frame = count - 1;
        }
    }

    /// Get the total number of frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Set the target FPS, clamped into `[MIN_FPS, MAX_FPS]`.
    ///
    /// Takes effect on the next tick; the phase anchor is kept.
    pub fn set_fps(&mut self, fps: u32) -> u32 {
        self.fps = clamp_fps(fps);
        self.fps
    }

    /// Get the target FPS.
    #[inline]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Milliseconds between frame advances.
    #[inline]
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.fps as f64
    }

    /// Start playback, anchoring timing at `now_ms`. No-op while playing.
    pub fn play(&mut self, now_ms: f64) {
        if self.is_playing() {
            return;
        }
        self.state = PlaybackState::Playing {
            last_advance_ms: now_ms,
        };
        self.meter.restart(now_ms);
    }

    /// Pause playback. No-op while paused.
    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Toggle play/pause.
    pub fn toggle(&mut self, now_ms: f64) {
        match self.state {
            PlaybackState::Playing { .. } => self.pause(),
            PlaybackState::Paused => self.play(now_ms),
        }
    }

    /// Get the current playback state.
    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if playback is running.
    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    /// Get the current frame index.
    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Set the current frame index.
    ///
    /// The frame will be clamped to the valid range.
    pub fn set_current_frame(&mut self, frame: usize) {
        if self.frame_count == 0 {
            self.current_frame = 0;
            return;
        }
        self.current_frame = frame.min(self.frame_count - 1);
    }

    /// Achieved tick rate over the last closed measurement window.
    #[inline]
    pub fn measured_fps(&self) -> u32 {
        self.meter.measured()
    }

    /// Handle one scheduling opportunity.
    ///
    /// Returns `true` when the frame advanced and should be rendered. At most
    /// one frame advances per tick. The anchor moves to
    /// `now - (delta % interval)` so jitter does not accumulate as drift.
    pub fn on_tick(&mut self, now_ms: f64) -> bool {
        let PlaybackState::Playing { last_advance_ms } = self.state else {
            return false;
        };
        self.meter.record_tick(now_ms);

        let interval = self.frame_interval_ms();
        let delta = now_ms - last_advance_ms;
        if delta < interval {
            return false;
        }

        self.advance();
        self.state = PlaybackState::Playing {
            last_advance_ms: now_ms - delta % interval,
        };
        true
    }

    /// Step forward one frame, wrapping at the end.
    ///
    /// Does not change play state. Returns `false` when there are no frames.
    pub fn step_forward(&mut self) -> bool {
        if self.frame_count == 0 {
            return false;
        }
        self.advance();
        true
    }

    /// Step backward one frame, wrapping at the start.
    ///
    /// Does not change play state. Returns `false` when there are no frames.
    pub fn step_backward(&mut self) -> bool {
        if self.frame_count == 0 {
            return false;
        }
        self.current_frame = if self.current_frame == 0 {
            self.frame_count - 1
        } else {
            self.current_frame - 1
        };
        true
    }

    /// Reset to the first frame, paused.
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.state = PlaybackState::Paused;
        self.meter = FpsMeter::new();
    }

    fn advance(&mut self) {
        if self.frame_count > 0 {
            self.current_frame = (self.current_frame + 1) % self.frame_count;
        }
    }
}

fn clamp_fps(fps: u32) -> u32 {
    fps.clamp(MIN_FPS, MAX_FPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(fps: u32, frames: usize) -> PlaybackController {
        let mut ctrl = PlaybackController::new(fps);
        ctrl.set_frame_count(frames);
        ctrl.play(0.0);
        ctrl
    }

    #[test]
    fn test_basic_playback() {
        let mut ctrl = PlaybackController::new(10);
        ctrl.set_frame_count(8);

        assert_eq!(ctrl.state(), PlaybackState::Paused);
        assert_eq!(ctrl.current_frame(), 0);

        ctrl.play(0.0);
        assert!(ctrl.is_playing());

        // 100ms interval: advances at 100, 200, 300
        for t in [50.0, 100.0, 150.0, 200.0, 300.0] {
            ctrl.on_tick(t);
        }
        assert_eq!(ctrl.current_frame(), 3);

        ctrl.pause();
        assert_eq!(ctrl.state(), PlaybackState::Paused);
        assert!(!ctrl.on_tick(1000.0));
        assert_eq!(ctrl.current_frame(), 3);
    }

    #[test]
    fn test_phase_preserving_advance() {
        let mut ctrl = playing(1, 8);

        assert!(!ctrl.on_tick(0.0));
        assert!(!ctrl.on_tick(16.0));
        assert!(ctrl.on_tick(1001.0));
        assert_eq!(
            ctrl.state(),
            PlaybackState::Playing {
                last_advance_ms: 1000.0
            }
        );
        assert!(!ctrl.on_tick(1990.0));
        assert_eq!(ctrl.current_frame(), 1);

        // Next advance is anchored near 2000, not 2001
        assert!(ctrl.on_tick(2000.0));
        assert_eq!(ctrl.current_frame(), 2);
    }

    #[test]
    fn test_single_step_catch_up() {
        let mut ctrl = playing(10, 8);
        // Five intervals elapsed, still only one advance
        assert!(ctrl.on_tick(530.0));
        assert_eq!(ctrl.current_frame(), 1);
        assert_eq!(
            ctrl.state(),
            PlaybackState::Playing {
                last_advance_ms: 500.0
            }
        );
    }

    #[test]
    fn test_wraps_during_playback() {
        let mut ctrl = playing(60, 3);
        let interval = ctrl.frame_interval_ms();
        for i in 1..=4 {
            assert!(ctrl.on_tick(interval * i as f64 + 0.5));
        }
        assert_eq!(ctrl.current_frame(), 1);
    }

    #[test]
    fn test_fps_clamping() {
        let mut ctrl = PlaybackController::new(0);
        assert_eq!(ctrl.fps(), 1);
        assert_eq!(ctrl.set_fps(120), 60);
        assert_eq!(ctrl.set_fps(0), 1);
        assert_eq!(ctrl.set_fps(24), 24);
        assert!((ctrl.frame_interval_ms() - 41.666).abs() < 0.01);
    }

    #[test]
    fn test_set_fps_keeps_anchor() {
        let mut ctrl = playing(1, 8);
        ctrl.on_tick(400.0);
        ctrl.set_fps(2);
        assert_eq!(
            ctrl.state(),
            PlaybackState::Playing {
                last_advance_ms: 0.0
            }
        );
        // New 500ms interval applies on the next tick
        assert!(ctrl.on_tick(500.0));
    }

    #[test]
    fn test_play_twice_keeps_anchor() {
        let mut ctrl = playing(1, 8);
        ctrl.play(700.0);
        assert!(ctrl.on_tick(1000.0));
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut ctrl = playing(12, 8);
        ctrl.on_tick(100.0);
        ctrl.pause();
        let once = ctrl.clone();
        ctrl.pause();
        assert_eq!(ctrl.state(), once.state());
        assert_eq!(ctrl.current_frame(), once.current_frame());
        assert_eq!(ctrl.meter, once.meter);
    }

    #[test]
    fn test_step_forward_backward() {
        let mut ctrl = PlaybackController::new(12);
        ctrl.set_frame_count(10);
        ctrl.set_current_frame(5);

        assert!(ctrl.step_forward());
        assert_eq!(ctrl.current_frame(), 6);
        assert_eq!(ctrl.state(), PlaybackState::Paused);

        assert!(ctrl.step_backward());
        assert_eq!(ctrl.current_frame(), 5);

        // Test wrap at end
        ctrl.set_current_frame(9);
        ctrl.step_forward();
        assert_eq!(ctrl.current_frame(), 0);

        // Test wrap at start
        ctrl.step_backward();
        assert_eq!(ctrl.current_frame(), 9);
    }

    #[test]
    fn test_step_without_frames() {
        let mut ctrl = PlaybackController::new(12);
        assert!(!ctrl.step_forward());
        assert!(!ctrl.step_backward());
        assert_eq!(ctrl.current_frame(), 0);
    }

    #[test]
    fn test_frame_count_change_clamps() {
        let mut ctrl = PlaybackController::new(12);
        ctrl.set_frame_count(10);
        ctrl.set_current_frame(8);
        ctrl.set_frame_count(4);
        assert_eq!(ctrl.current_frame(), 3);
        ctrl.set_frame_count(20);
        assert_eq!(ctrl.current_frame(), 3);
        ctrl.set_frame_count(0);
        assert_eq!(ctrl.current_frame(), 0);
    }

    #[test]
    fn test_measured_fps_counts_ticks() {
        let mut ctrl = playing(1, 8);
        assert_eq!(ctrl.measured_fps(), 0);

        // 50 ticks over 1000ms, only one of which advances a frame
        for i in 1..=50 {
            ctrl.on_tick(i as f64 * 20.0);
        }
        assert_eq!(ctrl.measured_fps(), 50);
        assert_eq!(ctrl.current_frame(), 1);
    }

    #[test]
    fn test_meter_window() {
        let mut meter = FpsMeter::new();
        assert_eq!(meter.record_tick(0.0), None);
        for i in 1..25 {
            assert_eq!(meter.record_tick(i as f64 * 40.0), None);
        }
        // 25 ticks in 1000ms
        assert_eq!(meter.record_tick(1000.0), Some(25));
        assert_eq!(meter.measured(), 25);
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut ctrl = PlaybackController::new(12);
        ctrl.set_frame_count(4);
        ctrl.toggle(0.0);
        assert!(ctrl.is_playing());
        ctrl.toggle(10.0);
        assert!(!ctrl.is_playing());

        ctrl.set_current_frame(2);
        ctrl.reset();
        assert_eq!(ctrl.current_frame(), 0);
        assert_eq!(ctrl.state(), PlaybackState::Paused);
    }
}
