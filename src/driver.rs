//! Scheduling loops that feed repaint opportunities to the engine.
//!
//! A driver calls [`SpriteEngine::on_tick`] once per opportunity and stops
//! as soon as the engine is paused.

use crate::{Rect, SpriteEngine};

/// Timestamps of a display refreshing at `refresh_hz`, starting at `start_ms`.
pub fn repaint_times(start_ms: f64, refresh_hz: f64) -> impl Iterator<Item = f64> {
    let period = 1000.0 / refresh_hz.max(1.0);
    (1u64..).map(move |n| start_ms + n as f64 * period)
}

/// Feed each opportunity to the engine until it pauses or the input runs out.
///
/// `on_render` receives the engine and the rectangle whenever a frame
/// advanced. Returns the number of ticks delivered.
///
/// ```rust
/// use sprite_core_view::driver::{drive, repaint_times};
/// use sprite_core_view::{ManualClock, ManualGrid, PlayerConfig, SpriteEngine};
///
/// let mut engine = SpriteEngine::new(PlayerConfig::default(), ManualClock::new(0.0)).unwrap();
/// engine.apply_manual_grid(ManualGrid::new(4, 4, 8, 8)).unwrap();
/// engine.set_fps(10);
/// engine.play();
///
/// let mut renders = 0;
/// let ticks = drive(&mut engine, repaint_times(0.0, 50.0).take(50), |_, _| renders += 1);
/// assert_eq!(ticks, 50);
/// assert_eq!(renders, 10);
/// ```
pub fn drive<I, F>(engine: &mut SpriteEngine, opportunities: I, mut on_render: F) -> usize
where
    I: IntoIterator<Item = f64>,
    F: FnMut(&SpriteEngine, Rect),
{
    let mut ticks = 0;
    for now in opportunities {
        if !engine.is_playing() {
            break;
        }
        ticks += 1;
        if let Some(rect) = engine.on_tick(now) {
            on_render(engine, rect);
        }
    }
    ticks
}

/// `requestAnimationFrame` driving for the browser.
#[cfg(feature = "web")]
pub mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::render::web::CanvasSurface;
    use crate::{SheetError, SheetResult, SpriteEngine};

    type FrameCallback = Closure<dyn FnMut(f64)>;

    /// Re-schedules itself once per animation frame while the engine plays.
    ///
    /// [`stop`](AnimationLoop::stop) pauses the engine and cancels the pending
    /// request, so no tick runs after it returns.
    pub struct AnimationLoop {
        engine: Rc<RefCell<SpriteEngine>>,
        surface: Rc<RefCell<CanvasSurface>>,
        pending: Rc<Cell<Option<i32>>>,
        callback: Rc<RefCell<Option<FrameCallback>>>,
    }

    impl AnimationLoop {
        pub fn new(engine: Rc<RefCell<SpriteEngine>>, surface: Rc<RefCell<CanvasSurface>>) -> Self {
            Self {
                engine,
                surface,
                pending: Rc::new(Cell::new(None)),
                callback: Rc::new(RefCell::new(None)),
            }
        }

        /// Start playback and the frame loop. No-op when already scheduled.
        pub fn start(&self) -> SheetResult<()> {
            self.engine.borrow_mut().play();
            if self.pending.get().is_some() {
                return Ok(());
            }

            let engine = Rc::clone(&self.engine);
            let surface = Rc::clone(&self.surface);
            let pending = Rc::clone(&self.pending);
            let callback = Rc::clone(&self.callback);

            let closure = Closure::wrap(Box::new(move |now: f64| {
                pending.set(None);
                let request = {
                    let mut engine = engine.borrow_mut();
                    if !engine.is_playing() {
                        return;
                    }
                    engine.on_tick(now)
                };

                if request.is_some() {
                    if let Err(err) = engine.borrow().render(&mut *surface.borrow_mut()) {
                        tracing::warn!(error = %err, "frame render failed");
                    }
                }

                if let Some(cb) = callback.borrow().as_ref() {
                    match request_frame(cb) {
                        Ok(id) => pending.set(Some(id)),
                        Err(err) => tracing::warn!(error = %err, "animation loop stopped"),
                    }
                }
            }) as Box<dyn FnMut(f64)>);

            let id = request_frame(&closure)?;
            self.pending.set(Some(id));
            *self.callback.borrow_mut() = Some(closure);
            Ok(())
        }

        /// Pause the engine and cancel the pending frame request.
        pub fn stop(&self) {
            self.engine.borrow_mut().pause();
            if let Some(id) = self.pending.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(id);
                }
            }
        }

        /// Render the current frame immediately (after a step or layout change).
        pub fn redraw(&self) -> SheetResult<bool> {
            self.engine.borrow().render(&mut *self.surface.borrow_mut())
        }

        #[inline]
        pub fn is_running(&self) -> bool {
            self.pending.get().is_some()
        }
    }

    fn request_frame(callback: &FrameCallback) -> SheetResult<i32> {
        web_sys::window()
            .ok_or_else(|| SheetError::surface("No window available"))?
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|_| SheetError::surface("Failed to request animation frame"))
    }
}
