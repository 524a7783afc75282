//! Tween clock
//!
//! Drives every active tween at a fixed frame rate. Tweens register
//! themselves when started and leave the active set when they complete or
//! are stopped. One clock per process is the norm ([`Clock::global`]), but
//! clocks are plain values so tests and embedders can create their own.
//!
//! A clock either ticks itself on a background timer thread
//! ([`TickMode::Background`]) or waits for the host to call [`Clock::tick`]
//! from its own frame loop ([`TickMode::Manual`]).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::easing::{ElasticParams, EasingFn, EasingLibrary};
use crate::error::{Result, TweenError};
use crate::registry::TweenRegistry;
use crate::target::TargetId;
use crate::tween::{Tween, TweenId};

/// Frame rate used when none is configured
pub const DEFAULT_FPS: u32 = 30;

// ============================================================================
// Global Clock
// ============================================================================

/// Process-wide clock, created on first use
static GLOBAL_CLOCK: OnceLock<Clock> = OnceLock::new();

/// Install `clock` as the process-wide clock.
///
/// Must happen before anything touches [`Clock::global`]; afterwards this
/// returns [`TweenError::ClockAlreadyInitialized`].
pub fn set_global_clock(clock: Clock) -> Result<()> {
    GLOBAL_CLOCK
        .set(clock)
        .map_err(|_| TweenError::ClockAlreadyInitialized)
}

/// The process-wide clock, if it exists yet
pub fn try_global_clock() -> Option<&'static Clock> {
    GLOBAL_CLOCK.get()
}

/// Check if the process-wide clock has been created
pub fn is_clock_initialized() -> bool {
    GLOBAL_CLOCK.get().is_some()
}

// ============================================================================
// Configuration
// ============================================================================

/// How a clock's ticks are produced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TickMode {
    /// A timer thread ticks the clock while it is running
    #[default]
    Background,
    /// The host calls [`Clock::tick`] itself
    Manual,
}

/// Clock construction options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    pub fps: u32,
    pub mode: TickMode,
}

impl ClockConfig {
    /// A manually ticked clock at the default frame rate
    pub fn manual() -> Self {
        Self {
            mode: TickMode::Manual,
            ..Self::default()
        }
    }

    pub fn with_fps(mut self, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(TweenError::InvalidFrameRate(fps));
        }
        self.fps = fps;
        Ok(self)
    }

    pub fn with_mode(mut self, mode: TickMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            mode: TickMode::Background,
        }
    }
}

// ============================================================================
// Clock
// ============================================================================

struct ClockState {
    /// Tweens to advance, in start order
    active: IndexMap<TweenId, Tween>,
    /// Registry-managed tweens, one per target
    managed: IndexMap<TargetId, Tween>,
    /// Frame rate for the next start
    configured_fps: u32,
    /// Frame rate fixed at start, `None` while stopped
    running_fps: Option<u32>,
    ticks: u64,
}

struct Timer {
    stop_flag: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

struct ClockShared {
    state: Mutex<ClockState>,
    easing: RwLock<EasingLibrary>,
    mode: TickMode,
    timer: Mutex<Option<Timer>>,
}

impl Drop for ClockShared {
    fn drop(&mut self) {
        // The timer thread only holds a weak reference; let it exit on its own
        if let Ok(timer) = self.timer.get_mut() {
            if let Some(timer) = timer.take() {
                timer.stop_flag.store(true, Ordering::Relaxed);
            }
        }
    }
}

/// The scheduler that ticks every active tween.
///
/// Cloning a `Clock` yields another owner of the same clock. Tweens and
/// registries hold a [`ClockHandle`], which doesn't keep the clock alive.
///
/// ```
/// use blinc_tween::{Clock, ClockConfig};
///
/// let clock = Clock::new(ClockConfig::manual().with_fps(60).unwrap());
/// assert!(!clock.is_running());
/// clock.start();
/// assert_eq!(clock.frame_interval_ms(), Some(1000.0 / 60.0));
/// clock.stop_all();
/// assert!(!clock.is_running());
/// ```
#[derive(Clone)]
pub struct Clock {
    shared: Arc<ClockShared>,
}

impl Clock {
    pub fn new(config: ClockConfig) -> Self {
        let fps = if config.fps == 0 {
            tracing::warn!("Clock configured with 0 fps, using {}", DEFAULT_FPS);
            DEFAULT_FPS
        } else {
            config.fps
        };

        Self {
            shared: Arc::new(ClockShared {
                state: Mutex::new(ClockState {
                    active: IndexMap::new(),
                    managed: IndexMap::new(),
                    configured_fps: fps,
                    running_fps: None,
                    ticks: 0,
                }),
                easing: RwLock::new(EasingLibrary::new()),
                mode: config.mode,
                timer: Mutex::new(None),
            }),
        }
    }

    /// The process-wide clock, created with [`ClockConfig::default`] on first use
    pub fn global() -> &'static Clock {
        GLOBAL_CLOCK.get_or_init(|| Clock::new(ClockConfig::default()))
    }

    /// A weak handle for tweens and registries
    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Managed-tween view of this clock
    pub fn registry(&self) -> TweenRegistry {
        TweenRegistry::new(self.handle())
    }

    pub fn mode(&self) -> TickMode {
        self.shared.mode
    }

    // =========================================================================
    // Frame rate
    // =========================================================================

    /// Set the frame rate.
    ///
    /// A running clock keeps its current rate; the new one applies from the
    /// next start after [`stop_all`](Self::stop_all).
    pub fn set_fps(&self, fps: u32) -> Result<()> {
        if fps == 0 {
            return Err(TweenError::InvalidFrameRate(fps));
        }
        let mut state = self.shared.state.lock().unwrap();
        state.configured_fps = fps;
        if state.running_fps.is_some() {
            tracing::debug!("Tween clock fps set to {} (applies after restart)", fps);
        }
        Ok(())
    }

    /// Frame rate in effect: the running rate, or the configured one while stopped
    pub fn fps(&self) -> u32 {
        let state = self.shared.state.lock().unwrap();
        state.running_fps.unwrap_or(state.configured_fps)
    }

    /// Milliseconds per tick while running
    pub fn frame_interval_ms(&self) -> Option<f64> {
        self.shared
            .state
            .lock()
            .unwrap()
            .running_fps
            .map(|fps| 1000.0 / fps as f64)
    }

    // =========================================================================
    // Easing
    // =========================================================================

    /// Register a custom easing curve for tweens on this clock
    pub fn register_easing<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(f64, f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.shared.easing.write().unwrap().register(name, f);
    }

    pub fn has_easing(&self, name: &str) -> bool {
        self.shared.easing.read().unwrap().contains(name)
    }

    pub(crate) fn resolve_easing(&self, name: &str, elastic: Option<ElasticParams>) -> EasingFn {
        self.shared.easing.read().unwrap().resolve_with(name, elastic)
    }

    // =========================================================================
    // Running state
    // =========================================================================

    /// Start ticking. No-op if already running.
    pub fn start(&self) {
        self.ensure_running();
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().unwrap().running_fps.is_some()
    }

    /// Start if needed and return the frame rate fixed for this run
    pub(crate) fn ensure_running(&self) -> u32 {
        let fps = {
            let mut state = self.shared.state.lock().unwrap();
            if let Some(fps) = state.running_fps {
                return fps;
            }
            let fps = state.configured_fps;
            state.running_fps = Some(fps);
            fps
        };

        tracing::debug!("Tween clock started at {} fps ({:?})", fps, self.shared.mode);
        if self.shared.mode == TickMode::Background {
            self.start_timer(fps);
        }
        fps
    }

    fn start_timer(&self, fps: u32) {
        let weak = Arc::downgrade(&self.shared);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_flag);
        let frame_duration = Duration::from_secs_f64(1.0 / fps as f64);

        let spawned = thread::Builder::new()
            .name("blinc-tween-clock".to_string())
            .spawn(move || {
                let mut next_frame = Instant::now() + frame_duration;
                while !thread_stop.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    if next_frame > now {
                        thread::sleep(next_frame - now);
                    }
                    next_frame += frame_duration;

                    if thread_stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let Some(shared) = weak.upgrade() else {
                        break;
                    };
                    Clock { shared }.tick();
                }
            });

        match spawned {
            Ok(handle) => {
                *self.shared.timer.lock().unwrap() = Some(Timer { stop_flag, handle });
            }
            Err(err) => {
                tracing::warn!("Failed to spawn tween clock thread: {}", err);
            }
        }
    }

    /// Stop every managed tween and tear the timer down.
    ///
    /// Unmanaged tweens are left in the active set; they resume when the
    /// clock next starts.
    pub fn stop_all(&self) {
        while let Some(tween) = self.pop_managed() {
            tween.stop();
        }
        self.teardown();
    }

    fn teardown(&self) {
        let was_running = self.shared.state.lock().unwrap().running_fps.take().is_some();

        let timer = self.shared.timer.lock().unwrap().take();
        if let Some(timer) = timer {
            timer.stop_flag.store(true, Ordering::Relaxed);
            // stop_all may be called from a callback on the timer thread itself
            if timer.handle.thread().id() != thread::current().id() {
                let _ = timer.handle.join();
            }
        }

        if was_running {
            tracing::debug!("Tween clock stopped");
        }
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Advance every active tween by one frame.
    ///
    /// Tweens are visited from most to least recently started. Tweens that
    /// leave the active set during the tick are skipped; tweens started during
    /// the tick first advance on the next one. Does nothing while stopped.
    /// Returns the number of tweens advanced.
    pub fn tick(&self) -> usize {
        let snapshot: Vec<Tween> = {
            let mut state = self.shared.state.lock().unwrap();
            if state.running_fps.is_none() {
                return 0;
            }
            state.ticks += 1;
            state.active.values().cloned().collect()
        };

        let mut advanced = 0;
        for tween in snapshot.iter().rev() {
            if !self.is_active(tween.id()) {
                continue;
            }
            tween.advance();
            advanced += 1;
        }

        tracing::trace!("Tween clock tick: advanced {} tweens", advanced);
        advanced
    }

    /// Number of ticks since the clock was created
    pub fn tick_count(&self) -> u64 {
        self.shared.state.lock().unwrap().ticks
    }

    // =========================================================================
    // Active set
    // =========================================================================

    pub fn active_count(&self) -> usize {
        self.shared.state.lock().unwrap().active.len()
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.shared.state.lock().unwrap().active.contains_key(&id)
    }

    /// Snapshot of the active tweens, in start order
    pub fn active_tweens(&self) -> Vec<Tween> {
        self.shared
            .state
            .lock()
            .unwrap()
            .active
            .values()
            .cloned()
            .collect()
    }

    pub(crate) fn activate(&self, tween: Tween) {
        self.shared
            .state
            .lock()
            .unwrap()
            .active
            .insert(tween.id(), tween);
    }

    pub(crate) fn deactivate(&self, id: TweenId) -> bool {
        let removed = self.shared.state.lock().unwrap().active.shift_remove(&id);
        removed.is_some()
    }

    // =========================================================================
    // Managed tweens (storage for TweenRegistry)
    // =========================================================================

    pub(crate) fn managed_tween(&self, target: TargetId) -> Option<Tween> {
        self.shared.state.lock().unwrap().managed.get(&target).cloned()
    }

    pub(crate) fn managed_count(&self) -> usize {
        self.shared.state.lock().unwrap().managed.len()
    }

    pub(crate) fn insert_managed(&self, target: TargetId, tween: Tween) {
        self.shared
            .state
            .lock()
            .unwrap()
            .managed
            .insert(target, tween);
    }

    pub(crate) fn take_managed(&self, target: TargetId) -> Option<Tween> {
        let taken = self.shared.state.lock().unwrap().managed.shift_remove(&target);
        taken
    }

    /// Drop the entry for `target` if it still belongs to `tween`
    pub(crate) fn release_managed(&self, target: TargetId, tween: TweenId) -> bool {
        let mut state = self.shared.state.lock().unwrap();
        if state.managed.get(&target).map(Tween::id) == Some(tween) {
            state.managed.shift_remove(&target);
            true
        } else {
            false
        }
    }

    fn pop_managed(&self) -> Option<Tween> {
        let popped = self
            .shared
            .state
            .lock()
            .unwrap()
            .managed
            .shift_remove_index(0)
            .map(|(_, tween)| tween);
        popped
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

/// A weak handle to a clock
///
/// This is what tweens keep. It won't prevent the clock from being dropped;
/// tweens on a dropped clock simply never start.
#[derive(Clone)]
pub struct ClockHandle {
    shared: Weak<ClockShared>,
}

impl ClockHandle {
    pub fn upgrade(&self) -> Option<Clock> {
        self.shared.upgrade().map(|shared| Clock { shared })
    }

    /// Check if the clock is still alive
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}
