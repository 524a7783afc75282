//! Tweens
//!
//! A [`Tween`] interpolates one or more properties of a single target over a
//! fixed duration. It is driven by its [`Clock`](crate::Clock): once started,
//! every clock tick advances it by one frame until it lands exactly on its goal
//! values, or until it is stopped.
//!
//! `Tween` is a cheap handle; clones refer to the same animation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

use crate::clock::{Clock, ClockHandle};
use crate::easing::EasingFn;
use crate::settings::{TweenCallback, TweenData, TweenEvent, TweenSettings};
use crate::target::SharedTarget;
use crate::value::{format_value, parse_endpoint, round_half_up, PropertySpec};

static NEXT_TWEEN_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique tween identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

impl TweenId {
    fn next() -> Self {
        TweenId(NEXT_TWEEN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Where a tween is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenPhase {
    /// Constructed, never started
    Created,
    Running,
    /// Reached its duration
    Completed,
    /// Stopped before reaching its duration
    Cancelled,
}

impl TweenPhase {
    pub fn is_finished(self) -> bool {
        matches!(self, TweenPhase::Completed | TweenPhase::Cancelled)
    }
}

/// Interpolation state for one property, fixed when the tween starts
#[derive(Clone, Debug)]
struct PropertyTrack {
    property: String,
    start: f64,
    delta: f64,
    suffix: Option<String>,
}

struct TweenState {
    settings: TweenSettings,
    phase: TweenPhase,
    elapsed_ticks: u64,
    ticks_to_complete: f64,
    frame_interval_ms: f64,
    easing: Option<EasingFn>,
    tracks: SmallVec<[PropertyTrack; 4]>,
    /// Bookkeeping hook run once the tween finishes either way, before any
    /// lifecycle callback fires
    release: Option<TweenCallback>,
    /// Started on natural completion, after the release hook
    next: Option<Tween>,
}

struct TweenInner {
    id: TweenId,
    target: SharedTarget,
    duration_ms: u32,
    spec: PropertySpec,
    clock: ClockHandle,
    state: Mutex<TweenState>,
}

/// A property animation on one target.
///
/// ```
/// use blinc_tween::{props, shared, Clock, ClockConfig, PropertyBag, Tween, TweenSettings};
///
/// let clock = Clock::new(ClockConfig::manual());
/// let bag = shared(PropertyBag::new().with("x", 0));
///
/// let tween = Tween::with_clock(
///     &clock.handle(),
///     bag.clone(),
///     1000,
///     props([("x", 100.into())]),
///     TweenSettings::new().easing("linear"),
/// )
/// .start();
///
/// for _ in 0..30 {
///     clock.tick();
/// }
/// assert!(!tween.is_running());
/// assert_eq!(bag.lock().unwrap().number("x"), Some(100.0));
/// ```
#[derive(Clone)]
pub struct Tween {
    inner: Arc<TweenInner>,
}

impl Tween {
    /// Create a tween driven by the process-wide clock.
    ///
    /// Nothing happens until [`start`](Self::start) is called.
    pub fn new(
        target: SharedTarget,
        duration_ms: u32,
        spec: impl Into<PropertySpec>,
        settings: TweenSettings,
    ) -> Self {
        Self::with_clock(&Clock::global().handle(), target, duration_ms, spec, settings)
    }

    /// Create a tween driven by a specific clock
    pub fn with_clock(
        clock: &ClockHandle,
        target: SharedTarget,
        duration_ms: u32,
        spec: impl Into<PropertySpec>,
        settings: TweenSettings,
    ) -> Self {
        Self {
            inner: Arc::new(TweenInner {
                id: TweenId::next(),
                target,
                duration_ms,
                spec: spec.into(),
                clock: clock.clone(),
                state: Mutex::new(TweenState {
                    settings,
                    phase: TweenPhase::Created,
                    elapsed_ticks: 0,
                    ticks_to_complete: 0.0,
                    frame_interval_ms: 0.0,
                    easing: None,
                    tracks: SmallVec::new(),
                    release: None,
                    next: None,
                }),
            }),
        }
    }

    pub fn id(&self) -> TweenId {
        self.inner.id
    }

    pub fn target(&self) -> &SharedTarget {
        &self.inner.target
    }

    pub fn duration_ms(&self) -> u32 {
        self.inner.duration_ms
    }

    pub fn spec(&self) -> &PropertySpec {
        &self.inner.spec
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.inner.clock
    }

    pub fn phase(&self) -> TweenPhase {
        self.inner.state.lock().unwrap().phase
    }

    pub fn is_running(&self) -> bool {
        self.phase() == TweenPhase::Running
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.inner.state.lock().unwrap().elapsed_ticks
    }

    /// Duration in clock ticks, known once the tween has started
    pub fn ticks_to_complete(&self) -> f64 {
        self.inner.state.lock().unwrap().ticks_to_complete
    }

    /// Fraction of the duration elapsed (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        let state = self.inner.state.lock().unwrap();
        match state.phase {
            TweenPhase::Created => 0.0,
            TweenPhase::Completed => 1.0,
            _ if state.ticks_to_complete <= 0.0 => 1.0,
            _ => (state.elapsed_ticks as f64 / state.ticks_to_complete).clamp(0.0, 1.0),
        }
    }

    pub fn data(&self) -> Option<TweenData> {
        self.inner.state.lock().unwrap().settings.data.clone()
    }

    pub fn settings(&self) -> TweenSettings {
        self.inner.state.lock().unwrap().settings.clone()
    }

    /// The tween started when this one completes, if chained.
    ///
    /// Only natural completion starts it; a stopped tween never advances its chain.
    pub fn next_tween(&self) -> Option<Tween> {
        self.inner.state.lock().unwrap().next.clone()
    }

    pub(crate) fn set_next(&self, next: Option<Tween>) {
        self.inner.state.lock().unwrap().next = next;
    }

    pub(crate) fn set_release_hook(&self, release: Option<TweenCallback>) {
        self.inner.state.lock().unwrap().release = release;
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start (or restart) the tween, returning a handle to it.
    ///
    /// Resolves every property's start and end value, writes explicit "from"
    /// values onto the target right away, joins the clock's active set and
    /// fires `Began`. Calling `start` on a running tween re-reads the target
    /// and restarts the tick count. A finished tween can't be restarted.
    pub fn start(&self) -> Tween {
        let (easing_name, elastic, global_suffix) = {
            let state = self.inner.state.lock().unwrap();
            if state.phase.is_finished() {
                tracing::warn!(
                    "Tween {:?} already {:?}; construct a new tween instead of restarting",
                    self.inner.id,
                    state.phase
                );
                return self.clone();
            }
            (
                state.settings.easing.clone(),
                state.settings.elastic,
                state.settings.suffix.clone(),
            )
        };

        let Some(clock) = self.inner.clock.upgrade() else {
            tracing::warn!("Tween {:?} started after its clock was dropped", self.inner.id);
            return self.clone();
        };

        let fps = clock.ensure_running() as f64;
        let easing = clock.resolve_easing(&easing_name, elastic);
        let tracks = self.resolve_tracks(global_suffix.as_deref());

        {
            let mut state = self.inner.state.lock().unwrap();
            state.tracks = tracks;
            state.elapsed_ticks = 0;
            state.frame_interval_ms = 1000.0 / fps;
            state.ticks_to_complete = self.inner.duration_ms as f64 * fps / 1000.0;
            state.easing = Some(easing);
            state.phase = TweenPhase::Running;
        }

        clock.activate(self.clone());
        self.emit(TweenEvent::Began);
        self.clone()
    }

    /// Compute per-property tracks, writing "from" values onto the target
    fn resolve_tracks(&self, global_suffix: Option<&str>) -> SmallVec<[PropertyTrack; 4]> {
        let from = self.inner.spec.from_values();
        let mut target = self.inner.target.lock().unwrap();

        self.inner
            .spec
            .to_values()
            .iter()
            .map(|(property, goal)| {
                let start = match from {
                    Some(from) => parse_endpoint(property, from.get(property)),
                    None => parse_endpoint(property, target.property(property).as_ref()),
                };
                let end = parse_endpoint(property, Some(goal));

                if from.is_some() {
                    let suffix = start.suffix.as_deref().or(global_suffix);
                    target.set_property(property, format_value(start.value, suffix));
                }

                PropertyTrack {
                    property: property.clone(),
                    start: start.value,
                    delta: end.value - start.value,
                    suffix: end.suffix,
                }
            })
            .collect()
    }

    /// Stop a running tween before it completes.
    ///
    /// Fires `Cancelled` then `Stopped` and returns `true`. Returns `false`
    /// without firing anything if the tween isn't running.
    pub fn stop(&self) -> bool {
        let (release, data) = {
            let mut state = self.inner.state.lock().unwrap();
            if state.phase != TweenPhase::Running {
                return false;
            }
            state.phase = TweenPhase::Cancelled;
            (state.release.clone(), state.settings.data.clone())
        };

        if let Some(clock) = self.inner.clock.upgrade() {
            clock.deactivate(self.inner.id);
        }
        self.sync_state();
        if let Some(release) = release {
            release(self, data.as_ref());
        }
        self.emit(TweenEvent::Cancelled);
        self.emit(TweenEvent::Stopped);
        true
    }

    /// Advance by one clock tick.
    ///
    /// Locks the target, then the tween state, and holds both through the
    /// writes, so a frame is either written before `stop` takes effect or not
    /// at all. No other path takes the target lock while holding the state.
    pub(crate) fn advance(&self) {
        let done = {
            let mut target = self.inner.target.lock().unwrap();
            let mut state = self.inner.state.lock().unwrap();
            if state.phase != TweenPhase::Running {
                return;
            }

            state.elapsed_ticks += 1;
            let done = state.elapsed_ticks as f64 >= state.ticks_to_complete;
            let time_ms = state.elapsed_ticks as f64 * state.frame_interval_ms;
            let duration_ms = self.inner.duration_ms as f64;
            let settings = &state.settings;

            for track in &state.tracks {
                let mut value = match (&state.easing, done) {
                    (Some(easing), false) => easing(time_ms, track.start, track.delta, duration_ms),
                    // Land exactly on the goal rather than the curve's last sample
                    _ => track.start + track.delta,
                };
                if settings.round {
                    value = round_half_up(value);
                }
                let suffix = track.suffix.as_deref().or(settings.suffix.as_deref());
                target.set_property(&track.property, format_value(value, suffix));
            }

            if settings.dirty_flag && !state.tracks.is_empty() && target.supports_dirty() {
                target.mark_dirty();
            }
            done
        };

        if done {
            self.complete();
        }
    }

    /// Natural completion
    fn complete(&self) {
        let (release, next, data) = {
            let mut state = self.inner.state.lock().unwrap();
            if state.phase != TweenPhase::Running {
                return;
            }
            state.phase = TweenPhase::Completed;
            (
                state.release.clone(),
                state.next.clone(),
                state.settings.data.clone(),
            )
        };

        if let Some(clock) = self.inner.clock.upgrade() {
            clock.deactivate(self.inner.id);
        }
        self.sync_state();
        if let Some(release) = release {
            release(self, data.as_ref());
        }
        if let Some(next) = next {
            next.start();
        }
        self.emit(TweenEvent::Completed);
        self.emit(TweenEvent::Stopped);
    }

    fn sync_state(&self) {
        let Some(sync) = self.inner.state.lock().unwrap().settings.state_sync.clone() else {
            return;
        };
        let state = {
            let target = self.inner.target.lock().unwrap();
            sync.collect(&*target, self.inner.spec.to_values())
        };
        sync.push(state);
    }

    /// Fire the settings callback for `event`, if one is set
    fn emit(&self, event: TweenEvent) {
        let (callback, data) = {
            let state = self.inner.state.lock().unwrap();
            (
                state.settings.callback(event).cloned(),
                state.settings.data.clone(),
            )
        };
        tracing::trace!("Tween {:?}: {:?}", self.inner.id, event);
        if let Some(callback) = callback {
            callback(self, data.as_ref());
        }
    }
}

impl PartialEq for Tween {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Tween {}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.inner.id)
            .field("duration_ms", &self.inner.duration_ms)
            .field("phase", &self.phase())
            .finish()
    }
}
