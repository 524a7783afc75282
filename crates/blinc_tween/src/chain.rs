//! Tween chains and delays
//!
//! A chain is a forward-linked sequence: each tween holds its successor and
//! starts it when it completes naturally. Stopping a tween ends its chain
//! there. A delay is a tween with no properties, useful as a pause between
//! chained animations.

use crate::clock::{Clock, ClockHandle};
use crate::settings::TweenSettings;
use crate::target::{shared, PropertyBag, SharedTarget};
use crate::tween::Tween;
use crate::value::{PropertyMap, PropertySpec};

/// Link `tweens` so each starts when the previous one completes, then start
/// the first. Returns the first tween, or `None` for an empty sequence.
///
/// Chained tweens are not registry-managed. A finished tween can't be
/// restarted, so a chain that loops back on itself ends at the first repeat.
pub fn chain(tweens: impl IntoIterator<Item = Tween>) -> Option<Tween> {
    let tweens: Vec<Tween> = tweens.into_iter().collect();
    link(&tweens);
    tweens.first().map(Tween::start)
}

fn link(tweens: &[Tween]) {
    for pair in tweens.windows(2) {
        pair[0].set_next(Some(pair[1].clone()));
    }
}

/// A tween that animates nothing and completes after `duration_ms`, on the
/// process-wide clock. Not started.
pub fn delay(duration_ms: u32) -> Tween {
    delay_with_clock(&Clock::global().handle(), duration_ms)
}

/// [`delay`] on a specific clock
pub fn delay_with_clock(clock: &ClockHandle, duration_ms: u32) -> Tween {
    delay_with_settings(clock, duration_ms, TweenSettings::new())
}

/// [`delay`] with callbacks
pub fn delay_with_settings(clock: &ClockHandle, duration_ms: u32, settings: TweenSettings) -> Tween {
    let target: SharedTarget = shared(PropertyBag::new());
    Tween::with_clock(
        clock,
        target,
        duration_ms,
        PropertySpec::To(PropertyMap::new()),
        settings,
    )
}

/// Builder for chains on one clock
///
/// ```
/// use blinc_tween::{props, shared, ChainBuilder, Clock, ClockConfig, PropertyBag, TweenSettings};
///
/// let clock = Clock::new(ClockConfig::manual());
/// let bag = shared(PropertyBag::new());
///
/// let steps = ChainBuilder::with_clock(clock.handle())
///     .then(bag.clone(), 100, props([("x", 10.into())]), TweenSettings::new())
///     .delay(100)
///     .then(bag.clone(), 100, props([("x", 0.into())]), TweenSettings::new())
///     .start();
///
/// assert_eq!(steps.len(), 3);
/// assert!(steps[0].is_running());
/// assert!(!steps[1].is_running());
/// ```
pub struct ChainBuilder {
    clock: ClockHandle,
    tweens: Vec<Tween>,
}

impl ChainBuilder {
    /// Builder on the process-wide clock
    pub fn new() -> Self {
        Self::with_clock(Clock::global().handle())
    }

    pub fn with_clock(clock: ClockHandle) -> Self {
        Self {
            clock,
            tweens: Vec::new(),
        }
    }

    /// Append a new tween on the builder's clock
    pub fn then(
        mut self,
        target: SharedTarget,
        duration_ms: u32,
        spec: impl Into<PropertySpec>,
        settings: TweenSettings,
    ) -> Self {
        let tween = Tween::with_clock(&self.clock, target, duration_ms, spec, settings);
        self.tweens.push(tween);
        self
    }

    /// Append an existing tween
    pub fn push(mut self, tween: Tween) -> Self {
        self.tweens.push(tween);
        self
    }

    /// Append a pause
    pub fn delay(mut self, duration_ms: u32) -> Self {
        self.tweens.push(delay_with_clock(&self.clock, duration_ms));
        self
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Link the tweens without starting anything
    pub fn build(self) -> Vec<Tween> {
        link(&self.tweens);
        self.tweens
    }

    /// Link the tweens and start the first
    pub fn start(self) -> Vec<Tween> {
        let tweens = self.build();
        if let Some(first) = tweens.first() {
            first.start();
        }
        tweens
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
