//! Managed tweens
//!
//! [`TweenRegistry`] keeps at most one tween per target. Starting a managed
//! tween on a target that already has one cancels the old tween first, so
//! competing animations on the same object never fight over its properties.
//!
//! The registry itself is a thin handle; the target → tween mapping lives in
//! the clock, which is what lets [`Clock::stop_all`] stop managed tweens.

use std::sync::Arc;

use crate::clock::{Clock, ClockHandle};
use crate::settings::TweenSettings;
use crate::target::{SharedTarget, TargetId};
use crate::tween::Tween;
use crate::value::PropertySpec;

/// One-tween-per-target layer over a clock
///
/// ```
/// use blinc_tween::{props, shared, Clock, ClockConfig, PropertyBag, SharedTarget, TweenSettings};
///
/// let clock = Clock::new(ClockConfig::manual());
/// let registry = clock.registry();
/// let target: SharedTarget = shared(PropertyBag::new());
///
/// let first = registry.to(target.clone(), 500, props([("x", 10.into())]), TweenSettings::new());
/// let second = registry.to(target.clone(), 500, props([("x", 20.into())]), TweenSettings::new());
///
/// assert!(!first.is_running());
/// assert!(second.is_running());
/// assert_eq!(registry.managed_count(), 1);
/// ```
#[derive(Clone)]
pub struct TweenRegistry {
    clock: ClockHandle,
}

impl TweenRegistry {
    pub fn new(clock: ClockHandle) -> Self {
        Self { clock }
    }

    /// Registry on the process-wide clock
    pub fn global() -> Self {
        Self::new(Clock::global().handle())
    }

    /// Start a managed tween on `target`, replacing any managed tween it has.
    ///
    /// The replaced tween is stopped (`Cancelled`, then `Stopped`) before the
    /// new one fires `Began`. The entry is released as soon as the new tween
    /// finishes, whether it completes or is stopped directly.
    pub fn to(
        &self,
        target: SharedTarget,
        duration_ms: u32,
        spec: impl Into<PropertySpec>,
        settings: TweenSettings,
    ) -> Tween {
        let target_id = TargetId::of(&target);
        let tween = Tween::with_clock(&self.clock, target, duration_ms, spec, settings);

        let Some(clock) = self.clock.upgrade() else {
            tracing::warn!("Managed tween {:?} created after its clock was dropped", tween.id());
            return tween;
        };

        if let Some(previous) = clock.take_managed(target_id) {
            tracing::debug!(
                "Tween {:?} replaces managed tween {:?} on {:?}",
                tween.id(),
                previous.id(),
                target_id
            );
            previous.stop();
        }

        let handle = self.clock.clone();
        let tween_id = tween.id();
        tween.set_release_hook(Some(Arc::new(move |_, _| {
            if let Some(clock) = handle.upgrade() {
                clock.release_managed(target_id, tween_id);
            }
        })));

        clock.insert_managed(target_id, tween.clone());
        tween.start()
    }

    /// Stop and forget the managed tween on `target`.
    ///
    /// Returns whether the target had a running managed tween. Entries are
    /// released when their tween finishes, so a present entry is a live one.
    pub fn stop(&self, target: &SharedTarget) -> bool {
        let Some(clock) = self.clock.upgrade() else {
            return false;
        };
        match clock.take_managed(TargetId::of(target)) {
            Some(tween) => {
                tween.stop();
                true
            }
            None => false,
        }
    }

    /// Stop every managed tween and tear the clock down
    pub fn stop_all(&self) {
        if let Some(clock) = self.clock.upgrade() {
            clock.stop_all();
        }
    }

    pub fn is_managed(&self, target: &SharedTarget) -> bool {
        self.tween_for(target).is_some()
    }

    /// The managed tween on `target`, if any
    pub fn tween_for(&self, target: &SharedTarget) -> Option<Tween> {
        self.clock
            .upgrade()
            .and_then(|clock| clock.managed_tween(TargetId::of(target)))
    }

    pub fn managed_count(&self) -> usize {
        self.clock
            .upgrade()
            .map_or(0, |clock| clock.managed_count())
    }
}

// ============================================================================
// Global convenience API
// ============================================================================

/// Start a managed tween on the process-wide clock
pub fn to(
    target: SharedTarget,
    duration_ms: u32,
    spec: impl Into<PropertySpec>,
    settings: TweenSettings,
) -> Tween {
    TweenRegistry::global().to(target, duration_ms, spec, settings)
}

/// Stop the managed tween on `target` (process-wide clock)
pub fn stop(target: &SharedTarget) -> bool {
    TweenRegistry::global().stop(target)
}

/// Stop every managed tween on the process-wide clock and tear its timer down
pub fn stop_all() {
    Clock::global().stop_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockConfig;
    use crate::target::{shared, PropertyBag};
    use crate::tween::TweenPhase;
    use crate::value::props;
    use std::sync::Mutex;

    type EventLog = Arc<Mutex<Vec<String>>>;

    fn logged(log: &EventLog, name: &'static str) -> TweenSettings {
        let (b, c, d, s) = (log.clone(), log.clone(), log.clone(), log.clone());
        TweenSettings::new()
            .on_begin(move |_, _| b.lock().unwrap().push(format!("{name}:begin")))
            .on_cancel(move |_, _| c.lock().unwrap().push(format!("{name}:cancel")))
            .on_complete(move |_, _| d.lock().unwrap().push(format!("{name}:complete")))
            .on_stop(move |_, _| s.lock().unwrap().push(format!("{name}:stop")))
    }

    fn setup() -> (Clock, TweenRegistry, SharedTarget) {
        let clock = Clock::new(ClockConfig::manual());
        let registry = clock.registry();
        (clock, registry, shared(PropertyBag::new()))
    }

    #[test]
    fn test_replacement_cancels_before_new_begin() {
        let (clock, registry, target) = setup();
        let log = EventLog::default();

        let first = registry.to(target.clone(), 1000, props([("x", 1.into())]), logged(&log, "a"));
        clock.tick();
        let second = registry.to(target.clone(), 1000, props([("x", 2.into())]), logged(&log, "b"));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:begin", "a:cancel", "a:stop", "b:begin"]
        );
        assert_eq!(first.phase(), TweenPhase::Cancelled);
        assert_eq!(clock.active_count(), 1);
        assert_eq!(registry.tween_for(&target), Some(second));
    }

    #[test]
    fn test_targets_are_independent() {
        let (clock, registry, a) = setup();
        let b: SharedTarget = shared(PropertyBag::new());

        registry.to(a.clone(), 1000, props([("x", 1.into())]), TweenSettings::new());
        registry.to(b.clone(), 1000, props([("x", 1.into())]), TweenSettings::new());

        assert_eq!(registry.managed_count(), 2);
        assert_eq!(clock.active_count(), 2);
        assert!(registry.stop(&a));
        assert!(!registry.is_managed(&a));
        assert!(registry.is_managed(&b));
    }

    #[test]
    fn test_completion_releases_entry() {
        let (clock, registry, target) = setup();
        let tween = registry.to(target.clone(), 100, props([("x", 1.into())]), TweenSettings::new());
        assert!(registry.is_managed(&target));

        for _ in 0..3 {
            clock.tick();
        }
        assert_eq!(tween.phase(), TweenPhase::Completed);
        assert!(!registry.is_managed(&target));
        assert_eq!(registry.managed_count(), 0);
    }

    #[test]
    fn test_stop_reports_whether_entry_existed() {
        let (_clock, registry, target) = setup();
        assert!(!registry.stop(&target));

        let log = EventLog::default();
        registry.to(target.clone(), 1000, props([("x", 1.into())]), logged(&log, "a"));
        assert!(registry.stop(&target));
        assert!(!registry.stop(&target));
        assert_eq!(*log.lock().unwrap(), vec!["a:begin", "a:cancel", "a:stop"]);
    }

    #[test]
    fn test_stop_all_spares_unmanaged_tweens() {
        let (clock, registry, target) = setup();
        let managed = registry.to(target.clone(), 1000, props([("x", 1.into())]), TweenSettings::new());
        let unmanaged = Tween::with_clock(
            &clock.handle(),
            shared(PropertyBag::new()),
            1000,
            props([("x", 1.into())]),
            TweenSettings::new(),
        )
        .start();

        registry.stop_all();
        assert_eq!(managed.phase(), TweenPhase::Cancelled);
        assert!(unmanaged.is_running());
        assert_eq!(registry.managed_count(), 0);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_direct_stop_releases_entry() {
        let (clock, registry, target) = setup();
        let log = EventLog::default();
        let tween = registry.to(target.clone(), 1000, props([("x", 1.into())]), logged(&log, "a"));

        assert!(tween.stop());
        assert!(!registry.is_managed(&target));
        assert_eq!(registry.managed_count(), 0);
        assert!(!registry.stop(&target));
        assert_eq!(clock.active_count(), 0);
        assert_eq!(*log.lock().unwrap(), vec!["a:begin", "a:cancel", "a:stop"]);
    }

    #[test]
    fn test_stale_release_keeps_new_entry() {
        let (clock, registry, target) = setup();
        let first = registry.to(target.clone(), 1000, props([("x", 1.into())]), TweenSettings::new());
        let second = registry.to(target.clone(), 1000, props([("x", 2.into())]), TweenSettings::new());

        // The evicted tween no longer owns the entry
        assert!(!clock.release_managed(TargetId::of(&target), first.id()));
        assert_eq!(registry.tween_for(&target), Some(second.clone()));

        assert!(second.stop());
        assert!(!registry.is_managed(&target));
    }

    #[test]
    fn test_dropped_clock_is_inert() {
        let registry = Clock::new(ClockConfig::manual()).registry();
        let target: SharedTarget = shared(PropertyBag::new());

        let tween = registry.to(target.clone(), 100, props([("x", 1.into())]), TweenSettings::new());
        assert!(!tween.is_running());
        assert!(!registry.stop(&target));
        assert_eq!(registry.managed_count(), 0);
    }
}
