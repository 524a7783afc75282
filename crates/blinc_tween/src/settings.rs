//! Per-tween configuration and lifecycle events

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::easing::{ElasticParams, DEFAULT_EASING};
use crate::target::TweenTarget;
use crate::tween::Tween;
use crate::value::PropertyMap;

/// Opaque user data forwarded to every lifecycle callback
pub type TweenData = Arc<dyn Any + Send + Sync>;

/// Lifecycle callback, called with the tween and its settings' `data`
pub type TweenCallback = Arc<dyn Fn(&Tween, Option<&TweenData>) + Send + Sync>;

/// Lifecycle transitions a tween reports
///
/// `Began` fires when a tween starts. A running tween then ends exactly once,
/// either `Cancelled` by an explicit stop or `Completed` by reaching its
/// duration, and `Stopped` follows either of those.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenEvent {
    Began,
    Cancelled,
    Completed,
    Stopped,
}

impl TweenEvent {
    fn slot(self) -> usize {
        match self {
            TweenEvent::Began => 0,
            TweenEvent::Cancelled => 1,
            TweenEvent::Completed => 2,
            TweenEvent::Stopped => 3,
        }
    }
}

// ============================================================================
// State sync
// ============================================================================

/// External state store that receives tweened values when a tween ends
pub trait StateSink: Send + Sync {
    fn apply_partial_state(&self, state: PropertyMap);
}

/// Pushes a tween's final property values into a [`StateSink`].
///
/// Keys default to the tweened property names; `with_key` renames a property
/// on its way into the sink. Once any key is mapped, only mapped properties
/// are pushed.
#[derive(Clone)]
pub struct StateSync {
    sink: Arc<dyn StateSink>,
    keys: Option<IndexMap<String, String>>,
}

impl StateSync {
    pub fn new(sink: Arc<dyn StateSink>) -> Self {
        Self { sink, keys: None }
    }

    /// Push `property` under `key` instead of its own name
    pub fn with_key(mut self, property: impl Into<String>, key: impl Into<String>) -> Self {
        self.keys
            .get_or_insert_with(IndexMap::new)
            .insert(property.into(), key.into());
        self
    }

    /// Read the current values to push from `target`
    pub(crate) fn collect(&self, target: &dyn TweenTarget, tweened: &PropertyMap) -> PropertyMap {
        let mut state = PropertyMap::new();
        match &self.keys {
            Some(keys) => {
                for (property, key) in keys {
                    if let Some(value) = target.property(property) {
                        state.insert(key.clone(), value);
                    }
                }
            }
            None => {
                for property in tweened.keys() {
                    if let Some(value) = target.property(property) {
                        state.insert(property.clone(), value);
                    }
                }
            }
        }
        state
    }

    pub(crate) fn push(&self, state: PropertyMap) {
        self.sink.apply_partial_state(state);
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Configuration for a single tween
///
/// ```
/// use blinc_tween::TweenSettings;
///
/// let settings = TweenSettings::new()
///     .easing("easeOutBounce")
///     .suffix("px")
///     .round(true)
///     .on_complete(|tween, _| println!("tween {:?} done", tween.id()));
/// assert_eq!(settings.easing, "easeOutBounce");
/// ```
#[derive(Clone)]
pub struct TweenSettings {
    /// Easing name, resolved against the clock's easing library at start
    pub easing: String,
    /// Amplitude and period for the elastic curves; ignored by other easings
    pub elastic: Option<ElasticParams>,
    /// Appended to every written value whose goal had no suffix of its own
    pub suffix: Option<String>,
    /// Round each computed value to the nearest integer
    pub round: bool,
    pub data: Option<TweenData>,
    /// Set the target's dirty marker after each tick, if it has one
    pub dirty_flag: bool,
    pub state_sync: Option<StateSync>,
    callbacks: [Option<TweenCallback>; 4],
}

impl TweenSettings {
    pub fn new() -> Self {
        Self {
            easing: DEFAULT_EASING.to_string(),
            elastic: None,
            suffix: None,
            round: false,
            data: None,
            dirty_flag: false,
            state_sync: None,
            callbacks: Default::default(),
        }
    }

    pub fn easing(mut self, name: impl Into<String>) -> Self {
        self.easing = name.into();
        self
    }

    pub fn elastic(mut self, params: ElasticParams) -> Self {
        self.elastic = Some(params);
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub fn data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    pub fn dirty_flag(mut self, enabled: bool) -> Self {
        self.dirty_flag = enabled;
        self
    }

    pub fn state_sync(mut self, sync: StateSync) -> Self {
        self.state_sync = Some(sync);
        self
    }

    /// Set the callback for `event`, replacing any previous one
    pub fn on<F>(mut self, event: TweenEvent, f: F) -> Self
    where
        F: Fn(&Tween, Option<&TweenData>) + Send + Sync + 'static,
    {
        self.callbacks[event.slot()] = Some(Arc::new(f));
        self
    }

    pub fn on_begin<F>(self, f: F) -> Self
    where
        F: Fn(&Tween, Option<&TweenData>) + Send + Sync + 'static,
    {
        self.on(TweenEvent::Began, f)
    }

    pub fn on_cancel<F>(self, f: F) -> Self
    where
        F: Fn(&Tween, Option<&TweenData>) + Send + Sync + 'static,
    {
        self.on(TweenEvent::Cancelled, f)
    }

    pub fn on_complete<F>(self, f: F) -> Self
    where
        F: Fn(&Tween, Option<&TweenData>) + Send + Sync + 'static,
    {
        self.on(TweenEvent::Completed, f)
    }

    /// Called after either `on_cancel` or `on_complete`
    pub fn on_stop<F>(self, f: F) -> Self
    where
        F: Fn(&Tween, Option<&TweenData>) + Send + Sync + 'static,
    {
        self.on(TweenEvent::Stopped, f)
    }

    pub fn callback(&self, event: TweenEvent) -> Option<&TweenCallback> {
        self.callbacks[event.slot()].as_ref()
    }
}

impl Default for TweenSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TweenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenSettings")
            .field("easing", &self.easing)
            .field("elastic", &self.elastic)
            .field("suffix", &self.suffix)
            .field("round", &self.round)
            .field("has_data", &self.data.is_some())
            .field("dirty_flag", &self.dirty_flag)
            .field("state_sync", &self.state_sync.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::PropertyBag;
    use crate::value::props;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        pushed: Mutex<Vec<PropertyMap>>,
    }

    impl StateSink for RecordingSink {
        fn apply_partial_state(&self, state: PropertyMap) {
            self.pushed.lock().unwrap().push(state);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = TweenSettings::default();
        assert_eq!(settings.easing, DEFAULT_EASING);
        assert!(!settings.round);
        assert!(settings.suffix.is_none());
        assert!(settings.callback(TweenEvent::Began).is_none());
    }

    #[test]
    fn test_callbacks_are_slotted_by_event() {
        let settings = TweenSettings::new()
            .on_begin(|_, _| {})
            .on_stop(|_, _| {});
        assert!(settings.callback(TweenEvent::Began).is_some());
        assert!(settings.callback(TweenEvent::Stopped).is_some());
        assert!(settings.callback(TweenEvent::Cancelled).is_none());
        assert!(settings.callback(TweenEvent::Completed).is_none());
    }

    #[test]
    fn test_state_sync_default_keys() {
        let sink = Arc::new(RecordingSink::default());
        let sync = StateSync::new(sink.clone());
        let target = PropertyBag::new().with("x", 3).with("y", 4);
        let tweened = props([("x", 10.into())]);

        sync.push(sync.collect(&target, &tweened));

        let pushed = sink.pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0], props([("x", 3.into())]));
    }

    #[test]
    fn test_state_sync_mapped_keys() {
        let sink = Arc::new(RecordingSink::default());
        let sync = StateSync::new(sink.clone()).with_key("y", "top");
        let target = PropertyBag::new().with("x", 3).with("y", 4);
        let tweened = props([("x", 10.into()), ("y", 20.into())]);

        let state = sync.collect(&target, &tweened);
        assert_eq!(state, props([("top", 4.into())]));
    }
}
