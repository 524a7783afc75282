//! Tween targets
//!
//! A target is any object whose named properties a tween reads and writes.
//! Tweens share their target with the host application; they never own it.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use crate::value::PropertyValue;

/// An object with named, tweenable properties.
///
/// Unknown property names are not an error: `property` returns `None` and the
/// tween falls back to its default start value.
pub trait TweenTarget: Send {
    /// Current value of `name`, if the target has one
    fn property(&self, name: &str) -> Option<PropertyValue>;

    /// Write a new value for `name`
    fn set_property(&mut self, name: &str, value: PropertyValue);

    /// Whether this target carries a dirty marker tweens may set
    fn supports_dirty(&self) -> bool {
        false
    }

    /// Flag the target as modified. Only called when `supports_dirty` is true.
    fn mark_dirty(&mut self) {}
}

/// A target shared between the host and the tweens animating it
pub type SharedTarget = Arc<Mutex<dyn TweenTarget>>;

/// Wrap a target for use with tweens
pub fn shared<T: TweenTarget + 'static>(target: T) -> Arc<Mutex<T>> {
    Arc::new(Mutex::new(target))
}

/// Identity of a shared target, used to key managed tweens
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(usize);

impl TargetId {
    pub fn of(target: &SharedTarget) -> Self {
        TargetId(Arc::as_ptr(target) as *const () as usize)
    }
}

// ============================================================================
// PropertyBag
// ============================================================================

/// A plain property map target, for hosts without their own target type.
///
/// Created with [`PropertyBag::with_dirty_flag`], the bag also tracks a dirty
/// marker that tweens set after each tick when asked to.
#[derive(Clone, Debug, Default)]
pub struct PropertyBag {
    values: FxHashMap<String, PropertyValue>,
    dirty: Option<bool>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bag that carries a dirty marker, initially clear
    pub fn with_dirty_flag() -> Self {
        Self {
            values: FxHashMap::default(),
            dirty: Some(false),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Numeric value of `name`, if it has one
    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(PropertyValue::as_number)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.unwrap_or(false)
    }

    /// Clear the dirty marker, returning whether it was set
    pub fn take_dirty(&mut self) -> bool {
        match self.dirty.as_mut() {
            Some(dirty) => std::mem::replace(dirty, false),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TweenTarget for PropertyBag {
    fn property(&self, name: &str) -> Option<PropertyValue> {
        self.values.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) {
        self.values.insert(name.to_string(), value);
    }

    fn supports_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    fn mark_dirty(&mut self) {
        if let Some(dirty) = self.dirty.as_mut() {
            *dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_bag_roundtrip() {
        let mut bag = PropertyBag::new().with("x", 5).with("width", "10px");
        assert_eq!(bag.number("x"), Some(5.0));
        assert_eq!(bag.number("width"), Some(10.0));
        assert_eq!(bag.property("missing"), None);

        bag.set_property("x", PropertyValue::Number(7.0));
        assert_eq!(bag.get("x"), Some(&PropertyValue::Number(7.0)));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_dirty_capability() {
        let mut plain = PropertyBag::new();
        assert!(!plain.supports_dirty());
        plain.mark_dirty();
        assert!(!plain.is_dirty());

        let mut flagged = PropertyBag::with_dirty_flag();
        assert!(flagged.supports_dirty());
        flagged.mark_dirty();
        assert!(flagged.take_dirty());
        assert!(!flagged.is_dirty());
    }

    #[test]
    fn test_target_identity() {
        let a: SharedTarget = shared(PropertyBag::new());
        let b: SharedTarget = shared(PropertyBag::new());
        let a2 = Arc::clone(&a);
        assert_eq!(TargetId::of(&a), TargetId::of(&a2));
        assert_ne!(TargetId::of(&a), TargetId::of(&b));
    }
}
