//! Blinc Tween Engine
//!
//! Frame-ticked property interpolation: give a tween a target, a duration and
//! a set of goal values, and a shared clock moves the target's properties
//! there one frame at a time.
//!
//! # Features
//!
//! - **Easing Library**: Penner-style curves looked up by name, plus custom curves
//! - **Suffix-Aware Values**: `"20px"` tweens as `20` and is written back as `"…px"`
//! - **Shared Clock**: One fixed-rate scheduler drives every active tween
//! - **Lifecycle Events**: Began, Cancelled, Completed and Stopped callbacks
//! - **Managed Tweens**: At most one registry tween per target; newer ones win
//! - **Chains and Delays**: Run tweens back to back with pauses in between
//! - **Manual Ticking**: Drive the clock from a host frame loop or from tests
//!
//! # Example
//!
//! ```
//! use blinc_tween::{
//!     props, shared, Clock, ClockConfig, PropertyBag, PropertyValue, SharedTarget, TweenSettings,
//! };
//!
//! let clock = Clock::new(ClockConfig::manual());
//! let card: SharedTarget = shared(PropertyBag::new().with("opacity", 0));
//!
//! let fade = clock.registry().to(
//!     card.clone(),
//!     300,
//!     props([("opacity", 1.into())]),
//!     TweenSettings::new().easing("easeOutCubic"),
//! );
//!
//! while fade.is_running() {
//!     clock.tick();
//! }
//! assert_eq!(
//!     card.lock().unwrap().property("opacity"),
//!     Some(PropertyValue::Number(1.0))
//! );
//! ```

pub mod chain;
pub mod clock;
pub mod easing;
pub mod error;
pub mod registry;
pub mod settings;
pub mod target;
pub mod tween;
pub mod value;

pub use chain::{chain, delay, delay_with_clock, delay_with_settings, ChainBuilder};
pub use clock::{
    is_clock_initialized, set_global_clock, try_global_clock, Clock, ClockConfig, ClockHandle,
    TickMode, DEFAULT_FPS,
};
pub use easing::{ElasticParams, Easing, EasingFn, EasingLibrary, DEFAULT_EASING};
pub use error::{Result, TweenError};
pub use registry::{stop, stop_all, to, TweenRegistry};
pub use settings::{StateSink, StateSync, TweenCallback, TweenData, TweenEvent, TweenSettings};
pub use target::{shared, PropertyBag, SharedTarget, TargetId, TweenTarget};
pub use tween::{Tween, TweenId, TweenPhase};
pub use value::{parse_endpoint, props, Endpoint, PropertyMap, PropertySpec, PropertyValue};
