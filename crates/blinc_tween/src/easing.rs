//! Easing functions for tweens
//!
//! The classic Robert Penner equations, all in the `(t, b, c, d)` form:
//! `t` is the elapsed time, `b` the start value, `c` the change in value and
//! `d` the duration. Every curve returns `b` at `t = 0` and `b + c` at `t = d`.
//!
//! Tweens look easings up by name through an [`EasingLibrary`], so hosts can
//! register their own curves next to the built-in ones.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{Result, TweenError};

/// Name of the easing used when a tween doesn't configure one
pub const DEFAULT_EASING: &str = "easeInOutSine";

const PI_M2: f64 = PI * 2.0;
const PI_D2: f64 = PI / 2.0;
const BACK_OVERSHOOT: f64 = 1.70158;

/// A resolved easing curve `(t, b, c, d) -> value`
pub type EasingFn = Arc<dyn Fn(f64, f64, f64, f64) -> f64 + Send + Sync>;

/// Built-in easing curves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    Linear,
    EaseInSine,
    EaseOutSine,
    #[default]
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInCircular,
    EaseOutCircular,
    EaseInOutCircular,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    /// Every built-in curve, in table order
    pub const ALL: [Easing; 22] = [
        Easing::Linear,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseInExpo,
        Easing::EaseOutExpo,
        Easing::EaseInOutExpo,
        Easing::EaseInElastic,
        Easing::EaseOutElastic,
        Easing::EaseInOutElastic,
        Easing::EaseInCircular,
        Easing::EaseOutCircular,
        Easing::EaseInOutCircular,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseInOutBack,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInOutBounce,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
    ];

    /// The lookup name of this curve
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInSine => "easeInSine",
            Easing::EaseOutSine => "easeOutSine",
            Easing::EaseInOutSine => "easeInOutSine",
            Easing::EaseInExpo => "easeInExpo",
            Easing::EaseOutExpo => "easeOutExpo",
            Easing::EaseInOutExpo => "easeInOutExpo",
            Easing::EaseInElastic => "easeInElastic",
            Easing::EaseOutElastic => "easeOutElastic",
            Easing::EaseInOutElastic => "easeInOutElastic",
            Easing::EaseInCircular => "easeInCircular",
            Easing::EaseOutCircular => "easeOutCircular",
            Easing::EaseInOutCircular => "easeInOutCircular",
            Easing::EaseInBack => "easeInBack",
            Easing::EaseOutBack => "easeOutBack",
            Easing::EaseInOutBack => "easeInOutBack",
            Easing::EaseInBounce => "easeInBounce",
            Easing::EaseOutBounce => "easeOutBounce",
            Easing::EaseInOutBounce => "easeInOutBounce",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
        }
    }

    /// Evaluate the curve at time `t`
    pub fn ease(&self, t: f64, b: f64, c: f64, d: f64) -> f64 {
        match self {
            Easing::Linear => c * t / d + b,
            Easing::EaseInSine => -c * (t / d * PI_D2).cos() + c + b,
            Easing::EaseOutSine => c * (t / d * PI_D2).sin() + b,
            Easing::EaseInOutSine => -c / 2.0 * ((PI * t / d).cos() - 1.0) + b,
            Easing::EaseInExpo => ease_in_expo(t, b, c, d),
            Easing::EaseOutExpo => ease_out_expo(t, b, c, d),
            Easing::EaseInOutExpo => ease_in_out_expo(t, b, c, d),
            Easing::EaseInElastic => ease_in_elastic(t, b, c, d, None, None),
            Easing::EaseOutElastic => ease_out_elastic(t, b, c, d, None, None),
            Easing::EaseInOutElastic => ease_in_out_elastic(t, b, c, d, None, None),
            Easing::EaseInCircular => {
                let t = t / d;
                -c * ((1.0 - t * t).sqrt() - 1.0) + b
            }
            Easing::EaseOutCircular => {
                let t = t / d - 1.0;
                c * (1.0 - t * t).sqrt() + b
            }
            Easing::EaseInOutCircular => ease_in_out_circular(t, b, c, d),
            Easing::EaseInBack => {
                let t = t / d;
                c * t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT) + b
            }
            Easing::EaseOutBack => {
                let t = t / d - 1.0;
                c * (t * t * ((BACK_OVERSHOOT + 1.0) * t + BACK_OVERSHOOT) + 1.0) + b
            }
            Easing::EaseInOutBack => ease_in_out_back(t, b, c, d),
            Easing::EaseInBounce => ease_in_bounce(t, b, c, d),
            Easing::EaseOutBounce => ease_out_bounce(t, b, c, d),
            Easing::EaseInOutBounce => {
                if t < d / 2.0 {
                    ease_in_bounce(t * 2.0, 0.0, c, d) * 0.5 + b
                } else {
                    ease_out_bounce(t * 2.0 - d, 0.0, c, d) * 0.5 + c * 0.5 + b
                }
            }
            Easing::EaseInCubic => {
                let t = t / d;
                c * t * t * t + b
            }
            Easing::EaseOutCubic => {
                let t = t / d - 1.0;
                c * (t * t * t + 1.0) + b
            }
            Easing::EaseInOutCubic => {
                let t = t / (d / 2.0);
                if t < 1.0 {
                    c / 2.0 * t * t * t + b
                } else {
                    let t = t - 2.0;
                    c / 2.0 * (t * t * t + 2.0) + b
                }
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = TweenError;

    fn from_str(name: &str) -> Result<Self> {
        if name == "swing" {
            return Ok(Easing::EaseInOutSine);
        }
        Easing::ALL
            .iter()
            .copied()
            .find(|easing| easing.name() == name)
            .ok_or_else(|| TweenError::UnknownEasing(name.to_string()))
    }
}

// ============================================================================
// Curves with branches or extra parameters
// ============================================================================

fn ease_in_expo(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == 0.0 {
        return b;
    }
    c * 2f64.powf(10.0 * (t / d - 1.0)) + b
}

fn ease_out_expo(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == d {
        return b + c;
    }
    c * (-(2f64.powf(-10.0 * t / d)) + 1.0) + b
}

fn ease_in_out_expo(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if t == 0.0 {
        return b;
    }
    if t == d {
        return b + c;
    }
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * 2f64.powf(10.0 * (t - 1.0)) + b
    } else {
        c / 2.0 * (-(2f64.powf(-10.0 * (t - 1.0))) + 2.0) + b
    }
}

/// Amplitude and period overrides for the elastic curves.
///
/// Unset fields keep the curve's defaults: amplitude `c`, period `0.3 * d`
/// (`0.45 * d` for in-out).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElasticParams {
    pub amplitude: Option<f64>,
    pub period: Option<f64>,
}

impl ElasticParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    /// Oscillation period, in the same units as the duration
    pub fn period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }
}

/// Resolve elastic amplitude and phase shift.
///
/// An amplitude that is missing, zero, or smaller than `|c|` is replaced by
/// `c` itself.
fn elastic_shape(c: f64, amplitude: Option<f64>, period: f64) -> (f64, f64) {
    match amplitude {
        Some(a) if a != 0.0 && a >= c.abs() => (a, period / PI_M2 * (c / a).asin()),
        _ => (c, period / 4.0),
    }
}

/// Elastic ease-in with an explicit amplitude and period.
///
/// `period` defaults to `0.3 * d`.
pub fn ease_in_elastic(
    t: f64,
    b: f64,
    c: f64,
    d: f64,
    amplitude: Option<f64>,
    period: Option<f64>,
) -> f64 {
    if t == 0.0 {
        return b;
    }
    let t = t / d;
    if t == 1.0 {
        return b + c;
    }
    let p = period.filter(|p| *p != 0.0).unwrap_or(d * 0.3);
    let (a, s) = elastic_shape(c, amplitude, p);
    let t = t - 1.0;
    -(a * 2f64.powf(10.0 * t) * ((t * d - s) * PI_M2 / p).sin()) + b
}

/// Elastic ease-out with an explicit amplitude and period.
///
/// `period` defaults to `0.3 * d`.
pub fn ease_out_elastic(
    t: f64,
    b: f64,
    c: f64,
    d: f64,
    amplitude: Option<f64>,
    period: Option<f64>,
) -> f64 {
    if t == 0.0 {
        return b;
    }
    let t = t / d;
    if t == 1.0 {
        return b + c;
    }
    let p = period.filter(|p| *p != 0.0).unwrap_or(d * 0.3);
    let (a, s) = elastic_shape(c, amplitude, p);
    a * 2f64.powf(-10.0 * t) * ((t * d - s) * PI_M2 / p).sin() + c + b
}

/// Elastic ease-in-out with an explicit amplitude and period.
///
/// `period` defaults to `0.45 * d`.
pub fn ease_in_out_elastic(
    t: f64,
    b: f64,
    c: f64,
    d: f64,
    amplitude: Option<f64>,
    period: Option<f64>,
) -> f64 {
    if t == 0.0 {
        return b;
    }
    let t = t / (d / 2.0);
    if t == 2.0 {
        return b + c;
    }
    let p = period.filter(|p| *p != 0.0).unwrap_or(d * (0.3 * 1.5));
    let (a, s) = elastic_shape(c, amplitude, p);
    let t = t - 1.0;
    let wave = ((t * d - s) * PI_M2 / p).sin();
    if t < 0.0 {
        -0.5 * (a * 2f64.powf(10.0 * t) * wave) + b
    } else {
        a * 2f64.powf(-10.0 * t) * wave * 0.5 + c + b
    }
}

fn ease_in_out_circular(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        -c / 2.0 * ((1.0 - t * t).sqrt() - 1.0) + b
    } else {
        let t = t - 2.0;
        c / 2.0 * ((1.0 - t * t).sqrt() + 1.0) + b
    }
}

fn ease_in_out_back(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let s = BACK_OVERSHOOT * 1.525;
    let t = t / (d / 2.0);
    if t < 1.0 {
        c / 2.0 * (t * t * ((s + 1.0) * t - s)) + b
    } else {
        let t = t - 2.0;
        c / 2.0 * (t * t * ((s + 1.0) * t + s) + 2.0) + b
    }
}

fn ease_in_bounce(t: f64, b: f64, c: f64, d: f64) -> f64 {
    c - ease_out_bounce(d - t, 0.0, c, d) + b
}

fn ease_out_bounce(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    if t < 1.0 / 2.75 {
        c * (7.5625 * t * t) + b
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        c * (7.5625 * t * t + 0.75) + b
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        c * (7.5625 * t * t + 0.9375) + b
    } else {
        let t = t - 2.625 / 2.75;
        c * (7.5625 * t * t + 0.984375) + b
    }
}

// ============================================================================
// Lookup table
// ============================================================================

/// Name-keyed table of easing curves.
///
/// Starts out with every [`Easing`] plus the `swing` alias. Each
/// [`Clock`](crate::Clock) owns one library; tweens resolve their easing name
/// against it when they start.
#[derive(Clone)]
pub struct EasingLibrary {
    table: FxHashMap<String, EasingFn>,
}

impl EasingLibrary {
    pub fn new() -> Self {
        let mut table: FxHashMap<String, EasingFn> = FxHashMap::default();
        for easing in Easing::ALL {
            table.insert(
                easing.name().to_string(),
                Arc::new(move |t, b, c, d| easing.ease(t, b, c, d)),
            );
        }
        let swing = Easing::EaseInOutSine;
        table.insert(
            "swing".to_string(),
            Arc::new(move |t, b, c, d| swing.ease(t, b, c, d)),
        );
        Self { table }
    }

    /// Register (or replace) a curve under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(f64, f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.table.insert(name.into(), Arc::new(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn try_resolve(&self, name: &str) -> Result<EasingFn> {
        self.table
            .get(name)
            .cloned()
            .ok_or_else(|| TweenError::UnknownEasing(name.to_string()))
    }

    /// Resolve `name`, falling back to [`DEFAULT_EASING`] when it's unknown
    pub fn resolve(&self, name: &str) -> EasingFn {
        match self.try_resolve(name) {
            Ok(f) => f,
            Err(err) => {
                tracing::warn!("{}, falling back to {}", err, DEFAULT_EASING);
                let fallback = Easing::default();
                Arc::new(move |t, b, c, d| fallback.ease(t, b, c, d))
            }
        }
    }

    /// Resolve `name`, applying `elastic` when it names a built-in elastic curve.
    ///
    /// Parameters given for any other curve are ignored.
    pub fn resolve_with(&self, name: &str, elastic: Option<ElasticParams>) -> EasingFn {
        let Some(params) = elastic else {
            return self.resolve(name);
        };
        let curve: fn(f64, f64, f64, f64, Option<f64>, Option<f64>) -> f64 = match name.parse::<Easing>() {
            Ok(Easing::EaseInElastic) => ease_in_elastic,
            Ok(Easing::EaseOutElastic) => ease_out_elastic,
            Ok(Easing::EaseInOutElastic) => ease_in_out_elastic,
            _ => {
                tracing::debug!("Elastic parameters ignored for easing '{}'", name);
                return self.resolve(name);
            }
        };
        Arc::new(move |t, b, c, d| curve(t, b, c, d, params.amplitude, params.period))
    }

    /// Registered names, unordered
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

impl Default for EasingLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_is_ease_in_out_sine() {
        assert_eq!(Easing::default(), Easing::EaseInOutSine);
        assert_eq!(Easing::default().name(), DEFAULT_EASING);
    }

    #[test]
    fn test_all_curves_start_at_b() {
        for easing in Easing::ALL {
            assert!(
                approx(easing.ease(0.0, 10.0, 90.0, 1000.0), 10.0),
                "{} did not start at b",
                easing
            );
        }
    }

    #[test]
    fn test_non_elastic_curves_end_at_b_plus_c() {
        for easing in Easing::ALL {
            if matches!(
                easing,
                Easing::EaseInElastic | Easing::EaseOutElastic | Easing::EaseInOutElastic
            ) {
                continue;
            }
            assert!(
                approx(easing.ease(1000.0, 10.0, 90.0, 1000.0), 100.0),
                "{} did not end at b + c",
                easing
            );
        }
    }

    #[test]
    fn test_linear_midpoint() {
        assert!(approx(Easing::Linear.ease(500.0, 0.0, 100.0, 1000.0), 50.0));
    }

    #[test]
    fn test_symmetric_curves_hit_half_at_midpoint() {
        for easing in [
            Easing::EaseInOutSine,
            Easing::EaseInOutCubic,
            Easing::EaseInOutCircular,
            Easing::EaseInOutExpo,
        ] {
            assert!(
                approx(easing.ease(500.0, 0.0, 100.0, 1000.0), 50.0),
                "{} midpoint",
                easing
            );
        }
    }

    #[test]
    fn test_back_overshoots_below_start() {
        assert!(Easing::EaseInBack.ease(200.0, 0.0, 100.0, 1000.0) < 0.0);
        assert!(Easing::EaseOutBack.ease(800.0, 0.0, 100.0, 1000.0) > 100.0);
    }

    #[test]
    fn test_elastic_with_explicit_amplitude() {
        // amplitude >= |c| keeps the caller's amplitude
        let v = ease_out_elastic(0.0, 5.0, 10.0, 1000.0, Some(20.0), Some(300.0));
        assert_eq!(v, 5.0);
        let end = ease_in_out_elastic(1000.0, 5.0, 10.0, 1000.0, Some(20.0), None);
        assert_eq!(end, 15.0);
    }

    #[test]
    fn test_from_str_and_swing_alias() {
        assert_eq!("linear".parse::<Easing>(), Ok(Easing::Linear));
        assert_eq!("swing".parse::<Easing>(), Ok(Easing::EaseInOutSine));
        assert_eq!(
            "wobble".parse::<Easing>(),
            Err(TweenError::UnknownEasing("wobble".to_string()))
        );
    }

    #[test]
    fn test_library_lookup() {
        let mut library = EasingLibrary::new();
        assert!(library.contains("swing"));
        assert_eq!(library.names().count(), Easing::ALL.len() + 1);

        let linear = library.try_resolve("linear").unwrap();
        assert!(approx(linear(250.0, 0.0, 100.0, 1000.0), 25.0));

        assert!(library.try_resolve("steps").is_err());
        library.register("steps", |t, b, c, d| b + c * (t / d * 4.0).floor() / 4.0);
        let steps = library.try_resolve("steps").unwrap();
        assert!(approx(steps(300.0, 0.0, 100.0, 1000.0), 25.0));
    }

    #[test]
    fn test_library_resolve_with_elastic_params() {
        let library = EasingLibrary::new();
        let params = ElasticParams::new().amplitude(30.0).period(200.0);

        let shaped = library.resolve_with("easeInElastic", Some(params));
        let expected = ease_in_elastic(400.0, 0.0, 10.0, 1000.0, Some(30.0), Some(200.0));
        assert!(approx(shaped(400.0, 0.0, 10.0, 1000.0), expected));

        // Non-elastic curves ignore the parameters
        let linear = library.resolve_with("linear", Some(params));
        assert!(approx(linear(400.0, 0.0, 10.0, 1000.0), 4.0));
    }

    #[test]
    fn test_library_resolve_falls_back_to_default() {
        let library = EasingLibrary::new();
        let f = library.resolve("nope");
        let expected = Easing::EaseInOutSine.ease(250.0, 0.0, 100.0, 1000.0);
        assert!(approx(f(250.0, 0.0, 100.0, 1000.0), expected));
    }
}
