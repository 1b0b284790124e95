use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Curve family used to remap normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    Sine,
    /// Power curve; the exponent is the easing argument.
    Ease,
    Exponential,
    Circular,
    Back,
    Elastic,
    Bounce,
}

/// Which end of the curve is eased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EasingMode {
    In,
    Out,
    InOut,
}

const C1: f32 = 1.70158;
const C2: f32 = C1 * 1.525;
const C3: f32 = C1 + 1.0;
const C4: f32 = 2.0 * PI / 3.0;
const C5: f32 = 2.0 * PI / 4.5;
const N1: f32 = 7.5625;
const D1: f32 = 2.75;

/// Apply an easing curve to `x`.
///
/// `argument` is the exponent for [`Easing::Ease`] and is ignored by every
/// other family. Inputs outside `[0, 1]` are passed through the same formulas
/// without clamping.
pub fn apply_easing(x: f32, easing: Easing, mode: EasingMode, argument: f32) -> f32 {
    match easing {
        Easing::Linear => x,
        Easing::Sine => match mode {
            EasingMode::In => 1.0 - (x * PI / 2.0).cos(),
            EasingMode::Out => (x * PI / 2.0).sin(),
            EasingMode::InOut => -((PI * x).cos() - 1.0) / 2.0,
        },
        Easing::Ease => match mode {
            EasingMode::In => x.powf(argument),
            EasingMode::Out => 1.0 - (1.0 - x).powf(argument),
            EasingMode::InOut => {
                if x < 0.5 {
                    2f32.powf(argument - 1.0) * x.powf(argument)
                } else {
                    1.0 - (-2.0 * x + 2.0).powf(argument) / 2.0
                }
            }
        },
        Easing::Exponential => match mode {
            EasingMode::In => {
                if x == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * x - 10.0)
                }
            }
            EasingMode::Out => {
                if x == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * x)
                }
            }
            EasingMode::InOut => {
                if x == 0.0 || x == 1.0 {
                    x
                } else if x < 0.5 {
                    2f32.powf(20.0 * x - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * x + 10.0)) / 2.0
                }
            }
        },
        Easing::Circular => match mode {
            EasingMode::In => 1.0 - (1.0 - x * x).sqrt(),
            EasingMode::Out => (1.0 - (x - 1.0) * (x - 1.0)).sqrt(),
            EasingMode::InOut => {
                if x < 0.5 {
                    (1.0 - (1.0 - (2.0 * x) * (2.0 * x)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * x + 2.0) * (-2.0 * x + 2.0)).sqrt() + 1.0) / 2.0
                }
            }
        },
        Easing::Back => match mode {
            EasingMode::In => C3 * x * x * x - C1 * x * x,
            EasingMode::Out => {
                let u = x - 1.0;
                1.0 + C3 * u * u * u + C1 * u * u
            }
            EasingMode::InOut => {
                if x < 0.5 {
                    (2.0 * x) * (2.0 * x) * ((C2 + 1.0) * 2.0 * x - C2) / 2.0
                } else {
                    ((2.0 * x - 2.0) * (2.0 * x - 2.0) * ((C2 + 1.0) * (x * 2.0 - 2.0) + C2)
                        + 2.0)
                        / 2.0
                }
            }
        },
        Easing::Elastic => {
            if x == 0.0 || x == 1.0 {
                return x;
            }
            match mode {
                EasingMode::In => -2f32.powf(10.0 * x - 10.0) * ((x * 10.0 - 10.75) * C4).sin(),
                EasingMode::Out => 2f32.powf(-10.0 * x) * ((x * 10.0 - 0.75) * C4).sin() + 1.0,
                EasingMode::InOut => {
                    if x < 0.5 {
                        -(2f32.powf(20.0 * x - 10.0) * ((20.0 * x - 11.125) * C5).sin()) / 2.0
                    } else {
                        2f32.powf(-20.0 * x + 10.0) * ((20.0 * x - 11.125) * C5).sin() / 2.0
                            + 1.0
                    }
                }
            }
        }
        Easing::Bounce => match mode {
            EasingMode::In => 1.0 - bounce_out(1.0 - x),
            EasingMode::Out => bounce_out(x),
            EasingMode::InOut => {
                if x < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * x)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * x - 1.0)) / 2.0
                }
            }
        },
    }
}

fn bounce_out(x: f32) -> f32 {
    if x < 1.0 / D1 {
        N1 * x * x
    } else if x < 2.0 / D1 {
        let x = x - 1.5 / D1;
        N1 * x * x + 0.75
    } else if x < 2.5 / D1 {
        let x = x - 2.25 / D1;
        N1 * x * x + 0.9375
    } else {
        let x = x - 2.625 / D1;
        N1 * x * x + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 8] = [
        Easing::Linear,
        Easing::Sine,
        Easing::Ease,
        Easing::Exponential,
        Easing::Circular,
        Easing::Back,
        Easing::Elastic,
        Easing::Bounce,
    ];
    const MODES: [EasingMode; 3] = [EasingMode::In, EasingMode::Out, EasingMode::InOut];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            for mode in MODES {
                let start = apply_easing(0.0, easing, mode, 2.0);
                let end = apply_easing(1.0, easing, mode, 2.0);
                assert!(start.abs() < 1e-3, "{easing:?} {mode:?} start = {start}");
                assert!((end - 1.0).abs() < 1e-3, "{easing:?} {mode:?} end = {end}");
            }
        }
    }

    #[test]
    fn exponential_out_matches_formula() {
        let v = apply_easing(0.25, Easing::Exponential, EasingMode::Out, 0.0);
        assert!((v - (1.0 - 2f32.powf(-2.5))).abs() < 1e-6);
        // Past the end the curve keeps approaching one.
        let past = apply_easing(2.0, Easing::Exponential, EasingMode::Out, 0.0);
        assert!(past > 0.999 && past < 1.0);
    }

    #[test]
    fn ease_argument_is_exponent() {
        let v = apply_easing(0.5, Easing::Ease, EasingMode::In, 3.0);
        assert!((v - 0.125).abs() < 1e-6);
    }

    #[test]
    fn linear_ignores_mode() {
        for mode in MODES {
            assert_eq!(apply_easing(0.3, Easing::Linear, mode, 0.0), 0.3);
        }
    }

    #[test]
    fn in_out_is_half_at_midpoint() {
        for easing in [Easing::Sine, Easing::Circular, Easing::Exponential, Easing::Bounce] {
            let v = apply_easing(0.5, easing, EasingMode::InOut, 0.0);
            assert!((v - 0.5).abs() < 1e-3, "{easing:?} midpoint = {v}");
        }
    }
}
