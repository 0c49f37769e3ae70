/*
 * This file is part of Pifan.
 *
 * Copyright (C) 2025 Pifan contributors
 *
 * Pifan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Pifan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Pifan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Temperature to fan drive level mapping
//!
//! Two interchangeable policies share one trait:
//!
//! - [`LinearPolicy`]: PWM duty scaled linearly across a temperature band.
//!   Any in-band temperature gives a duty in `1..=254`, so a warm board
//!   never stops the fan; 0 and 255 are reserved for out-of-band averages.
//! - [`SteppedPolicy`]: named cooling states chosen by strict threshold
//!   comparisons. An average exactly on a threshold (or at/below the first
//!   one) matches no band and keeps the previous level.
//!
//! Both are pure: `(smoothed temperature, previous level) -> level`.

use std::fmt;

use crate::config::{ControlSettings, LinearBand, StepThresholds};
use crate::constants::linear::{DUTY_MAX, DUTY_SPAN};
use crate::device::FanTarget;

/// Discrete cooling states, ordered; the device code is the ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FanStep {
    Off,
    Low,
    Mid,
    High,
    Max,
}

impl FanStep {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for FanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FanStep::Off => "OFF",
            FanStep::Low => "LOW",
            FanStep::Mid => "MID",
            FanStep::High => "HIGH",
            FanStep::Max => "MAX",
        };
        f.write_str(name)
    }
}

/// A fan command as decided by a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveLevel {
    /// Raw PWM duty, 0 = off, 255 = full
    Duty(u8),
    Step(FanStep),
}

impl DriveLevel {
    /// Integer written to the fan register
    pub fn code(self) -> u32 {
        match self {
            DriveLevel::Duty(d) => u32::from(d),
            DriveLevel::Step(s) => s.code(),
        }
    }

    pub fn is_off(self) -> bool {
        self.code() == 0
    }

    /// The "off" level in the same representation as `self`
    pub fn off_like(self) -> DriveLevel {
        match self {
            DriveLevel::Duty(_) => DriveLevel::Duty(0),
            DriveLevel::Step(_) => DriveLevel::Step(FanStep::Off),
        }
    }
}

impl fmt::Display for DriveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveLevel::Duty(d) => write!(f, "{}", d),
            DriveLevel::Step(s) => write!(f, "{} ({})", s, s.code()),
        }
    }
}

pub trait SpeedPolicy: Send {
    fn name(&self) -> &'static str;

    /// Level assumed as "previous" before the first decision
    fn startup_level(&self) -> DriveLevel;

    /// Sample as stored in the window. Whole-degree policies drop the fraction.
    fn quantize(&self, temp_c: f64) -> f64 {
        temp_c
    }

    fn evaluate(&self, smoothed_c: f64, previous: DriveLevel) -> DriveLevel;
}

#[derive(Debug, Clone, Copy)]
pub struct LinearPolicy {
    band: LinearBand,
}

impl LinearPolicy {
    pub fn new(band: LinearBand) -> Self {
        Self { band }
    }

    pub fn duty_for(&self, temp_c: f64) -> u8 {
        let LinearBand { min_temp_c, max_temp_c } = self.band;
        if temp_c < min_temp_c {
            return 0;
        }
        if temp_c > max_temp_c {
            return DUTY_MAX;
        }
        let fraction = (temp_c - min_temp_c) / (max_temp_c - min_temp_c);
        (fraction * DUTY_SPAN).floor() as u8 + 1
    }
}

impl SpeedPolicy for LinearPolicy {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn startup_level(&self) -> DriveLevel {
        DriveLevel::Duty(0)
    }

    fn evaluate(&self, smoothed_c: f64, _previous: DriveLevel) -> DriveLevel {
        DriveLevel::Duty(self.duty_for(smoothed_c))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SteppedPolicy {
    steps: StepThresholds,
}

impl SteppedPolicy {
    pub fn new(steps: StepThresholds) -> Self {
        Self { steps }
    }

    /// Band containing `temp`, `None` on a boundary or at/below the first step
    pub fn step_for(&self, temp: i64) -> Option<FanStep> {
        let s = &self.steps;
        if s.step1 < temp && temp < s.step2 {
            Some(FanStep::Low)
        } else if s.step2 < temp && temp < s.step3 {
            Some(FanStep::Mid)
        } else if s.step3 < temp && temp < s.step4 {
            Some(FanStep::High)
        } else if temp >= s.step4 {
            Some(FanStep::Max)
        } else {
            None
        }
    }
}

impl SpeedPolicy for SteppedPolicy {
    fn name(&self) -> &'static str {
        "stepped"
    }

    fn startup_level(&self) -> DriveLevel {
        DriveLevel::Step(FanStep::Mid)
    }

    fn quantize(&self, temp_c: f64) -> f64 {
        temp_c.trunc()
    }

    fn evaluate(&self, smoothed_c: f64, previous: DriveLevel) -> DriveLevel {
        // Thresholds are whole degrees; the average is truncated, not rounded.
        match self.step_for(smoothed_c.trunc() as i64) {
            Some(step) => DriveLevel::Step(step),
            None => previous,
        }
    }
}

/// Which policy (and matching fan register) a daemon binary runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Linear,
    Stepped,
}

impl PolicyKind {
    pub fn build(self, settings: &ControlSettings) -> Box<dyn SpeedPolicy> {
        match self {
            PolicyKind::Linear => Box::new(LinearPolicy::new(settings.linear)),
            PolicyKind::Stepped => Box::new(SteppedPolicy::new(settings.steps)),
        }
    }

    pub fn fan_target(self) -> FanTarget {
        match self {
            PolicyKind::Linear => FanTarget::Pwm,
            PolicyKind::Stepped => FanTarget::CoolingState,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> LinearPolicy {
        LinearPolicy::new(LinearBand { min_temp_c: 35.0, max_temp_c: 70.0 })
    }

    fn stepped() -> SteppedPolicy {
        SteppedPolicy::new(StepThresholds { step1: 35, step2: 44, step3: 60, step4: 68 })
    }

    #[test]
    fn test_linear_out_of_band() {
        let p = linear();
        assert_eq!(p.duty_for(30.0), 0);
        assert_eq!(p.duty_for(34.999), 0);
        assert_eq!(p.duty_for(70.0001), 255);
        assert_eq!(p.duty_for(95.0), 255);
    }

    #[test]
    fn test_linear_in_band() {
        let p = linear();
        // floor((17.5 / 35) * 253) + 1
        assert_eq!(p.duty_for(52.5), 127);
        assert_eq!(p.duty_for(35.0), 1);
        assert_eq!(p.duty_for(70.0), 254);
    }

    #[test]
    fn test_linear_in_band_never_zero_or_full() {
        let p = linear();
        let mut t = 35.0;
        while t <= 70.0 {
            let d = p.duty_for(t);
            assert!((1..=254).contains(&d), "duty {} at {}", d, t);
            t += 0.25;
        }
    }

    #[test]
    fn test_linear_ignores_previous() {
        let p = linear();
        assert_eq!(p.evaluate(52.5, DriveLevel::Duty(255)), DriveLevel::Duty(127));
        assert_eq!(p.evaluate(52.5, DriveLevel::Duty(0)), DriveLevel::Duty(127));
        assert_eq!(p.startup_level(), DriveLevel::Duty(0));
    }

    #[test]
    fn test_stepped_bands() {
        let p = stepped();
        let prev = DriveLevel::Step(FanStep::Off);
        assert_eq!(p.evaluate(40.0, prev), DriveLevel::Step(FanStep::Low));
        assert_eq!(p.evaluate(50.0, prev), DriveLevel::Step(FanStep::Mid));
        assert_eq!(p.evaluate(65.0, prev), DriveLevel::Step(FanStep::High));
        assert_eq!(p.evaluate(70.0, prev), DriveLevel::Step(FanStep::Max));
        assert_eq!(p.evaluate(68.0, prev), DriveLevel::Step(FanStep::Max));
    }

    #[test]
    fn test_stepped_boundaries_keep_previous() {
        let p = stepped();
        for prev in [FanStep::Off, FanStep::Low, FanStep::Mid, FanStep::High, FanStep::Max] {
            let prev = DriveLevel::Step(prev);
            for t in [35.0, 44.0, 60.0] {
                assert_eq!(p.evaluate(t, prev), prev, "threshold {}", t);
            }
            assert_eq!(p.evaluate(20.0, prev), prev);
        }
    }

    #[test]
    fn test_stepped_truncates_average() {
        let p = stepped();
        let prev = DriveLevel::Step(FanStep::High);
        // 44.9 truncates onto the STEP2 boundary
        assert_eq!(p.evaluate(44.9, prev), prev);
        assert_eq!(p.evaluate(45.1, prev), DriveLevel::Step(FanStep::Mid));
        assert_eq!(p.evaluate(35.99, prev), prev);
    }

    #[test]
    fn test_quantize_per_policy() {
        assert_eq!(stepped().quantize(44.6), 44.0);
        assert_eq!(stepped().quantize(45.99), 45.0);
        let linear = LinearPolicy::new(LinearBand::default());
        assert_eq!(linear.quantize(44.6), 44.6);
    }

    #[test]
    fn test_step_codes_are_ordinals() {
        assert_eq!(FanStep::Off.code(), 0);
        assert_eq!(FanStep::Low.code(), 1);
        assert_eq!(FanStep::Mid.code(), 2);
        assert_eq!(FanStep::High.code(), 3);
        assert_eq!(FanStep::Max.code(), 4);
        assert_eq!(DriveLevel::Step(FanStep::High).code(), 3);
        assert_eq!(DriveLevel::Duty(127).code(), 127);
        assert!(DriveLevel::Step(FanStep::Off).is_off());
        assert!(!DriveLevel::Duty(1).is_off());
        assert_eq!(DriveLevel::Duty(200).off_like(), DriveLevel::Duty(0));
        assert_eq!(DriveLevel::Step(FanStep::Mid).off_like(), DriveLevel::Step(FanStep::Off));
    }

    #[test]
    fn test_display() {
        assert_eq!(DriveLevel::Duty(127).to_string(), "127");
        assert_eq!(DriveLevel::Step(FanStep::Mid).to_string(), "MID (2)");
    }

    #[test]
    fn test_policy_kind_build() {
        let settings = ControlSettings::default();
        let p = PolicyKind::Linear.build(&settings);
        assert_eq!(p.name(), "linear");
        assert_eq!(p.evaluate(52.5, p.startup_level()), DriveLevel::Duty(127));

        let p = PolicyKind::Stepped.build(&settings);
        assert_eq!(p.name(), "stepped");
        assert_eq!(p.startup_level(), DriveLevel::Step(FanStep::Mid));

        assert_eq!(PolicyKind::Linear.fan_target(), FanTarget::Pwm);
        assert_eq!(PolicyKind::Stepped.fan_target(), FanTarget::CoolingState);
    }
}
