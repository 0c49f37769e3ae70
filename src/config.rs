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

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::constants::{averaging, linear, status, stepped, timing, FALLBACK_TEMPERATURE_C};
use crate::error::{PifanError, Result};

/// Degree band of the continuous policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearBand {
    pub min_temp_c: f64,
    pub max_temp_c: f64,
}

impl Default for LinearBand {
    fn default() -> Self {
        Self {
            min_temp_c: linear::MIN_TEMP_C,
            max_temp_c: linear::MAX_TEMP_C,
        }
    }
}

/// Ordered thresholds of the discrete policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepThresholds {
    pub step1: i64,
    pub step2: i64,
    pub step3: i64,
    pub step4: i64,
}

impl Default for StepThresholds {
    fn default() -> Self {
        Self {
            step1: stepped::STEP1,
            step2: stepped::STEP2,
            step3: stepped::STEP3,
            step4: stepped::STEP4,
        }
    }
}

/// Everything one controller instance runs with.
///
/// `Default` yields the compiled-in constants; tests build their own with
/// zero intervals so nothing sleeps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSettings {
    pub linear: LinearBand,
    pub steps: StepThresholds,
    pub window_size: usize,
    #[serde(serialize_with = "as_millis")]
    pub sample_interval: Duration,
    #[serde(serialize_with = "as_millis")]
    pub reevaluate_interval: Duration,
    #[serde(serialize_with = "as_millis")]
    pub blink_interval: Duration,
    pub blink_cycles: u32,
    pub status_every_ticks: u64,
    pub fallback_temp_c: f64,
    /// Extra device reads for diagnostics in status lines
    pub verbose: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            linear: LinearBand::default(),
            steps: StepThresholds::default(),
            window_size: averaging::WINDOW_SIZE,
            sample_interval: timing::SAMPLE_INTERVAL,
            reevaluate_interval: timing::REEVALUATE_INTERVAL,
            blink_interval: timing::BLINK_INTERVAL,
            blink_cycles: timing::BLINK_CYCLES,
            status_every_ticks: status::STATUS_EVERY_TICKS,
            fallback_temp_c: FALLBACK_TEMPERATURE_C,
            verbose: false,
        }
    }
}

impl ControlSettings {
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PifanError::invalid_config("window_size", "must be at least 1"));
        }
        let band = &self.linear;
        if !band.min_temp_c.is_finite() || !band.max_temp_c.is_finite() {
            return Err(PifanError::invalid_config("linear", "temperatures must be finite"));
        }
        if band.min_temp_c >= band.max_temp_c {
            return Err(PifanError::invalid_config(
                "linear",
                format!("min {} must be below max {}", band.min_temp_c, band.max_temp_c),
            ));
        }
        let s = &self.steps;
        if !(s.step1 < s.step2 && s.step2 < s.step3 && s.step3 < s.step4) {
            return Err(PifanError::invalid_config(
                "steps",
                format!(
                    "thresholds must be strictly ascending, got {} {} {} {}",
                    s.step1, s.step2, s.step3, s.step4
                ),
            ));
        }
        if self.blink_cycles == 0 {
            return Err(PifanError::invalid_config("blink_cycles", "must be at least 1"));
        }
        if self.status_every_ticks == 0 {
            return Err(PifanError::invalid_config("status_every_ticks", "must be at least 1"));
        }
        if !self.fallback_temp_c.is_finite() {
            return Err(PifanError::invalid_config("fallback_temp_c", "must be finite"));
        }
        Ok(())
    }
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let s = ControlSettings::default();
        assert_eq!(s.linear.min_temp_c, 35.0);
        assert_eq!(s.linear.max_temp_c, 70.0);
        assert_eq!(s.steps, StepThresholds { step1: 35, step2: 44, step3: 60, step4: 68 });
        assert_eq!(s.window_size, 20);
        assert_eq!(s.blink_cycles, 6);
        assert_eq!(s.fallback_temp_c, 40.0);
        assert!(!s.verbose);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_window() {
        let s = ControlSettings { window_size: 0, ..Default::default() };
        assert!(matches!(
            s.validate(),
            Err(PifanError::InvalidConfig { field: "window_size", .. })
        ));
    }

    #[test]
    fn test_validate_inverted_band() {
        let s = ControlSettings {
            linear: LinearBand { min_temp_c: 70.0, max_temp_c: 35.0 },
            ..Default::default()
        };
        assert!(s.validate().is_err());

        let s = ControlSettings {
            linear: LinearBand { min_temp_c: 50.0, max_temp_c: 50.0 },
            ..Default::default()
        };
        assert!(s.validate().is_err());

        let s = ControlSettings {
            linear: LinearBand { min_temp_c: f64::NAN, max_temp_c: 50.0 },
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_unordered_steps() {
        let s = ControlSettings {
            steps: StepThresholds { step1: 35, step2: 60, step3: 44, step4: 68 },
            ..Default::default()
        };
        assert!(matches!(
            s.validate(),
            Err(PifanError::InvalidConfig { field: "steps", .. })
        ));

        let s = ControlSettings {
            steps: StepThresholds { step1: 35, step2: 35, step3: 60, step4: 68 },
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_zero_cadences() {
        let s = ControlSettings { blink_cycles: 0, ..Default::default() };
        assert!(s.validate().is_err());
        let s = ControlSettings { status_every_ticks: 0, ..Default::default() };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_serializes_durations_as_millis() {
        let json = serde_json::to_value(ControlSettings::default()).unwrap();
        assert_eq!(json["sample_interval"], 1000);
        assert_eq!(json["reevaluate_interval"], 2000);
        assert_eq!(json["blink_interval"], 200);
        assert_eq!(json["steps"]["step4"], 68);
    }
}
