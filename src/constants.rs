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

//! Constants and configuration values for Pifan
//!
//! Centralizes the thresholds, device paths and cadences the daemon runs
//! with. There is no configuration file: changing behavior means changing
//! a value here and rebuilding.

/// Temperature substituted for a reading whose content cannot be parsed.
pub const FALLBACK_TEMPERATURE_C: f64 = 40.0;

/// sysfs locations used by the Raspberry Pi 5 fan stack
pub mod paths {
    /// Root of the sysfs mount; discovery is relative to this
    pub const SYS_ROOT: &str = "/sys";

    /// CPU thermal zone, reported in millidegrees Celsius
    pub const THERMAL_ZONE_TEMP: &str = "class/thermal/thermal_zone0/temp";

    /// Directory holding the hwmon chips
    pub const HWMON_ROOT: &str = "class/hwmon";

    /// Content of the `name` file of the fan's hwmon chip
    pub const FAN_HWMON_NAME: &str = "pwmfan";

    /// hwmon directory used when no chip reports `FAN_HWMON_NAME`
    pub const FALLBACK_HWMON: &str = "hwmon1";

    /// PWM duty register inside the fan hwmon directory (0-255)
    pub const PWM_FILE: &str = "pwm1";

    /// Tachometer inside the fan hwmon directory (RPM, 0 = stopped)
    pub const TACHOMETER_FILE: &str = "fan1_input";

    /// Thermal cooling device state register (0-4)
    pub const COOLING_STATE: &str = "class/thermal/cooling_device0/cur_state";

    /// Power LED brightness, used as the fault indicator
    pub const INDICATOR_LED: &str = "class/leds/PWR/brightness";
}

/// Continuous (PWM duty) policy band
pub mod linear {
    /// Below this average the fan is off
    pub const MIN_TEMP_C: f64 = 35.0;

    /// Above this average the fan runs at `DUTY_MAX`
    pub const MAX_TEMP_C: f64 = 70.0;

    /// Full duty
    pub const DUTY_MAX: u8 = 255;

    /// In-band duties span 1..=DUTY_SPAN+1, keeping 0 and 255 for out-of-band
    pub const DUTY_SPAN: f64 = 253.0;
}

/// Discrete (cooling state) policy thresholds, in whole degrees Celsius
pub mod stepped {
    pub const STEP1: i64 = 35;
    pub const STEP2: i64 = 44;
    pub const STEP3: i64 = 60;
    pub const STEP4: i64 = 68;
}

/// Loop cadences
pub mod timing {
    use std::time::Duration;

    /// Sleep at the top of every loop iteration
    pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

    /// Minimum time between two fan decisions
    pub const REEVALUATE_INTERVAL: Duration = Duration::from_secs(2);

    /// Half-period of the fault blink
    pub const BLINK_INTERVAL: Duration = Duration::from_millis(200);

    /// Number of on/off cycles shown when a stall is first detected
    pub const BLINK_CYCLES: u32 = 6;
}

/// Smoothing window
pub mod averaging {
    /// Number of samples averaged (one per `SAMPLE_INTERVAL`)
    pub const WINDOW_SIZE: usize = 20;
}

/// Status logging
pub mod status {
    /// A status line is logged on every Nth decision tick
    pub const STATUS_EVERY_TICKS: u64 = 3;
}

/// Environment and process surface
pub mod process {
    /// Environment variable overriding the log filter
    pub const LOG_ENV: &str = "PIFAN_LOG";

    /// systemd journal socket; when present logs go to the journal
    pub const JOURNALD_SOCKET: &str = "/run/systemd/journal/socket";

    /// Exit code after an interrupt (128 + SIGINT)
    pub const EXIT_INTERRUPTED: u8 = 130;

    /// Exit code for a fatal device or setup error
    pub const EXIT_FAILURE: u8 = 1;

    /// Exit code for bad arguments
    pub const EXIT_USAGE: u8 = 2;
}
