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

//! Device access
//!
//! The control loop talks to hardware only through [`FanDevice`]. The
//! sysfs implementation drives a real board; the in-memory one backs the
//! tests and dry runs.

mod memory;
mod sysfs;

pub use memory::MemoryDevice;
pub use sysfs::{SysfsDevice, SysfsPaths};

use crate::error::Result;

/// Which register carries the fan command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanTarget {
    /// hwmon PWM duty, 0-255
    Pwm,
    /// Thermal cooling device state, 0-4
    CoolingState,
}

/// Reads and writes the control loop needs.
///
/// Every error is fatal to the loop except [`PifanError::Malformed`]
/// from `read_temperature`, which the loop replaces with a fallback.
///
/// [`PifanError::Malformed`]: crate::error::PifanError::Malformed
#[cfg_attr(test, mockall::automock)]
pub trait FanDevice {
    /// CPU temperature in degrees Celsius
    fn read_temperature(&mut self) -> Result<f64>;

    fn read_fan_level(&mut self) -> Result<u32>;

    fn write_fan_level(&mut self, level: u32) -> Result<()>;

    /// Tachometer, 0 means the fan is not turning
    fn read_tachometer(&mut self) -> Result<u32>;

    /// Indicator brightness, nonzero means on
    fn read_indicator(&mut self) -> Result<u32>;

    fn write_indicator(&mut self, on: bool) -> Result<()>;
}
