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

//! Pifan - closed-loop CPU fan control for single-board computers
//!
//! Samples the CPU temperature, smooths it over a sliding window, maps the
//! average to a fan drive level and writes it to sysfs, while watching the
//! tachometer for a stalled fan and signalling it on the power LED.

pub mod cli;
pub mod config;
pub mod constants;
pub mod control;
pub mod device;
pub mod error;
pub mod fault;
pub mod logger;
pub mod policy;
pub mod window;

pub use config::ControlSettings;
pub use control::{Controller, TickReport};
pub use device::{FanDevice, FanTarget, MemoryDevice, SysfsDevice, SysfsPaths};
pub use error::{PifanError, Result};
pub use fault::{FaultState, FaultSupervisor, FaultTransition};
pub use policy::{DriveLevel, FanStep, LinearPolicy, PolicyKind, SpeedPolicy, SteppedPolicy};
pub use window::SlidingWindow;

#[cfg(test)]
pub mod test_utils;
