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

//! Helpers shared by the unit tests

use std::time::{Duration, Instant};

use crate::config::ControlSettings;
use crate::control::Controller;
use crate::device::MemoryDevice;
use crate::policy::PolicyKind;

/// Default settings with every sleep removed and every sample a decision
pub fn test_settings() -> ControlSettings {
    ControlSettings {
        sample_interval: Duration::ZERO,
        reevaluate_interval: Duration::ZERO,
        blink_interval: Duration::ZERO,
        ..ControlSettings::default()
    }
}

pub fn linear_controller(device: MemoryDevice) -> Controller<MemoryDevice> {
    let settings = test_settings();
    Controller::new(device, PolicyKind::Linear.build(&settings), settings).unwrap()
}

pub fn stepped_controller(device: MemoryDevice) -> Controller<MemoryDevice> {
    let settings = test_settings();
    Controller::new(device, PolicyKind::Stepped.build(&settings), settings).unwrap()
}

/// Monotonic instants one second apart
pub struct Ticker {
    start: Instant,
    n: u32,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker {
    pub fn new() -> Self {
        Self { start: Instant::now(), n: 0 }
    }

    pub fn advance(&mut self) -> Instant {
        let t = self.start + Duration::from_secs(u64::from(self.n));
        self.n += 1;
        t
    }
}
