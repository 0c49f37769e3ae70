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

//! Fan stall supervision
//!
//! A fan that is commanded to spin but reports 0 RPM is stalled. The first
//! decision tick that sees a stall blinks the indicator and leaves it on;
//! later ticks with the fan still stalled do nothing, so a dead fan does
//! not blink on every tick. The indicator is switched off once the fan
//! reports motion again while the indicator is still observed on.
//!
//! Stalls are an operating condition, not an error: nothing here aborts
//! the loop except a failing device access.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ControlSettings;
use crate::device::FanDevice;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultState {
    Normal,
    Faulted,
}

/// Outcome of one supervision check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTransition {
    Unchanged,
    Entered,
    Cleared,
}

#[derive(Debug, Clone)]
pub struct FaultSupervisor {
    state: FaultState,
    blink_cycles: u32,
    blink_interval: Duration,
}

impl FaultSupervisor {
    pub fn new(blink_cycles: u32, blink_interval: Duration) -> Self {
        Self {
            state: FaultState::Normal,
            blink_cycles,
            blink_interval,
        }
    }

    pub fn from_settings(settings: &ControlSettings) -> Self {
        Self::new(settings.blink_cycles, settings.blink_interval)
    }

    pub fn state(&self) -> FaultState {
        self.state
    }

    pub fn is_faulted(&self) -> bool {
        self.state == FaultState::Faulted
    }

    /// Check one decision tick. `commanded` is the level code sent to the
    /// fan, `rpm` the tachometer reading taken for this tick.
    pub fn observe<D: FanDevice + ?Sized>(
        &mut self,
        device: &mut D,
        commanded: u32,
        rpm: u32,
    ) -> Result<FaultTransition> {
        if commanded == 0 {
            return Ok(FaultTransition::Unchanged);
        }

        match self.state {
            FaultState::Normal if rpm == 0 => {
                warn!(commanded, rpm, "Fan stall: commanded to spin but not turning");
                self.blink(device)?;
                self.state = FaultState::Faulted;
                Ok(FaultTransition::Entered)
            }
            FaultState::Faulted if rpm != 0 => {
                if device.read_indicator()? == 0 {
                    debug!(rpm, "Fan turning again but indicator already off; fault kept");
                    return Ok(FaultTransition::Unchanged);
                }
                device.write_indicator(false)?;
                self.state = FaultState::Normal;
                info!(commanded, rpm, "Fan stall cleared");
                Ok(FaultTransition::Cleared)
            }
            _ => Ok(FaultTransition::Unchanged),
        }
    }

    /// Attention sequence, ends with the indicator solid on
    fn blink<D: FanDevice + ?Sized>(&self, device: &mut D) -> Result<()> {
        for _ in 0..self.blink_cycles {
            device.write_indicator(true)?;
            thread::sleep(self.blink_interval);
            device.write_indicator(false)?;
            thread::sleep(self.blink_interval);
        }
        device.write_indicator(true)
    }
}
