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

use std::collections::VecDeque;

use super::FanDevice;
use crate::error::{PifanError, Result};

/// Stand-in for the hardware, entirely in memory.
///
/// Temperatures are served from a script queue; the last entry repeats
/// once the queue is drained. `None` entries simulate a malformed read.
#[derive(Debug, Clone, Default)]
pub struct MemoryDevice {
    temperatures: VecDeque<Option<f64>>,
    last_temperature: Option<f64>,
    pub fan_level: u32,
    pub tachometer: u32,
    pub indicator: u32,
    pub fan_writes: Vec<u32>,
    pub indicator_writes: Vec<bool>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device that reports `temp_c` on every read
    pub fn with_temperature(temp_c: f64) -> Self {
        let mut dev = Self::new();
        dev.push_temperatures([temp_c]);
        dev
    }

    pub fn push_temperatures(&mut self, temps: impl IntoIterator<Item = f64>) {
        self.temperatures.extend(temps.into_iter().map(Some));
    }

    /// Queue one unparseable temperature read
    pub fn push_malformed(&mut self) {
        self.temperatures.push_back(None);
    }

    pub fn indicator_on(&self) -> bool {
        self.indicator != 0
    }

    pub fn clear_write_log(&mut self) {
        self.fan_writes.clear();
        self.indicator_writes.clear();
    }
}

impl FanDevice for MemoryDevice {
    fn read_temperature(&mut self) -> Result<f64> {
        match self.temperatures.pop_front() {
            Some(Some(t)) => {
                self.last_temperature = Some(t);
                Ok(t)
            }
            Some(None) => Err(PifanError::malformed("memory:temperature", "")),
            None => self
                .last_temperature
                .ok_or_else(|| PifanError::HardwareNotFound("no temperature scripted".into())),
        }
    }

    fn read_fan_level(&mut self) -> Result<u32> {
        Ok(self.fan_level)
    }

    fn write_fan_level(&mut self, level: u32) -> Result<()> {
        self.fan_level = level;
        self.fan_writes.push(level);
        Ok(())
    }

    fn read_tachometer(&mut self) -> Result<u32> {
        Ok(self.tachometer)
    }

    fn read_indicator(&mut self) -> Result<u32> {
        Ok(self.indicator)
    }

    fn write_indicator(&mut self, on: bool) -> Result<()> {
        self.indicator = u32::from(on);
        self.indicator_writes.push(on);
        Ok(())
    }
}
