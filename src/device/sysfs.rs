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

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{FanDevice, FanTarget};
use crate::constants::paths;
use crate::error::{PifanError, Result};

/// Files the sysfs device reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsPaths {
    pub temperature: PathBuf,
    pub fan_level: PathBuf,
    pub tachometer: PathBuf,
    pub indicator: PathBuf,
}

impl SysfsPaths {
    /// Resolve the fan's hwmon chip under `sys_root` and build the paths.
    ///
    /// hwmon numbering is not stable across boots, so the chip is found by
    /// its `name` file; `hwmon1` is used when no chip matches.
    pub fn discover(sys_root: &Path, target: FanTarget) -> Result<Self> {
        let hwmon = resolve_fan_hwmon(sys_root)?;
        let fan_level = match target {
            FanTarget::Pwm => hwmon.join(paths::PWM_FILE),
            FanTarget::CoolingState => sys_root.join(paths::COOLING_STATE),
        };
        Ok(Self {
            temperature: sys_root.join(paths::THERMAL_ZONE_TEMP),
            fan_level,
            tachometer: hwmon.join(paths::TACHOMETER_FILE),
            indicator: sys_root.join(paths::INDICATOR_LED),
        })
    }
}

fn resolve_fan_hwmon(sys_root: &Path) -> Result<PathBuf> {
    let root = sys_root.join(paths::HWMON_ROOT);
    let mut dirs: Vec<PathBuf> = match fs::read_dir(&root) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(PifanError::read(root, e)),
    };
    // Stable order so the first match is deterministic
    dirs.sort();

    for dir in &dirs {
        if let Ok(name) = read_trimmed(dir.join("name")) {
            if name == paths::FAN_HWMON_NAME {
                info!("Fan hwmon chip {} at {}", name, dir.display());
                return Ok(dir.clone());
            }
        }
    }

    let fallback = root.join(paths::FALLBACK_HWMON);
    if fallback.is_dir() {
        info!(
            "No hwmon chip named {}, using {}",
            paths::FAN_HWMON_NAME,
            fallback.display()
        );
        return Ok(fallback);
    }

    Err(PifanError::HardwareNotFound(format!(
        "no hwmon chip named {} under {}",
        paths::FAN_HWMON_NAME,
        root.display()
    )))
}

fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

/// Fan device backed by plain sysfs attribute files
#[derive(Debug, Clone)]
pub struct SysfsDevice {
    paths: SysfsPaths,
}

impl SysfsDevice {
    pub fn new(paths: SysfsPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &SysfsPaths {
        &self.paths
    }

    fn read(path: &Path) -> Result<String> {
        read_trimmed(path).map_err(|e| PifanError::read(path, e))
    }

    fn read_u32(path: &Path) -> Result<u32> {
        let raw = Self::read(path)?;
        raw.parse::<u32>()
            .map_err(|_| PifanError::malformed(path, raw))
    }

    fn write(path: &Path, value: &str) -> Result<()> {
        fs::write(path, value).map_err(|e| PifanError::write(path, e))
    }
}

impl FanDevice for SysfsDevice {
    fn read_temperature(&mut self) -> Result<f64> {
        let path = &self.paths.temperature;
        let raw = Self::read(path)?;
        // thermal_zone reports millidegrees Celsius
        match raw.parse::<f64>() {
            Ok(millidegrees) if millidegrees.is_finite() => Ok(millidegrees / 1000.0),
            _ => Err(PifanError::malformed(path, raw)),
        }
    }

    fn read_fan_level(&mut self) -> Result<u32> {
        Self::read_u32(&self.paths.fan_level)
    }

    fn write_fan_level(&mut self, level: u32) -> Result<()> {
        Self::write(&self.paths.fan_level, &level.to_string())?;
        debug!(path = %self.paths.fan_level.display(), level, "Fan level written");
        Ok(())
    }

    fn read_tachometer(&mut self) -> Result<u32> {
        Self::read_u32(&self.paths.tachometer)
    }

    fn read_indicator(&mut self) -> Result<u32> {
        Self::read_u32(&self.paths.indicator)
    }

    fn write_indicator(&mut self, on: bool) -> Result<()> {
        Self::write(&self.paths.indicator, if on { "1" } else { "0" })
    }
}
