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

//! Fan control loop
//!
//! One sequential loop owns all control state: it samples the temperature
//! every `sample_interval`, and on every decision tick (at most once per
//! `reevaluate_interval`) maps the window mean to a drive level, applies
//! it when the device disagrees, and hands the tachometer reading to the
//! stall supervisor.
//!
//! # Failure semantics
//! - An unparseable temperature is replaced by `fallback_temp_c`.
//! - Any other device error ends the loop; the service manager restarts
//!   the daemon.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::ControlSettings;
use crate::device::FanDevice;
use crate::error::Result;
use crate::fault::{FaultState, FaultSupervisor, FaultTransition};
use crate::policy::{DriveLevel, SpeedPolicy};
use crate::window::SlidingWindow;

/// What happened on one decision tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub smoothed: f64,
    pub level: DriveLevel,
    /// The level differed from the last applied one
    pub changed: bool,
    /// The device register was written
    pub wrote: bool,
    pub rpm: u32,
    pub fault: FaultTransition,
}

pub struct Controller<D: FanDevice> {
    device: D,
    policy: Box<dyn SpeedPolicy>,
    settings: ControlSettings,
    window: SlidingWindow,
    supervisor: FaultSupervisor,
    /// Policy memory, fed back as "previous" on the next decision
    candidate: DriveLevel,
    last_applied: DriveLevel,
    last_evaluation: Option<Instant>,
    ticks: u64,
}

impl<D: FanDevice> Controller<D> {
    pub fn new(device: D, policy: Box<dyn SpeedPolicy>, settings: ControlSettings) -> Result<Self> {
        settings.validate()?;
        let candidate = policy.startup_level();
        Ok(Self {
            device,
            window: SlidingWindow::new(settings.window_size),
            supervisor: FaultSupervisor::from_settings(&settings),
            last_applied: candidate.off_like(),
            candidate,
            policy,
            settings,
            last_evaluation: None,
            ticks: 0,
        })
    }

    /// Run until `stop` is raised. Returns `Ok(())` only on interruption.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<()> {
        info!(
            policy = self.policy.name(),
            window = self.settings.window_size,
            "Control loop started"
        );
        loop {
            thread::sleep(self.settings.sample_interval);
            if stop.load(Ordering::SeqCst) {
                info!("Control loop stopped");
                return Ok(());
            }
            self.step(Instant::now())?;
        }
    }

    /// One loop iteration without the sleep: sample, then decide if due.
    ///
    /// The first call always decides; afterwards a decision is made once
    /// `reevaluate_interval` has elapsed since the previous one.
    pub fn step(&mut self, now: Instant) -> Result<Option<TickReport>> {
        self.sample()?;

        if let Some(last) = self.last_evaluation {
            if now.saturating_duration_since(last) < self.settings.reevaluate_interval {
                return Ok(None);
            }
        }
        self.last_evaluation = Some(now);
        self.evaluate().map(Some)
    }

    fn sample(&mut self) -> Result<f64> {
        let temp = match self.device.read_temperature() {
            Ok(t) => t,
            Err(e) if e.is_malformed() => {
                warn!(
                    error = %e,
                    fallback = self.settings.fallback_temp_c,
                    "Unreadable temperature, using fallback"
                );
                self.settings.fallback_temp_c
            }
            Err(e) => return Err(e),
        };
        let temp = self.policy.quantize(temp);
        self.window.append(temp);
        Ok(temp)
    }

    fn evaluate(&mut self) -> Result<TickReport> {
        // sample() always precedes evaluate(), so the window is never empty here
        let smoothed = self.window.mean().unwrap_or(self.settings.fallback_temp_c);
        let level = self.policy.evaluate(smoothed, self.candidate);
        self.candidate = level;

        let changed = level != self.last_applied;
        if changed {
            info!(
                previous = %self.last_applied,
                new = %level,
                temp_c = smoothed,
                "Updating fan speed"
            );
            if self.settings.verbose {
                let device_level = self.device.read_fan_level()?;
                debug!(device_level, "Fan level before update");
            }
            self.last_applied = level;
        }

        let code = level.code();
        let wrote = self.device.read_fan_level()? != code;
        if wrote {
            self.device.write_fan_level(code)?;
            debug!(level = code, "Fan level applied");
        }

        let rpm = self.device.read_tachometer()?;
        let fault = self.supervisor.observe(&mut self.device, code, rpm)?;

        self.ticks += 1;
        if self.ticks % self.settings.status_every_ticks == 0 {
            self.log_status(smoothed, rpm)?;
        }

        Ok(TickReport {
            smoothed,
            level,
            changed,
            wrote,
            rpm,
            fault,
        })
    }

    fn log_status(&mut self, smoothed: f64, rpm: u32) -> Result<()> {
        info!(
            temp_c = smoothed,
            level = %self.last_applied,
            fault = ?self.supervisor.state(),
            "Status"
        );
        if self.settings.verbose {
            let device_level = self.device.read_fan_level()?;
            debug!(
                device_level,
                rpm,
                window = ?self.window.to_vec(),
                "Status detail"
            );
        }
        Ok(())
    }

    pub fn last_applied(&self) -> DriveLevel {
        self.last_applied
    }

    pub fn fault_state(&self) -> FaultState {
        self.supervisor.state()
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }
}
