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

//! Daemon entry point shared by the binaries
//!
//! Each binary picks a policy and hands control here: argument parsing,
//! logging, signal handling, hardware discovery, then the control loop.

use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tracing::{debug, error, info, warn};

use crate::config::ControlSettings;
use crate::constants::paths::SYS_ROOT;
use crate::constants::process::{EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_USAGE, LOG_ENV};
use crate::control::Controller;
use crate::device::{SysfsDevice, SysfsPaths};
use crate::error::PifanError;
use crate::logger;
use crate::policy::PolicyKind;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Raised by the signal handler, polled by the control loop
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn interrupt_flag() -> &'static AtomicBool {
    &INTERRUPTED
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run { debug: bool },
    Help,
    Version,
}

pub fn parse_args<I, S>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut debug = false;
    for arg in args {
        match arg.as_ref() {
            "-d" | "--debug" => debug = true,
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(Command::Run { debug })
}

fn print_help(bin: &str, kind: PolicyKind) {
    let mode = match kind {
        PolicyKind::Linear => "continuous PWM duty",
        PolicyKind::Stepped => "stepped cooling states",
    };
    eprintln!("{} {} - CPU fan control daemon ({})", bin, VERSION, mode);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    {} [OPTIONS]", bin);
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -d, --debug      Verbose logging");
    eprintln!("    -V, --version    Print version");
    eprintln!("    -h, --help       Print this help");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("    {}        Log level (trace, debug, info, warn, error)", LOG_ENV);
}

/// Run a daemon binary to completion and map the outcome to an exit code
pub fn main_with(bin: &str, kind: PolicyKind) -> ExitCode {
    let debug = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run { debug }) => debug,
        Ok(Command::Help) => {
            print_help(bin, kind);
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("{} {}", bin, VERSION);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", e);
            print_help(bin, kind);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let sink = logger::init(debug);
    info!("STARTUP: {} {} starting", bin, VERSION);
    info!("STARTUP: Logging to {}", sink.describe());

    match run(kind, debug) {
        Ok(()) => {
            info!("Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Returns `Ok` only after an interrupt; the loop has no other way out
fn run(kind: PolicyKind, verbose: bool) -> anyhow::Result<()> {
    check_privileges();
    install_interrupt_handler().context("setting up signal handling")?;

    let settings = ControlSettings::default().with_verbose(verbose);
    let settings_json = serde_json::to_string(&settings).context("serializing settings")?;
    info!("STARTUP: Settings {}", settings_json);

    let paths = SysfsPaths::discover(Path::new(SYS_ROOT), kind.fan_target())
        .context("locating fan hardware")?;
    info!(
        temperature = %paths.temperature.display(),
        fan_level = %paths.fan_level.display(),
        tachometer = %paths.tachometer.display(),
        indicator = %paths.indicator.display(),
        "STARTUP: Device files"
    );

    let policy = kind.build(&settings);
    let mut controller = Controller::new(SysfsDevice::new(paths), policy, settings)
        .context("building controller")?;
    controller.run(interrupt_flag()).context("control loop failed")?;
    Ok(())
}

fn check_privileges() {
    // SAFETY: geteuid is always safe - it just returns the effective user ID of the process.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        warn!(
            euid,
            "Not running as root; writes to the fan and LED registers will fail"
        );
    } else {
        debug!("Running as root");
    }
}

fn install_interrupt_handler() -> Result<(), PifanError> {
    ctrlc::set_handler(|| {
        // A second signal while the loop is blocked (sleep or blink) exits at once
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
    })
    .map_err(|e| PifanError::Signal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemoryDevice;
    use crate::test_utils::linear_controller;
    use serial_test::serial;

    #[test]
    fn test_parse_no_args() {
        let args: [&str; 0] = [];
        assert_eq!(parse_args(args), Ok(Command::Run { debug: false }));
    }

    #[test]
    fn test_parse_debug() {
        assert_eq!(parse_args(["--debug"]), Ok(Command::Run { debug: true }));
        assert_eq!(parse_args(["-d"]), Ok(Command::Run { debug: true }));
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(parse_args(["-h"]), Ok(Command::Help));
        assert_eq!(parse_args(["--debug", "--version"]), Ok(Command::Version));
    }

    #[test]
    fn test_parse_unknown() {
        let err = parse_args(["--fast"]).unwrap_err();
        assert!(err.contains("--fast"));
    }

    #[test]
    #[serial]
    fn test_interrupt_flag_stops_loop() {
        let flag = interrupt_flag();
        flag.store(true, Ordering::SeqCst);
        let mut c = linear_controller(MemoryDevice::with_temperature(45.0));
        assert!(c.run(flag).is_ok());
        assert_eq!(c.ticks(), 0);
        flag.store(false, Ordering::SeqCst);
    }
}
