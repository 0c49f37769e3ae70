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

//! Log setup
//!
//! Logs go to the systemd journal when its socket exists and to stdout
//! otherwise. `PIFAN_LOG` overrides the level picked by the debug switch.

use std::path::Path;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::constants::process::{JOURNALD_SOCKET, LOG_ENV};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Journald,
    Stdout,
}

impl LogSink {
    pub fn describe(self) -> &'static str {
        match self {
            LogSink::Journald => "systemd journal",
            LogSink::Stdout => "stdout",
        }
    }
}

/// Filter directive for the given debug switch and `PIFAN_LOG` value
pub fn filter_directive(verbose: bool, env_override: Option<String>) -> String {
    match env_override {
        Some(level) if !level.trim().is_empty() => level,
        _ if verbose => "debug".to_string(),
        _ => "info".to_string(),
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(verbose: bool) -> LogSink {
    let directive = filter_directive(verbose, std::env::var(LOG_ENV).ok());

    if Path::new(JOURNALD_SOCKET).exists() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(EnvFilter::new(&directive))
                    .init();
                return LogSink::Journald;
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stdout", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::new(&directive))
        .init();
    LogSink::Stdout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_from_switch() {
        assert_eq!(filter_directive(false, None), "info");
        assert_eq!(filter_directive(true, None), "debug");
    }

    #[test]
    fn test_filter_directive_env_override() {
        assert_eq!(filter_directive(false, Some("trace".into())), "trace");
        assert_eq!(filter_directive(true, Some("warn".into())), "warn");
        assert_eq!(filter_directive(true, Some("  ".into())), "debug");
    }

    #[test]
    fn test_sink_description() {
        assert_eq!(LogSink::Journald.describe(), "systemd journal");
        assert_eq!(LogSink::Stdout.describe(), "stdout");
    }
}
