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

//! Unified error handling for Pifan
//!
//! A single thiserror enum covers device access, settings validation and
//! process setup. Only `Malformed` temperature reads are recovered by the
//! control loop; everything else ends it.

use std::io;
use std::path::PathBuf;

/// Result type alias using PifanError
pub type Result<T> = std::result::Result<T, PifanError>;

#[derive(thiserror::Error, Debug)]
pub enum PifanError {
    // ============================================================================
    // Device Access Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Malformed content in {path}: {content:?}")]
    Malformed {
        path: PathBuf,
        content: String,
    },

    #[error("Hardware not found: {0}")]
    HardwareNotFound(String),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    // ============================================================================
    // Process Errors
    // ============================================================================
    #[error("Failed to install signal handler: {0}")]
    Signal(String),
}

impl PifanError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// True when the device answered but its content was not a number
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
