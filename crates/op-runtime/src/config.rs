// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! enabled_devices = ["cpu"]
//! default_device = "cpu"
//! default_device_id = 0
//! ```

use crate::{DeviceType, RuntimeError};
use std::path::Path;

/// Configuration for building a [`crate::Registry`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Device kinds to register, by name (`"cpu"`, `"nvidia"`, ...).
    #[serde(default = "default_devices")]
    pub enabled_devices: Vec<String>,
    /// Device kind used for [`crate::Registry::default_handle`].
    #[serde(default = "default_device")]
    pub default_device: String,
    /// Device ordinal used for [`crate::Registry::default_handle`].
    #[serde(default)]
    pub default_device_id: usize,
}

fn default_devices() -> Vec<String> {
    vec![default_device()]
}

fn default_device() -> String {
    DeviceType::Cpu.to_string()
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Parses `enabled_devices` into device kinds, preserving order.
    pub fn parse_devices(&self) -> Result<Vec<DeviceType>, RuntimeError> {
        self.enabled_devices
            .iter()
            .map(|name| name.parse::<DeviceType>().map_err(RuntimeError::ConfigError))
            .collect()
    }

    /// Parses `default_device`.
    pub fn parse_default_device(&self) -> Result<DeviceType, RuntimeError> {
        self.default_device
            .parse::<DeviceType>()
            .map_err(RuntimeError::ConfigError)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            enabled_devices: default_devices(),
            default_device: default_device(),
            default_device_id: 0,
        }
    }
}
