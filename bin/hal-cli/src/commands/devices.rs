// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `hal devices` command: show which backends the configuration registers.
//!
//! Every known device kind is listed; kinds without a backend compiled into
//! this build are marked as unavailable.

use std::path::PathBuf;

use op_runtime::{compiled_backend, DeviceType};

use super::load_registry;

pub fn execute(config: Option<PathBuf>) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              hal · Registered Devices               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let registry = load_registry(config.as_deref())?;
    let default = registry.default_handle()?;

    println!("  {:<12} {:>8} {:>10} {:>9}", "device", "count", "status", "default");
    println!("  {}", "─".repeat(42));
    for device in DeviceType::ALL {
        let (count, status) = match registry.backend(device) {
            Some(backend) => (backend.device_count().to_string(), "active"),
            None if compiled_backend(device).is_some() => ("-".to_string(), "disabled"),
            None => ("-".to_string(), "unavailable"),
        };
        let marker = if device == default.device() {
            format!("id {}", default.device_id())
        } else {
            String::new()
        };
        println!("  {:<12} {:>8} {:>10} {:>9}", device.as_str(), count, status, marker);
    }
    Ok(())
}
