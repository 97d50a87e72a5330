// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

pub mod bench;
pub mod devices;
pub mod plan;
pub mod rearrange;

use std::path::Path;

use anyhow::Context;
use op_runtime::{Registry, RuntimeConfig};
use tensor_core::{DType, TensorDesc};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the device registry from `--config`, or the CPU-only default.
pub fn load_registry(config: Option<&Path>) -> anyhow::Result<Registry> {
    let config = match config {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    tracing::info!(
        devices = ?config.enabled_devices,
        default = %config.default_device,
        "runtime configuration"
    );
    Ok(Registry::from_config(&config)?)
}

pub fn parse_dtype(s: &str) -> anyhow::Result<DType> {
    s.parse::<DType>().map_err(anyhow::Error::msg)
}

/// Parses a comma-separated extent list. An empty string is a scalar.
pub fn parse_shape(s: &str) -> anyhow::Result<Vec<usize>> {
    parse_list(s).with_context(|| format!("invalid shape '{s}'"))
}

/// Parses a comma-separated signed stride list.
pub fn parse_strides(s: &str) -> anyhow::Result<Vec<isize>> {
    parse_list(s).with_context(|| format!("invalid strides '{s}'"))
}

/// Parses `SHAPE[:STRIDES]`; a layout without strides is row-major packed.
pub fn parse_layout(s: &str, dtype: DType) -> anyhow::Result<TensorDesc> {
    match s.split_once(':') {
        Some((shape, strides)) => {
            Ok(TensorDesc::new(dtype, parse_shape(shape)?, parse_strides(strides)?)?)
        }
        None => Ok(TensorDesc::contiguous(dtype, parse_shape(s)?)),
    }
}

fn parse_list<T>(s: &str) -> anyhow::Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|part| part.trim().parse::<T>().map_err(anyhow::Error::from))
        .collect()
}
