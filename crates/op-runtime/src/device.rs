// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device kinds and execution streams.

use std::fmt;
use std::str::FromStr;

/// Every device kind an operator can be dispatched to.
///
/// Only kinds with a compiled backend can be registered; see
/// [`crate::Registry::from_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Cpu,
    Nvidia,
    Cambricon,
    Ascend,
    Metax,
    Moore,
    Iluvatar,
    Kunlun,
    Sugon,
}

impl DeviceType {
    pub const ALL: [DeviceType; 9] = [
        DeviceType::Cpu,
        DeviceType::Nvidia,
        DeviceType::Cambricon,
        DeviceType::Ascend,
        DeviceType::Metax,
        DeviceType::Moore,
        DeviceType::Iluvatar,
        DeviceType::Kunlun,
        DeviceType::Sugon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Cpu => "cpu",
            DeviceType::Nvidia => "nvidia",
            DeviceType::Cambricon => "cambricon",
            DeviceType::Ascend => "ascend",
            DeviceType::Metax => "metax",
            DeviceType::Moore => "moore",
            DeviceType::Iluvatar => "iluvatar",
            DeviceType::Kunlun => "kunlun",
            DeviceType::Sugon => "sugon",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DeviceType::ALL
            .into_iter()
            .find(|d| d.as_str() == lower)
            .ok_or_else(|| {
                let known: Vec<&str> = DeviceType::ALL.iter().map(|d| d.as_str()).collect();
                format!("unknown device '{s}'; expected one of {}", known.join(", "))
            })
    }
}

/// An execution queue on one device.
///
/// The CPU backend runs every launch synchronously, so a stream only pins
/// which device an execute may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stream {
    device: DeviceType,
    device_id: usize,
}

impl Stream {
    pub(crate) fn new(device: DeviceType, device_id: usize) -> Self {
        Self { device, device_id }
    }

    pub fn device(&self) -> DeviceType {
        self.device
    }

    pub fn device_id(&self) -> usize {
        self.device_id
    }
}
