// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Backend registry and device handles.

use crate::cpu::CpuBackend;
use crate::{Backend, DeviceType, RuntimeConfig, RuntimeError, Stream};
use std::collections::HashMap;
use std::sync::Arc;
use tensor_core::OpError;

/// A device selected for operator creation.
///
/// Cheap to clone; every clone shares the same backend.
#[derive(Debug, Clone)]
pub struct Handle {
    device: DeviceType,
    device_id: usize,
    backend: Arc<dyn Backend>,
}

impl Handle {
    pub fn device(&self) -> DeviceType {
        self.device
    }

    pub fn device_id(&self) -> usize {
        self.device_id
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Creates a stream bound to this handle's device.
    pub fn create_stream(&self) -> Stream {
        Stream::new(self.device, self.device_id)
    }
}

/// Returns the backend compiled into this build for `device`, if any.
pub fn compiled_backend(device: DeviceType) -> Option<Arc<dyn Backend>> {
    match device {
        DeviceType::Cpu => Some(Arc::new(CpuBackend::new())),
        _ => None,
    }
}

/// Maps device kinds to backends.
///
/// # Example
/// ```
/// use op_runtime::{DeviceType, Registry};
///
/// let registry = Registry::with_cpu();
/// let handle = registry.handle(DeviceType::Cpu, 0).unwrap();
/// assert_eq!(handle.device(), DeviceType::Cpu);
/// assert!(registry.handle(DeviceType::Nvidia, 0).is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Registry {
    backends: HashMap<DeviceType, Arc<dyn Backend>>,
    default_device: DeviceType,
    default_device_id: usize,
}

impl Registry {
    /// Creates an empty registry whose default device is CPU 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with only the CPU backend.
    pub fn with_cpu() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CpuBackend::new()));
        registry
    }

    /// Builds a registry from configuration.
    ///
    /// Enabled kinds without a compiled backend are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`RuntimeError::ConfigError`] for unknown device names or when
    /// the default device is not registered.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let mut registry = Self::new();
        for device in config.parse_devices()? {
            match compiled_backend(device) {
                Some(backend) => registry.register(backend),
                None => tracing::warn!(%device, "no backend compiled for device; skipping"),
            }
        }

        let default_device = config.parse_default_device()?;
        if !registry.backends.contains_key(&default_device) {
            return Err(RuntimeError::ConfigError(format!(
                "default device '{default_device}' is not among the registered devices {:?}",
                registry.devices()
            )));
        }
        registry.default_device = default_device;
        registry.default_device_id = config.default_device_id;
        Ok(registry)
    }

    /// Registers `backend` for its device kind, replacing any previous one.
    pub fn register(&mut self, backend: Arc<dyn Backend>) {
        let device = backend.device();
        tracing::debug!(%device, count = backend.device_count(), "backend registered");
        self.backends.insert(device, backend);
    }

    /// Registered device kinds, in declaration order.
    pub fn devices(&self) -> Vec<DeviceType> {
        let mut devices: Vec<DeviceType> = self.backends.keys().copied().collect();
        devices.sort();
        devices
    }

    pub fn backend(&self, device: DeviceType) -> Option<&Arc<dyn Backend>> {
        self.backends.get(&device)
    }

    /// Returns a handle on device `device_id` of kind `device`.
    ///
    /// # Errors
    /// - [`OpError::DeviceTypeNotSupported`] if no backend is registered for `device`.
    /// - [`OpError::BadParam`] if `device_id` is out of range.
    pub fn handle(&self, device: DeviceType, device_id: usize) -> Result<Handle, OpError> {
        let backend = self
            .backends
            .get(&device)
            .ok_or_else(|| OpError::DeviceTypeNotSupported(device.to_string()))?;
        if device_id >= backend.device_count() {
            return Err(OpError::bad_param(
                "handle",
                format!(
                    "device id {device_id} out of range; {device} has {} device(s)",
                    backend.device_count()
                ),
            ));
        }
        Ok(Handle {
            device,
            device_id,
            backend: Arc::clone(backend),
        })
    }

    /// Returns a handle on the configured default device.
    pub fn default_handle(&self) -> Result<Handle, OpError> {
        self.handle(self.default_device, self.default_device_id)
    }
}
