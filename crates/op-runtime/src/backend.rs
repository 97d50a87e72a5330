// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The capability set every device backend implements.
//!
//! Operator `create` functions validate descriptors into an [`OpInfo`]
//! without looking at the device; the handle's [`Backend`] then turns that
//! info into an [`OpKernel`], the opaque payload an
//! [`OpDescriptor`](crate::OpDescriptor) owns until it is destroyed.
//!
//! ```ignore
//! #[derive(Debug)]
//! struct MyAccelerator;
//! impl Backend for MyAccelerator {
//!     fn device(&self) -> DeviceType { DeviceType::Nvidia }
//!     fn device_count(&self) -> usize { 2 }
//!     fn create_kernel(&self, info: &OpInfo) -> Result<Box<dyn OpKernel>, OpError> { /* ... */ }
//! }
//! ```

use crate::{DeviceType, OpInfo};
use tensor_core::OpError;

/// A device backend.
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// The device kind this backend drives.
    fn device(&self) -> DeviceType;

    /// Number of addressable devices of this kind.
    fn device_count(&self) -> usize;

    /// Builds the backend-private kernel state for a validated operator.
    ///
    /// # Errors
    /// Returns [`OpError::BadTensorDtype`] for dtypes the backend does not
    /// implement.
    fn create_kernel(&self, info: &OpInfo) -> Result<Box<dyn OpKernel>, OpError>;
}

/// Backend-private state of one operator descriptor.
///
/// Buffers start at each tensor's lowest reachable byte and have already been
/// checked against the tensor spans, in the order the operator documents.
pub trait OpKernel: Send + Sync + std::fmt::Debug {
    /// Scratch bytes each launch needs. Constant for the kernel's lifetime.
    fn workspace_size(&self) -> usize;

    /// Runs the operator.
    fn launch(
        &self,
        workspace: &mut [u8],
        outputs: &mut [&mut [u8]],
        inputs: &[&[u8]],
    ) -> Result<(), OpError>;
}
