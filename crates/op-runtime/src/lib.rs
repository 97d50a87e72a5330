// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # op-runtime
//!
//! Operator descriptors dispatched over device backends.
//!
//! The runtime takes:
//! - [`tensor_core::TensorDesc`]s describing each operand.
//! - A [`Handle`] from a [`Registry`], naming the device.
//!
//! and produces an [`OpDescriptor`] that owns its backend's kernel state.
//! Validation happens once in `create`; `execute` only checks buffers,
//! workspace and stream before launching.
//!
//! # Lifecycle
//! ```text
//! create ──▶ workspace_size()* ──▶ execute()* ──▶ destroy(self)
//! ```
//!
//! # Example
//! ```
//! use op_runtime::{ops, Registry};
//! use tensor_core::{DType, Tensor, TensorDesc};
//!
//! let handle = Registry::with_cpu().default_handle().unwrap();
//! let dst = TensorDesc::contiguous(DType::F32, vec![2, 3]);
//! let src = TensorDesc::new(DType::F32, vec![2, 3], vec![1, 2]).unwrap();
//! let desc = ops::rearrange::create(&handle, &dst, &src).unwrap();
//!
//! let input = Tensor::from_values(src, &[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! let mut output = Tensor::zeros(dst);
//! let mut workspace = vec![0u8; desc.workspace_size()];
//! desc.execute(&mut workspace, &mut [output.as_bytes_mut()], &[input.as_bytes()], None)
//!     .unwrap();
//! assert_eq!(output.to_vec::<f32>().unwrap(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
//! desc.destroy();
//! ```

mod backend;
mod config;
pub mod cpu;
mod descriptor;
mod device;
mod error;
pub mod ops;
mod registry;

pub use backend::{Backend, OpKernel};
pub use config::RuntimeConfig;
pub use cpu::CpuBackend;
pub use descriptor::{OpDescriptor, OpKind};
pub use device::{DeviceType, Stream};
pub use error::RuntimeError;
pub use ops::OpInfo;
pub use registry::{compiled_backend, Handle, Registry};
