// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CPU reference backend.
//!
//! Kernels run synchronously on the calling thread. Dtype dispatch happens
//! once per launch: the runtime tag selects a kernel monomorphised for the
//! storage type, and arithmetic runs in that type's accumulator (`f32` for
//! the 16-bit floats, `f64` for `F64`).

/// Binds `$T` to the storage type of a float `$dtype` and evaluates `$body`.
/// Any other dtype yields `BadTensorDtype`.
macro_rules! dispatch_float {
    ($dtype:expr, $op:expr, $T:ident => $body:expr) => {
        match $dtype {
            tensor_core::DType::F16 => {
                type $T = half::f16;
                $body
            }
            tensor_core::DType::BF16 => {
                type $T = half::bf16;
                $body
            }
            tensor_core::DType::F32 => {
                type $T = f32;
                $body
            }
            tensor_core::DType::F64 => {
                type $T = f64;
                $body
            }
            other => Err(tensor_core::OpError::bad_dtype($op, other)),
        }
    };
}

mod causal_softmax;
mod elementwise;
mod float;
mod rearrange;
mod rms_norm;
mod rope;

use crate::{Backend, DeviceType, OpInfo, OpKernel};
use tensor_core::OpError;

/// The host backend. One device, id 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for CpuBackend {
    fn device(&self) -> DeviceType {
        DeviceType::Cpu
    }

    fn device_count(&self) -> usize {
        1
    }

    fn create_kernel(&self, info: &OpInfo) -> Result<Box<dyn OpKernel>, OpError> {
        Ok(match info {
            OpInfo::Rearrange(i) => Box::new(rearrange::RearrangeKernel::new(i)),
            OpInfo::Add(i) => {
                Box::new(elementwise::BinaryKernel::new(elementwise::BinaryOp::Add, i)?)
            }
            OpInfo::SwiGlu(i) => {
                Box::new(elementwise::BinaryKernel::new(elementwise::BinaryOp::SwiGlu, i)?)
            }
            OpInfo::RmsNorm(i) => Box::new(rms_norm::RmsNormKernel::new(i)?),
            OpInfo::Rope(i) => Box::new(rope::RopeKernel::new(i)?),
            OpInfo::CausalSoftmax(i) => Box::new(causal_softmax::CausalSoftmaxKernel::new(i)?),
        })
    }
}

/// Error for a buffer list the descriptor should already have rejected.
fn buffer_count(op: &'static str) -> OpError {
    OpError::InternalError(format!("{op}: buffer count does not match the descriptor"))
}
