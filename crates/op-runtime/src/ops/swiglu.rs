// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `swiglu`: `c = a * b * sigmoid(b)`, where `a` is the up projection and
//! `b` the gate.

use super::elementwise::{binary_info, BinaryInfo};
use crate::{Handle, OpDescriptor, OpInfo, OpKind};
use tensor_core::{OpError, TensorDesc};

const OP: &str = OpKind::SwiGlu.as_str();

/// Validates the operands. Failures match [`super::add::info`].
pub fn info(c: &TensorDesc, a: &TensorDesc, b: &TensorDesc) -> Result<BinaryInfo, OpError> {
    binary_info(OP, c, a, b)
}

/// Creates a SwiGLU descriptor. Execute with outputs `[c]`, inputs `[a, b]`.
pub fn create(
    handle: &Handle,
    c: &TensorDesc,
    a: &TensorDesc,
    b: &TensorDesc,
) -> Result<OpDescriptor, OpError> {
    OpDescriptor::create(handle, OpInfo::SwiGlu(info(c, a, b)?), &[c], &[a, b])
}
