// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `add`: `c = a + b` with broadcasting of `a` and `b` to `c`.

use super::elementwise::{binary_info, BinaryInfo};
use crate::{Handle, OpDescriptor, OpInfo, OpKind};
use tensor_core::{OpError, TensorDesc};

const OP: &str = OpKind::Add.as_str();

/// Validates the operands.
///
/// # Errors
/// - [`OpError::BadTensorDtype`] unless all three share one float dtype.
/// - [`OpError::BadTensorShape`] if `a` or `b` does not broadcast to `c`.
/// - [`OpError::BadTensorStrides`] if `c` repeats an axis.
pub fn info(c: &TensorDesc, a: &TensorDesc, b: &TensorDesc) -> Result<BinaryInfo, OpError> {
    binary_info(OP, c, a, b)
}

/// Creates an add descriptor. Execute with outputs `[c]`, inputs `[a, b]`.
pub fn create(
    handle: &Handle,
    c: &TensorDesc,
    a: &TensorDesc,
    b: &TensorDesc,
) -> Result<OpDescriptor, OpError> {
    OpDescriptor::create(handle, OpInfo::Add(info(c, a, b)?), &[c], &[a, b])
}
