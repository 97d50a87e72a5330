// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared validation for two-input elementwise operators.

use layout_planner::ElementwiseInfo;
use tensor_core::{DType, OpError, TensorDesc};

/// Validated layout of `c = f(a, b)`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BinaryInfo {
    pub dtype: DType,
    pub plan: ElementwiseInfo,
    /// Base element offsets of `c`, `a` and `b` within their buffers.
    pub bases: [usize; 3],
}

/// Checks dtypes, expands `a` and `b` to `c`'s shape and classifies them.
pub(crate) fn binary_info(
    op: &'static str,
    c: &TensorDesc,
    a: &TensorDesc,
    b: &TensorDesc,
) -> Result<BinaryInfo, OpError> {
    super::check_dtype(op, c.dtype(), &super::FLOAT_DTYPES)?;
    for input in [a, b] {
        if input.dtype() != c.dtype() {
            return Err(OpError::bad_dtype(op, input.dtype()));
        }
    }
    let expand = |name: &str, input: &TensorDesc| {
        input.broadcast_to(c.shape()).map_err(|_| {
            OpError::bad_shape(
                op,
                format!("{name} {:?} does not broadcast to c {:?}", input.shape(), c.shape()),
            )
        })
    };
    let a = expand("a", a)?;
    let b = expand("b", b)?;
    let plan = ElementwiseInfo::new(c, &[&a, &b])?;
    Ok(BinaryInfo {
        dtype: c.dtype(),
        plan,
        bases: [c.base_offset(), a.base_offset(), b.base_offset()],
    })
}
