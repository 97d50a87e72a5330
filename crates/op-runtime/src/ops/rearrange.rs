// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `rearrange`: copy `src` into `dst`, which share dtype and shape but not layout.

use crate::{Handle, OpDescriptor, OpInfo, OpKind};
use layout_planner::RearrangePlan;
use tensor_core::{DType, OpError, TensorDesc};

const OP: &str = OpKind::Rearrange.as_str();

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RearrangeInfo {
    pub dtype: DType,
    pub plan: RearrangePlan,
}

/// Validates `dst`/`src` and plans the copy.
///
/// # Errors
/// - [`OpError::BadTensorDtype`] if the dtypes differ.
/// - [`OpError::BadTensorShape`] if the ranks or extents differ.
/// - [`OpError::BadTensorStrides`] if `dst` repeats an axis.
pub fn info(dst: &TensorDesc, src: &TensorDesc) -> Result<RearrangeInfo, OpError> {
    if dst.dtype() != src.dtype() {
        return Err(OpError::bad_dtype(OP, src.dtype()));
    }
    if dst.shape() != src.shape() {
        return Err(OpError::bad_shape(
            OP,
            format!("dst {:?} and src {:?} differ", dst.shape(), src.shape()),
        ));
    }
    super::check_writable(OP, "dst", dst)?;
    let plan = RearrangePlan::build(
        dst.shape(),
        dst.strides(),
        src.strides(),
        dst.dtype().size_bytes(),
    )
    .ok_or_else(|| {
        OpError::bad_strides(
            OP,
            format!("cannot plan {:?} -> {:?}", src.strides(), dst.strides()),
        )
    })?;
    Ok(RearrangeInfo {
        dtype: dst.dtype(),
        plan,
    })
}

/// Creates a rearrange descriptor. Execute with outputs `[dst]`, inputs `[src]`.
pub fn create(
    handle: &Handle,
    dst: &TensorDesc,
    src: &TensorDesc,
) -> Result<OpDescriptor, OpError> {
    let info = info(dst, src)?;
    OpDescriptor::create(handle, OpInfo::Rearrange(info), &[dst], &[src])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_plans_merge() {
        let dst = TensorDesc::contiguous(DType::F32, vec![2, 3, 4]);
        let src = TensorDesc::new(DType::F32, vec![2, 3, 4], vec![24, 4, 1]).unwrap();
        let info = info(&dst, &src).unwrap();
        assert_eq!(info.plan.unit(), 48);
        assert_eq!(info.plan.loop_axes().len(), 1);
    }

    #[test]
    fn test_validation() {
        let a = TensorDesc::contiguous(DType::F32, vec![2, 3]);
        let half = TensorDesc::contiguous(DType::F16, vec![2, 3]);
        assert!(matches!(info(&a, &half), Err(OpError::BadTensorDtype { .. })));

        let rank3 = TensorDesc::contiguous(DType::F32, vec![2, 3, 1]);
        assert!(matches!(info(&a, &rank3), Err(OpError::BadTensorShape { .. })));

        let wide = TensorDesc::contiguous(DType::F32, vec![2, 4]);
        assert!(matches!(info(&a, &wide), Err(OpError::BadTensorShape { .. })));

        let repeated = TensorDesc::new(DType::F32, vec![2, 3], vec![0, 1]).unwrap();
        assert!(matches!(info(&repeated, &a), Err(OpError::BadTensorStrides { .. })));
    }
}
