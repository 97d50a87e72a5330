// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `rope`: rotary position embedding, applied to `t` in place.
//!
//! For token `i` at position `p = pos_ids[i]`, every head rotates each pair
//! `(t[2k], t[2k + 1])` by the angle whose sine and cosine are `sin[p][k]`
//! and `cos[p][k]`.

use super::{check_dtype, check_rank, check_writable};
use crate::{Handle, OpDescriptor, OpInfo, OpKind};
use tensor_core::{DType, OpError, TensorDesc};

const OP: &str = OpKind::Rope.as_str();

pub(crate) const T_DTYPES: [DType; 4] = [DType::F16, DType::BF16, DType::F32, DType::F64];
pub(crate) const POS_DTYPES: [DType; 4] = [DType::U8, DType::U16, DType::U32, DType::U64];

/// Validated layout of one RoPE application. Strides are in elements.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RopeInfo {
    pub dtype: DType,
    pub pos_dtype: DType,
    /// Tokens.
    pub nt: usize,
    /// Heads.
    pub nh: usize,
    /// Head dimension (even).
    pub dh: usize,
    /// Token and head strides of `t`.
    pub t_strides: [isize; 2],
    pub pos_stride: isize,
    /// Rows in the sine and cosine tables.
    pub nsin: usize,
    pub ncos: usize,
    pub sin_strides: [isize; 2],
    pub cos_strides: [isize; 2],
    pub t_base: usize,
    pub pos_base: usize,
    pub sin_base: usize,
    pub cos_base: usize,
}

/// Validates the operands.
///
/// # Errors
/// - [`OpError::BadTensorDtype`] if `t` is not F16/BF16/F32/F64, `pos_ids`
///   is not an unsigned integer, or a table is not F32.
/// - [`OpError::BadTensorShape`] on wrong ranks, a `pos_ids` length other
///   than the token count, an odd head dimension, or tables narrower than
///   `dh / 2`.
/// - [`OpError::BadTensorStrides`] if `t`'s last axis is not unit-stride or
///   `t` repeats an axis.
pub fn info(
    t: &TensorDesc,
    pos_ids: &TensorDesc,
    sin: &TensorDesc,
    cos: &TensorDesc,
) -> Result<RopeInfo, OpError> {
    check_dtype(OP, t.dtype(), &T_DTYPES)?;
    check_dtype(OP, pos_ids.dtype(), &POS_DTYPES)?;
    check_dtype(OP, sin.dtype(), &[DType::F32])?;
    check_dtype(OP, cos.dtype(), &[DType::F32])?;

    check_rank(OP, "t", t, &[3])?;
    check_rank(OP, "pos_ids", pos_ids, &[1])?;
    check_rank(OP, "sin", sin, &[2])?;
    check_rank(OP, "cos", cos, &[2])?;

    let (nt, nh, dh) = (t.dim(0), t.dim(1), t.dim(2));
    if pos_ids.dim(0) != nt {
        return Err(OpError::bad_shape(
            OP,
            format!("pos_ids has {} entries for {nt} tokens", pos_ids.dim(0)),
        ));
    }
    if dh % 2 != 0 {
        return Err(OpError::bad_shape(OP, format!("head dimension {dh} is odd")));
    }
    for (name, table) in [("sin", sin), ("cos", cos)] {
        if table.dim(1) < dh / 2 {
            return Err(OpError::bad_shape(
                OP,
                format!("{name} has {} columns, need {}", table.dim(1), dh / 2),
            ));
        }
    }

    if t.stride(2) != 1 {
        return Err(OpError::bad_strides(
            OP,
            format!("t head dimension must have stride 1, got {}", t.stride(2)),
        ));
    }
    check_writable(OP, "t", t)?;

    Ok(RopeInfo {
        dtype: t.dtype(),
        pos_dtype: pos_ids.dtype(),
        nt,
        nh,
        dh,
        t_strides: [t.stride(0), t.stride(1)],
        pos_stride: pos_ids.stride(0),
        nsin: sin.dim(0),
        ncos: cos.dim(0),
        sin_strides: [sin.stride(0), sin.stride(1)],
        cos_strides: [cos.stride(0), cos.stride(1)],
        t_base: t.base_offset(),
        pos_base: pos_ids.base_offset(),
        sin_base: sin.base_offset(),
        cos_base: cos.base_offset(),
    })
}

/// Creates a RoPE descriptor. Execute with outputs `[t]`, inputs
/// `[pos_ids, sin, cos]`.
pub fn create(
    handle: &Handle,
    t: &TensorDesc,
    pos_ids: &TensorDesc,
    sin: &TensorDesc,
    cos: &TensorDesc,
) -> Result<OpDescriptor, OpError> {
    let info = info(t, pos_ids, sin, cos)?;
    OpDescriptor::create(handle, OpInfo::Rope(info), &[t], &[pos_ids, sin, cos])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operands() -> (TensorDesc, TensorDesc, TensorDesc, TensorDesc) {
        (
            TensorDesc::contiguous(DType::F16, vec![3, 2, 8]),
            TensorDesc::contiguous(DType::U32, vec![3]),
            TensorDesc::contiguous(DType::F32, vec![16, 4]),
            TensorDesc::contiguous(DType::F32, vec![16, 4]),
        )
    }

    #[test]
    fn test_info() {
        let (t, pos, sin, cos) = operands();
        let info = info(&t, &pos, &sin, &cos).unwrap();
        assert_eq!((info.nt, info.nh, info.dh), (3, 2, 8));
        assert_eq!(info.t_strides, [16, 8]);
        assert_eq!(info.nsin, 16);
    }

    #[test]
    fn test_head_stride_binding() {
        // Heads outermost in memory: [nt, nh, dh] with strides [dh, nt*dh, 1].
        let t = TensorDesc::new(DType::F32, vec![3, 2, 8], vec![8, 24, 1]).unwrap();
        let (_, pos, sin, cos) = operands();
        let info = info(&t, &pos, &sin, &cos).unwrap();
        assert_eq!(info.t_strides, [8, 24]);
        assert_eq!(info.pos_stride, 1);
    }

    #[test]
    fn test_dtype_rules() {
        let (t, pos, sin, cos) = operands();
        let signed = TensorDesc::contiguous(DType::I32, vec![3]);
        assert!(matches!(info(&t, &signed, &sin, &cos), Err(OpError::BadTensorDtype { .. })));
        let sin16 = TensorDesc::contiguous(DType::F16, vec![16, 4]);
        assert!(matches!(info(&t, &pos, &sin16, &cos), Err(OpError::BadTensorDtype { .. })));
        let ti = TensorDesc::contiguous(DType::I8, vec![3, 2, 8]);
        assert!(matches!(info(&ti, &pos, &sin, &cos), Err(OpError::BadTensorDtype { .. })));
    }

    #[test]
    fn test_shape_rules() {
        let (t, pos, sin, cos) = operands();
        let short = TensorDesc::contiguous(DType::U32, vec![2]);
        assert!(matches!(info(&t, &short, &sin, &cos), Err(OpError::BadTensorShape { .. })));
        let odd = TensorDesc::contiguous(DType::F16, vec![3, 2, 7]);
        assert!(matches!(info(&odd, &pos, &sin, &cos), Err(OpError::BadTensorShape { .. })));
        let narrow = TensorDesc::contiguous(DType::F32, vec![16, 3]);
        assert!(matches!(info(&t, &pos, &sin, &narrow), Err(OpError::BadTensorShape { .. })));
        let flat = TensorDesc::contiguous(DType::F16, vec![6, 8]);
        assert!(matches!(info(&flat, &pos, &sin, &cos), Err(OpError::BadTensorShape { .. })));
    }

    #[test]
    fn test_stride_rules() {
        let (_, pos, sin, cos) = operands();
        let gapped = TensorDesc::new(DType::F16, vec![3, 2, 8], vec![32, 16, 2]).unwrap();
        assert!(matches!(info(&gapped, &pos, &sin, &cos), Err(OpError::BadTensorStrides { .. })));
        let shared = TensorDesc::new(DType::F16, vec![3, 2, 8], vec![0, 8, 1]).unwrap();
        assert!(matches!(info(&shared, &pos, &sin, &cos), Err(OpError::BadTensorStrides { .. })));
    }
}
