// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator validation.
//!
//! Every operator module exposes `info(..)`, which checks dtypes, ranks,
//! shapes and strides and builds a device-agnostic info value, and
//! `create(handle, ..)`, which wraps that info in an [`OpDescriptor`] for the
//! handle's backend.
//!
//! | Operator | Outputs | Inputs |
//! |---|---|---|
//! | [`rearrange`] | `dst` | `src` |
//! | [`add`] | `c` | `a`, `b` |
//! | [`swiglu`] | `c` | `a` (up), `b` (gate) |
//! | [`rms_norm`] | `y` | `x`, `w` |
//! | [`rope`] | `t` (in place) | `pos_ids`, `sin`, `cos` |
//! | [`causal_softmax`] | `y` (in place) | none |
//!
//! [`OpDescriptor`]: crate::OpDescriptor

pub mod add;
pub mod causal_softmax;
pub(crate) mod elementwise;
pub mod rearrange;
pub mod rms_norm;
pub mod rope;
pub mod swiglu;

pub use causal_softmax::CausalSoftmaxInfo;
pub use elementwise::BinaryInfo;
pub use rearrange::RearrangeInfo;
pub use rms_norm::RmsNormInfo;
pub use rope::RopeInfo;

use crate::OpKind;
use tensor_core::{DType, OpError, TensorDesc};

/// A validated operator, ready for a backend.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpInfo {
    Rearrange(RearrangeInfo),
    Add(BinaryInfo),
    SwiGlu(BinaryInfo),
    RmsNorm(RmsNormInfo),
    Rope(RopeInfo),
    CausalSoftmax(CausalSoftmaxInfo),
}

impl OpInfo {
    pub fn kind(&self) -> OpKind {
        match self {
            OpInfo::Rearrange(_) => OpKind::Rearrange,
            OpInfo::Add(_) => OpKind::Add,
            OpInfo::SwiGlu(_) => OpKind::SwiGlu,
            OpInfo::RmsNorm(_) => OpKind::RmsNorm,
            OpInfo::Rope(_) => OpKind::Rope,
            OpInfo::CausalSoftmax(_) => OpKind::CausalSoftmax,
        }
    }
}

pub(crate) const FLOAT_DTYPES: [DType; 4] = [DType::F16, DType::BF16, DType::F32, DType::F64];

pub(crate) fn check_dtype(
    op: &'static str,
    dtype: DType,
    allowed: &[DType],
) -> Result<(), OpError> {
    if allowed.contains(&dtype) {
        Ok(())
    } else {
        Err(OpError::bad_dtype(op, dtype))
    }
}

pub(crate) fn check_rank(
    op: &'static str,
    name: &str,
    desc: &TensorDesc,
    ranks: &[usize],
) -> Result<(), OpError> {
    if ranks.contains(&desc.ndim()) {
        Ok(())
    } else {
        Err(OpError::bad_shape(
            op,
            format!("{name} has rank {}, expected one of {ranks:?}", desc.ndim()),
        ))
    }
}

/// Rejects a tensor the operator writes if it repeats an axis.
pub(crate) fn check_writable(
    op: &'static str,
    name: &str,
    desc: &TensorDesc,
) -> Result<(), OpError> {
    if desc.has_broadcast_dim() {
        return Err(OpError::bad_strides(
            op,
            format!("{name} strides {:?} broadcast a written axis", desc.strides()),
        ));
    }
    Ok(())
}

pub(crate) fn check_last_contiguous(
    op: &'static str,
    name: &str,
    desc: &TensorDesc,
) -> Result<(), OpError> {
    if !desc.is_last_dim_contiguous() {
        return Err(OpError::bad_strides(
            op,
            format!("{name} last axis must have stride 1, got {:?}", desc.strides()),
        ));
    }
    Ok(())
}
