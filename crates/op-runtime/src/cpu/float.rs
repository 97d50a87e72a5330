// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Float storage types and their accumulators.

use half::{bf16, f16};
use tensor_core::{DType, Element, OpError};

/// A float storage type the CPU kernels compute on.
pub(crate) trait FloatElem: Element {
    /// Arithmetic type for intermediate values.
    type Acc: num_traits::Float + Element;

    fn to_acc(self) -> Self::Acc;
    fn from_acc(acc: Self::Acc) -> Self;
    fn acc_from_f32(v: f32) -> Self::Acc;
}

impl FloatElem for f16 {
    type Acc = f32;

    fn to_acc(self) -> f32 {
        self.to_f32()
    }

    fn from_acc(acc: f32) -> Self {
        f16::from_f32(acc)
    }

    fn acc_from_f32(v: f32) -> f32 {
        v
    }
}

impl FloatElem for bf16 {
    type Acc = f32;

    fn to_acc(self) -> f32 {
        self.to_f32()
    }

    fn from_acc(acc: f32) -> Self {
        bf16::from_f32(acc)
    }

    fn acc_from_f32(v: f32) -> f32 {
        v
    }
}

impl FloatElem for f32 {
    type Acc = f32;

    fn to_acc(self) -> f32 {
        self
    }

    fn from_acc(acc: f32) -> Self {
        acc
    }

    fn acc_from_f32(v: f32) -> f32 {
        v
    }
}

impl FloatElem for f64 {
    type Acc = f64;

    fn to_acc(self) -> f64 {
        self
    }

    fn from_acc(acc: f64) -> Self {
        acc
    }

    fn acc_from_f32(v: f32) -> f64 {
        f64::from(v)
    }
}

/// Bytes per accumulator value for a float `dtype`.
pub(crate) fn acc_size(op: &'static str, dtype: DType) -> Result<usize, OpError> {
    dispatch_float!(dtype, op, T => Ok(std::mem::size_of::<<T as FloatElem>::Acc>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acc_size() {
        assert_eq!(acc_size("t", DType::F16).unwrap(), 4);
        assert_eq!(acc_size("t", DType::BF16).unwrap(), 4);
        assert_eq!(acc_size("t", DType::F32).unwrap(), 4);
        assert_eq!(acc_size("t", DType::F64).unwrap(), 8);
        assert!(acc_size("t", DType::U32).is_err());
    }

    #[test]
    fn test_half_round_trip() {
        let x = f16::from_f32(0.5);
        assert_eq!(f16::from_acc(x.to_acc() * 2.0), f16::from_f32(1.0));
        assert_eq!(bf16::acc_from_f32(3.0), 3.0f32);
    }
}
