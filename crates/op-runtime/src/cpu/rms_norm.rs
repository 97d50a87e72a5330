// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Row-wise RMS normalisation.

use super::buffer_count;
use super::float::{acc_size, FloatElem};
use crate::ops::RmsNormInfo;
use crate::{OpKernel, OpKind};
use num_traits::{Float, Zero};
use tensor_core::{index_to_offset, read_elem, write_elem, DType, OpError};

const OP: &str = OpKind::RmsNorm.as_str();

#[derive(Debug)]
pub(crate) struct RmsNormKernel {
    info: RmsNormInfo,
}

impl RmsNormKernel {
    pub(crate) fn new(info: &RmsNormInfo) -> Result<Self, OpError> {
        acc_size(OP, info.dtype)?;
        Ok(Self { info: info.clone() })
    }

    /// `weight(w, k)` reads element `k` of `w` as an accumulator.
    fn run<T: FloatElem>(
        &self,
        y: &mut [u8],
        x: &[u8],
        w: &[u8],
        weight: impl Fn(&[u8], usize) -> T::Acc,
    ) {
        let info = &self.info;
        let eps = T::acc_from_f32(info.epsilon);
        let n = T::acc_from_f32(info.dim as f32);
        for r in 0..info.rows() {
            let xr = index_to_offset(r, &info.row_shape, &info.x_row_strides);
            let yr = index_to_offset(r, &info.row_shape, &info.y_row_strides);
            let xo = (info.x_base as isize + xr) as usize;
            let yo = (info.y_base as isize + yr) as usize;

            let sum_sq = (0..info.dim).fold(T::Acc::zero(), |acc, k| {
                let v = read_elem::<T>(x, xo + k).to_acc();
                acc + v * v
            });
            let scale = (sum_sq / n + eps).sqrt().recip();
            for k in 0..info.dim {
                let v = read_elem::<T>(x, xo + k).to_acc();
                write_elem(y, yo + k, T::from_acc(weight(w, k) * v * scale));
            }
        }
    }
}

impl OpKernel for RmsNormKernel {
    fn workspace_size(&self) -> usize {
        0
    }

    fn launch(
        &self,
        _workspace: &mut [u8],
        outputs: &mut [&mut [u8]],
        inputs: &[&[u8]],
    ) -> Result<(), OpError> {
        let ([y], [x, w]) = (outputs, inputs) else {
            return Err(buffer_count(OP));
        };
        let f32_weights = self.info.w_dtype == DType::F32;
        dispatch_float!(self.info.dtype, OP, T => {
            if f32_weights {
                self.run::<T>(y, x, w, |w, k| T::acc_from_f32(read_elem::<f32>(w, k)));
            } else {
                self.run::<T>(y, x, w, |w, k| read_elem::<T>(w, k).to_acc());
            }
            Ok(())
        })
    }
}
