// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Causal softmax, in place. Row exponentials are staged in the workspace.

use super::buffer_count;
use super::float::{acc_size, FloatElem};
use crate::ops::CausalSoftmaxInfo;
use crate::{OpKernel, OpKind};
use num_traits::{Float, Zero};
use tensor_core::{read_elem, write_elem, OpError};

const OP: &str = OpKind::CausalSoftmax.as_str();

#[derive(Debug)]
pub(crate) struct CausalSoftmaxKernel {
    info: CausalSoftmaxInfo,
    workspace_size: usize,
}

impl CausalSoftmaxKernel {
    pub(crate) fn new(info: &CausalSoftmaxInfo) -> Result<Self, OpError> {
        let workspace_size = info.total_len * acc_size(OP, info.dtype)?;
        Ok(Self {
            info: info.clone(),
            workspace_size,
        })
    }

    fn run<T: FloatElem>(&self, y: &mut [u8], workspace: &mut [u8]) {
        let info = &self.info;
        for b in 0..info.batch {
            for i in 0..info.seq_len {
                let row = (info.base as isize
                    + b as isize * info.batch_stride
                    + i as isize * info.row_stride) as usize;
                let visible = info.visible_columns(i);

                let max = (0..visible).fold(T::Acc::neg_infinity(), |m, j| {
                    m.max(read_elem::<T>(y, row + j).to_acc())
                });
                let mut sum = T::Acc::zero();
                for j in 0..visible {
                    let e = (read_elem::<T>(y, row + j).to_acc() - max).exp();
                    write_elem(workspace, j, e);
                    sum = sum + e;
                }
                for j in 0..info.total_len {
                    let v = if j < visible {
                        read_elem::<T::Acc>(workspace, j) / sum
                    } else {
                        T::Acc::zero()
                    };
                    write_elem(y, row + j, T::from_acc(v));
                }
            }
        }
    }
}

impl OpKernel for CausalSoftmaxKernel {
    fn workspace_size(&self) -> usize {
        self.workspace_size
    }

    fn launch(
        &self,
        workspace: &mut [u8],
        outputs: &mut [&mut [u8]],
        inputs: &[&[u8]],
    ) -> Result<(), OpError> {
        let ([y], []) = (outputs, inputs) else {
            return Err(buffer_count(OP));
        };
        dispatch_float!(self.info.dtype, OP, T => {
            self.run::<T>(y, workspace);
            Ok(())
        })
    }
}
