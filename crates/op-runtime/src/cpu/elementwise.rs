// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Two-input elementwise kernels.

use super::buffer_count;
use super::float::FloatElem;
use crate::ops::BinaryInfo;
use crate::{OpKernel, OpKind};
use num_traits::Float;
use tensor_core::{read_elem, write_elem, OpError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    /// `a * b * sigmoid(b)`.
    SwiGlu,
}

impl BinaryOp {
    fn kind(self) -> OpKind {
        match self {
            BinaryOp::Add => OpKind::Add,
            BinaryOp::SwiGlu => OpKind::SwiGlu,
        }
    }

    #[inline]
    fn apply<A: Float>(self, a: A, b: A) -> A {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::SwiGlu => a * b / (A::one() + (-b).exp()),
        }
    }
}

#[derive(Debug)]
pub(crate) struct BinaryKernel {
    op: BinaryOp,
    info: BinaryInfo,
}

impl BinaryKernel {
    pub(crate) fn new(op: BinaryOp, info: &BinaryInfo) -> Result<Self, OpError> {
        super::float::acc_size(op.kind().as_str(), info.dtype)?;
        Ok(Self {
            op,
            info: info.clone(),
        })
    }

    fn run<T: FloatElem>(&self, c: &mut [u8], a: &[u8], b: &[u8]) {
        let plan = &self.info.plan;
        let [c_base, a_base, b_base] = self.info.bases.map(|base| base as isize);
        for i in 0..plan.output_size() {
            let x: T = read_elem(a, (a_base + plan.input_offset(0, i)) as usize);
            let y: T = read_elem(b, (b_base + plan.input_offset(1, i)) as usize);
            let z = self.op.apply(x.to_acc(), y.to_acc());
            write_elem(c, (c_base + plan.output_offset(i)) as usize, T::from_acc(z));
        }
    }
}

impl OpKernel for BinaryKernel {
    fn workspace_size(&self) -> usize {
        0
    }

    fn launch(
        &self,
        _workspace: &mut [u8],
        outputs: &mut [&mut [u8]],
        inputs: &[&[u8]],
    ) -> Result<(), OpError> {
        let op = self.op.kind().as_str();
        let ([c], [a, b]) = (outputs, inputs) else {
            return Err(buffer_count(op));
        };
        dispatch_float!(self.info.dtype, op, T => {
            self.run::<T>(c, a, b);
            Ok(())
        })
    }
}
