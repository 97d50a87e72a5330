// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host strided copy.

use super::buffer_count;
use crate::ops::RearrangeInfo;
use crate::{OpKernel, OpKind};
use layout_planner::RearrangePlan;
use tensor_core::OpError;

const OP: &str = OpKind::Rearrange.as_str();

/// Rearrange is dtype-agnostic: the plan already works in bytes.
#[derive(Debug)]
pub(crate) struct RearrangeKernel {
    plan: RearrangePlan,
}

impl RearrangeKernel {
    pub(crate) fn new(info: &RearrangeInfo) -> Self {
        Self {
            plan: info.plan.clone(),
        }
    }
}

impl OpKernel for RearrangeKernel {
    fn workspace_size(&self) -> usize {
        0
    }

    fn launch(
        &self,
        _workspace: &mut [u8],
        outputs: &mut [&mut [u8]],
        inputs: &[&[u8]],
    ) -> Result<(), OpError> {
        let ([dst], [src]) = (outputs, inputs) else {
            return Err(buffer_count(OP));
        };
        self.plan.launch(dst, src)
    }
}
