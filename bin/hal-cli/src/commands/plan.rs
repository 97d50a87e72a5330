// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `hal plan` command: print an elementwise index plan as JSON.
//!
//! Inputs are expanded to the output shape first, the same way the
//! elementwise operators do before planning.

use layout_planner::ElementwiseInfo;
use tensor_core::TensorDesc;

use super::{parse_dtype, parse_layout};

pub fn execute(output: String, inputs: Vec<String>, dtype: String) -> anyhow::Result<()> {
    let dtype = parse_dtype(&dtype)?;
    let output = parse_layout(&output, dtype)?;
    let inputs = inputs
        .iter()
        .map(|s| -> anyhow::Result<TensorDesc> {
            Ok(parse_layout(s, dtype)?.broadcast_to(output.shape())?)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let refs: Vec<_> = inputs.iter().collect();

    let info = ElementwiseInfo::new(&output, &refs)?;
    tracing::debug!(
        inputs = info.num_inputs(),
        all_contiguous = info.all_contiguous(),
        "elementwise plan built"
    );
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
