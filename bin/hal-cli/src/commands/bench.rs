// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `hal bench` command: time repeated executes of one descriptor.
//!
//! Operands are contiguous and filled with uniform values in `[-1, 1)`,
//! except the rearrange source, which is column-major so the copy has to
//! walk strides. The descriptor is created once and executed after a single
//! warm-up run.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use op_runtime::{ops, Handle, OpDescriptor, OpKind};
use rand::Rng;
use tensor_core::{bf16, f16, DType, Tensor, TensorDesc};

use super::{load_registry, parse_dtype, parse_shape};

/// One created descriptor with its operand buffers.
struct Case {
    op: OpDescriptor,
    outputs: Vec<Tensor>,
    inputs: Vec<Tensor>,
}

impl Case {
    fn bytes_touched(&self) -> usize {
        self.outputs
            .iter()
            .chain(&self.inputs)
            .map(Tensor::size_bytes)
            .sum()
    }

    fn run(&mut self, workspace: &mut [u8]) -> anyhow::Result<()> {
        let mut outs: Vec<&mut [u8]> = self.outputs.iter_mut().map(|t| t.as_bytes_mut()).collect();
        let ins: Vec<&[u8]> = self.inputs.iter().map(|t| t.as_bytes()).collect();
        self.op.execute(workspace, &mut outs, &ins, None)?;
        Ok(())
    }
}

pub fn execute(
    config: Option<PathBuf>,
    op: String,
    shape: String,
    dtype: String,
    iterations: usize,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              hal · Operator Benchmark               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let kind: OpKind = op.parse().map_err(anyhow::Error::msg)?;
    let dtype = parse_dtype(&dtype)?;
    let shape = parse_shape(&shape)?;
    if iterations == 0 {
        anyhow::bail!("--iterations must be at least 1");
    }

    let registry = load_registry(config.as_deref())?;
    let handle = registry.default_handle()?;
    let mut case = build_case(&handle, kind, dtype, &shape)?;
    let mut workspace = vec![0u8; case.op.workspace_size()];

    println!("  Operator:     {kind}");
    println!("  Device:       {}:{}", handle.device(), handle.device_id());
    println!("  Shape:        {shape:?} ({dtype})");
    println!("  Workspace:    {} bytes", workspace.len());
    println!("  Iterations:   {iterations}");
    println!();

    case.run(&mut workspace)?;

    let mut samples = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start = Instant::now();
        case.run(&mut workspace)?;
        samples.push(start.elapsed());
    }

    // ── Results ────────────────────────────────────────────────
    let total: Duration = samples.iter().sum();
    let mean = total / iterations as u32;
    let min = samples.iter().min().copied().unwrap_or_default();
    let max = samples.iter().max().copied().unwrap_or_default();
    let gbps = case.bytes_touched() as f64 / mean.as_secs_f64().max(f64::MIN_POSITIVE) / 1e9;

    println!("  {:<10} {:>12} {:>12} {:>12} {:>10}", "", "mean", "min", "max", "GB/s");
    println!("  {}", "─".repeat(60));
    println!(
        "  {:<10} {:>9.1} us {:>9.1} us {:>9.1} us {:>10.2}",
        "execute",
        mean.as_secs_f64() * 1e6,
        min.as_secs_f64() * 1e6,
        max.as_secs_f64() * 1e6,
        gbps,
    );

    case.op.destroy();
    Ok(())
}

fn build_case(
    handle: &Handle,
    kind: OpKind,
    dtype: DType,
    shape: &[usize],
) -> anyhow::Result<Case> {
    let packed = TensorDesc::contiguous(dtype, shape.to_vec());
    let case = match kind {
        OpKind::Rearrange => {
            let src = column_major(dtype, shape)?;
            Case {
                op: ops::rearrange::create(handle, &packed, &src)?,
                outputs: vec![Tensor::zeros(packed.clone())],
                inputs: vec![random_tensor(&src)?],
            }
        }
        OpKind::Add | OpKind::SwiGlu => {
            let op = if kind == OpKind::Add {
                ops::add::create(handle, &packed, &packed, &packed)?
            } else {
                ops::swiglu::create(handle, &packed, &packed, &packed)?
            };
            Case {
                op,
                outputs: vec![Tensor::zeros(packed.clone())],
                inputs: vec![random_tensor(&packed)?, random_tensor(&packed)?],
            }
        }
        OpKind::RmsNorm => {
            let dim = shape.last().copied().unwrap_or(0);
            let w = TensorDesc::contiguous(dtype, vec![dim]);
            Case {
                op: ops::rms_norm::create(handle, &packed, &packed, &w, 1e-6)?,
                outputs: vec![Tensor::zeros(packed.clone())],
                inputs: vec![random_tensor(&packed)?, random_tensor(&w)?],
            }
        }
        OpKind::Rope => {
            let &[nt, _, dh] = shape else {
                anyhow::bail!("rope expects a [tokens, heads, head_dim] shape, got {shape:?}");
            };
            let pos = TensorDesc::contiguous(DType::U32, vec![nt]);
            let table = TensorDesc::contiguous(DType::F32, vec![nt, dh / 2]);
            let positions: Vec<u32> = (0..nt as u32).collect();
            Case {
                op: ops::rope::create(handle, &packed, &pos, &table, &table)?,
                outputs: vec![random_tensor(&packed)?],
                inputs: vec![
                    Tensor::from_values(pos, &positions)?,
                    random_tensor(&table)?,
                    random_tensor(&table)?,
                ],
            }
        }
        OpKind::CausalSoftmax => Case {
            op: ops::causal_softmax::create(handle, &packed)?,
            outputs: vec![random_tensor(&packed)?],
            inputs: Vec::new(),
        },
    };
    Ok(case)
}

fn column_major(dtype: DType, shape: &[usize]) -> anyhow::Result<TensorDesc> {
    let mut strides = vec![0isize; shape.len()];
    let mut acc = 1isize;
    for (stride, &dim) in strides.iter_mut().zip(shape) {
        *stride = acc;
        acc *= dim.max(1) as isize;
    }
    Ok(TensorDesc::new(dtype, shape.to_vec(), strides)?)
}

fn random_tensor(desc: &TensorDesc) -> anyhow::Result<Tensor> {
    let mut rng = rand::thread_rng();
    let values: Vec<f32> = (0..desc.numel()).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let desc = desc.clone();
    let tensor = match desc.dtype() {
        DType::F16 => {
            let v: Vec<f16> = values.iter().map(|&x| f16::from_f32(x)).collect();
            Tensor::from_values(desc, &v)?
        }
        DType::BF16 => {
            let v: Vec<bf16> = values.iter().map(|&x| bf16::from_f32(x)).collect();
            Tensor::from_values(desc, &v)?
        }
        DType::F32 => Tensor::from_values(desc, &values)?,
        DType::F64 => {
            let v: Vec<f64> = values.iter().map(|&x| f64::from(x)).collect();
            Tensor::from_values(desc, &v)?
        }
        other => anyhow::bail!("benchmarks need a float dtype, got {other}"),
    };
    Ok(tensor)
}
