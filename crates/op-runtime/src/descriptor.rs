// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator descriptors and their lifecycle.
//!
//! ```text
//! ops::<op>::create(&handle, descs..)   validate + plan + backend kernel
//!     │
//!     ├── workspace_size()              any number of times, always equal
//!     ├── execute(ws, outs, ins, stream) any number of times
//!     ▼
//! destroy(self)                          consumes the descriptor
//! ```

use crate::{DeviceType, Handle, OpInfo, OpKernel, Stream};
use std::fmt;
use std::str::FromStr;
use tensor_core::{OpError, TensorDesc};

/// Operator kinds with a descriptor implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Rearrange,
    Add,
    SwiGlu,
    RmsNorm,
    Rope,
    CausalSoftmax,
}

impl OpKind {
    pub const ALL: [OpKind; 6] = [
        OpKind::Rearrange,
        OpKind::Add,
        OpKind::SwiGlu,
        OpKind::RmsNorm,
        OpKind::Rope,
        OpKind::CausalSoftmax,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            OpKind::Rearrange => "rearrange",
            OpKind::Add => "add",
            OpKind::SwiGlu => "swiglu",
            OpKind::RmsNorm => "rms_norm",
            OpKind::Rope => "rope",
            OpKind::CausalSoftmax => "causal_softmax",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = String;

    /// Accepts `snake_case` or `kebab-case` names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        OpKind::ALL
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| format!("unknown operator '{s}'"))
    }
}

/// A created operator bound to one device.
///
/// Holds the backend's [`OpKernel`] and the byte span every buffer must
/// cover. Nothing in it changes after creation, so one descriptor may serve
/// concurrent executes that write disjoint outputs.
#[derive(Debug)]
pub struct OpDescriptor {
    kind: OpKind,
    device: DeviceType,
    device_id: usize,
    workspace_size: usize,
    output_spans: Vec<usize>,
    input_spans: Vec<usize>,
    kernel: Box<dyn OpKernel>,
}

impl OpDescriptor {
    /// Hands a validated `info` to the handle's backend.
    ///
    /// `outputs` and `inputs` fix the buffer order `execute` expects.
    pub(crate) fn create(
        handle: &Handle,
        info: OpInfo,
        outputs: &[&TensorDesc],
        inputs: &[&TensorDesc],
    ) -> Result<Self, OpError> {
        let kind = info.kind();
        let kernel = handle.backend().create_kernel(&info)?;
        let workspace_size = kernel.workspace_size();
        tracing::debug!(
            op = %kind,
            device = %handle.device(),
            device_id = handle.device_id(),
            workspace_size,
            "descriptor created"
        );
        Ok(Self {
            kind,
            device: handle.device(),
            device_id: handle.device_id(),
            workspace_size,
            output_spans: outputs.iter().map(|d| d.span_bytes()).collect(),
            input_spans: inputs.iter().map(|d| d.span_bytes()).collect(),
            kernel,
        })
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn device(&self) -> DeviceType {
        self.device
    }

    pub fn device_id(&self) -> usize {
        self.device_id
    }

    /// Scratch bytes `execute` requires.
    pub fn workspace_size(&self) -> usize {
        self.workspace_size
    }

    /// Runs the operator on raw buffers.
    ///
    /// Each buffer starts at its tensor's lowest reachable element (see
    /// [`tensor_core::Tensor`]). Nothing is computed unless every check passes.
    ///
    /// # Errors
    /// - [`OpError::InsufficientWorkspace`] if `workspace` is shorter than
    ///   [`workspace_size`](Self::workspace_size).
    /// - [`OpError::BadParam`] on a wrong buffer count, a buffer shorter than
    ///   its tensor, or a stream from another device.
    /// - Operator-specific execution failures from the backend.
    pub fn execute(
        &self,
        workspace: &mut [u8],
        outputs: &mut [&mut [u8]],
        inputs: &[&[u8]],
        stream: Option<&Stream>,
    ) -> Result<(), OpError> {
        let op = self.kind.as_str();
        if workspace.len() < self.workspace_size {
            return Err(OpError::InsufficientWorkspace {
                required: self.workspace_size,
                provided: workspace.len(),
            });
        }
        if let Some(stream) = stream {
            if stream.device() != self.device || stream.device_id() != self.device_id {
                return Err(OpError::bad_param(
                    op,
                    format!(
                        "stream on {}:{} cannot run a descriptor created on {}:{}",
                        stream.device(),
                        stream.device_id(),
                        self.device,
                        self.device_id
                    ),
                ));
            }
        }
        check_buffers(op, "output", outputs.iter().map(|b| b.len()), &self.output_spans)?;
        check_buffers(op, "input", inputs.iter().map(|b| b.len()), &self.input_spans)?;

        tracing::trace!(op, workspace = workspace.len(), "execute");
        self.kernel.launch(workspace, outputs, inputs)
    }

    /// Releases the descriptor and its backend state.
    pub fn destroy(self) {
        tracing::debug!(op = %self.kind, device = %self.device, "descriptor destroyed");
    }
}

fn check_buffers(
    op: &'static str,
    role: &str,
    lens: impl ExactSizeIterator<Item = usize>,
    spans: &[usize],
) -> Result<(), OpError> {
    if lens.len() != spans.len() {
        return Err(OpError::bad_param(
            op,
            format!("expected {} {role} buffer(s), got {}", spans.len(), lens.len()),
        ));
    }
    for (i, (len, &span)) in lens.zip(spans).enumerate() {
        if len < span {
            return Err(OpError::bad_param(
                op,
                format!("{role} {i} has {len} bytes but its layout spans {span}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_kind_names() {
        for k in OpKind::ALL {
            assert_eq!(k.to_string().parse::<OpKind>().unwrap(), k);
        }
        assert_eq!("rms-norm".parse::<OpKind>().unwrap(), OpKind::RmsNorm);
        assert_eq!("Causal-Softmax".parse::<OpKind>().unwrap(), OpKind::CausalSoftmax);
        assert!("conv".parse::<OpKind>().is_err());
    }

    #[test]
    fn test_check_buffers() {
        assert!(check_buffers("t", "input", [8usize, 4].into_iter(), &[8, 4]).is_ok());
        assert!(check_buffers("t", "input", [8usize].into_iter(), &[8, 4]).is_err());
        let err = check_buffers("t", "output", [3usize].into_iter(), &[4]).unwrap_err();
        assert!(matches!(err, OpError::BadParam { .. }));
    }
}
