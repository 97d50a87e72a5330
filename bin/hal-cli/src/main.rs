// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # hal
//!
//! Command-line interface for the operator runtime.
//!
//! ## Usage
//! ```bash
//! # Show how an elementwise operator indexes each operand
//! hal plan --output 2,3 --input 2,3:1,2 --input 3
//!
//! # Plan and verify a strided copy on the CPU backend
//! hal rearrange --shape 2,3,4 --dst-strides 12,4,1 --src-strides 1,2,6 --dtype f16
//!
//! # Time an operator
//! hal bench --op rms-norm --shape 32,4096 --iterations 200
//!
//! # List the backends a configuration registers
//! hal --config runtime.toml devices
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hal",
    about = "Strided tensor operators behind a device-neutral descriptor API",
    version,
    author
)]
struct Cli {
    /// Path to a TOML runtime configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the elementwise index plan for an output and its inputs as JSON.
    Plan {
        /// Output layout as SHAPE[:STRIDES], e.g. "2,3" or "2,3:4,1".
        #[arg(short, long)]
        output: String,

        /// Input layout as SHAPE[:STRIDES]. Repeat once per input.
        #[arg(short, long, required = true)]
        input: Vec<String>,

        /// Element type shared by every tensor.
        #[arg(short, long, default_value = "f32")]
        dtype: String,
    },

    /// Plan a strided copy, run it on the CPU with random data and verify it.
    Rearrange {
        /// Logical shape, e.g. "2,3,4".
        #[arg(short, long)]
        shape: String,

        /// Destination strides in elements.
        #[arg(long, allow_hyphen_values = true)]
        dst_strides: String,

        /// Source strides in elements.
        #[arg(long, allow_hyphen_values = true)]
        src_strides: String,

        /// Element type.
        #[arg(short, long, default_value = "f32")]
        dtype: String,
    },

    /// Measure mean execute latency of one operator on contiguous tensors.
    Bench {
        /// Operator: rearrange, add, swiglu, rms-norm, causal-softmax.
        #[arg(long)]
        op: String,

        /// Shape of the operator's primary tensor.
        #[arg(short, long)]
        shape: String,

        /// Float element type.
        #[arg(short, long, default_value = "f32")]
        dtype: String,

        /// Timed executions after one warm-up run.
        #[arg(short = 'n', long, default_value_t = 100)]
        iterations: usize,
    },

    /// List the backends registered by the loaded configuration.
    Devices,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan {
            output,
            input,
            dtype,
        } => commands::plan::execute(output, input, dtype),
        Commands::Rearrange {
            shape,
            dst_strides,
            src_strides,
            dtype,
        } => commands::rearrange::execute(cli.config, shape, dst_strides, src_strides, dtype),
        Commands::Bench {
            op,
            shape,
            dtype,
            iterations,
        } => commands::bench::execute(cli.config, op, shape, dtype, iterations),
        Commands::Devices => commands::devices::execute(cli.config),
    }
}
