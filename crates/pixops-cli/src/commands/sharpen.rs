//! Sharpen command

use crate::SharpenArgs;
use anyhow::Result;
use pixops_ops::{EdgePolicy, Kernel, Operation};

pub fn run(args: SharpenArgs, verbose: bool) -> Result<()> {
    let edge: EdgePolicy = args.edge.parse()?;

    // Truncate is the plain sharpen; clamp needs the explicit kernel form.
    let op = match edge {
        EdgePolicy::Truncate => Operation::Sharpen,
        EdgePolicy::Clamp => Operation::Convolve {
            kernel: Kernel::sharpen(),
            edge,
        },
    };

    super::process(&args.input, op, &args.out, verbose)?;
    Ok(())
}
