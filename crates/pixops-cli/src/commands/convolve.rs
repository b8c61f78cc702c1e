//! Convolve command

use crate::ConvolveArgs;
use anyhow::{bail, Result};
use pixops_ops::{EdgePolicy, Kernel, Operation};

pub fn run(args: ConvolveArgs, verbose: bool) -> Result<()> {
    let edge: EdgePolicy = args.edge.parse()?;
    let kernel = build_kernel(args.kernel.as_deref(), args.weights, args.alpha_blend)?;

    if verbose {
        println!("Kernel {}x{} (alpha blend {}), edges {:?}", kernel.size, kernel.size, kernel.alpha_blend_factor, edge);
    }

    super::process(&args.input, Operation::Convolve { kernel, edge }, &args.out, verbose)?;
    Ok(())
}

/// Resolves `--kernel`/`--weights`, applying `--alpha-blend` to either.
fn build_kernel(name: Option<&str>, weights: Option<Vec<f32>>, alpha_blend: Option<f32>) -> Result<Kernel> {
    let kernel = match (name, weights) {
        (Some(name), _) => Kernel::named(name)?,
        (None, Some(weights)) => Kernel::from_weights(weights, 0.0)?,
        (None, None) => bail!("Either --kernel or --weights is required"),
    };
    Ok(match alpha_blend {
        Some(factor) => kernel.with_alpha_blend(factor)?,
        None => kernel,
    })
}
