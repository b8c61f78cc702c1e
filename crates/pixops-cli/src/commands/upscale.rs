//! Upscale command

use crate::UpscaleArgs;
use anyhow::Result;
use pixops_ops::{Filter, Operation, ScaleFactor};

pub fn run(args: UpscaleArgs, verbose: bool) -> Result<()> {
    let op = Operation::Resample {
        factor: ScaleFactor::new(args.ratio)?,
        filter: args.filter.parse::<Filter>()?,
    };

    if verbose {
        println!("Scaling {} by {}", args.input.display(), args.ratio);
    }

    super::process(&args.input, op, &args.out, verbose)?;
    Ok(())
}
