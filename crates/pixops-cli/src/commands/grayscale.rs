//! Grayscale command

use crate::GrayscaleArgs;
use anyhow::Result;
use pixops_ops::Operation;

pub fn run(args: GrayscaleArgs, verbose: bool) -> Result<()> {
    super::process(&args.input, Operation::Grayscale, &args.out, verbose)?;
    Ok(())
}
