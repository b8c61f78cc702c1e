//! Crop command

use crate::CropArgs;
use anyhow::Result;
use pixops_ops::Operation;

pub fn run(args: CropArgs, verbose: bool) -> Result<()> {
    let op = Operation::Crop {
        a: args.from,
        b: args.to,
    };
    super::process(&args.input, op, &args.out, verbose)?;
    Ok(())
}
