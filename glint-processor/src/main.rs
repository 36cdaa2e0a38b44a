use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: glint-processor <input.gltf> <output.gscn>");
        return Ok(());
    }

    let input = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);

    println!("Conditioning {}...", input.display());
    glint_forge::convert(&input, &output)
        .with_context(|| format!("conversion of {} failed", input.display()))?;
    println!("Saved to {}", output.display());

    Ok(())
}
