use std::fs;

use anyhow::{Context, Result};

use crate::SampleConfigArgs;

fn get_sample_cfg() -> &'static str {
    include_str!("../../../blogdrop.toml")
}

pub fn sample_config_cmd(args: SampleConfigArgs) -> Result<()> {
    let sample_cfg = get_sample_cfg();
    match args.out_file {
        Some(path) => {
            fs::write(&path, sample_cfg).with_context(|| format!("Error writing sample config to {}", path))?;
            println!("Sample config written to {}", path);
        }
        None => print!("{}", sample_cfg),
    }
    Ok(())
}
