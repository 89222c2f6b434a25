use std::fs;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;

use blogdrop::dates::parse_date_time;
use blogdrop::render::render_post;

use crate::PreviewArgs;

pub fn preview_cmd(args: PreviewArgs) -> Result<()> {
    let content = fs::read_to_string(&args.content_file)
        .with_context(|| format!("Error reading {}", args.content_file))?;

    let date = match args.date {
        Some(ref date) => parse_date_time(date).map_err(|e| anyhow!(e))?,
        None => Utc::now(),
    };

    let html = render_post(&args.title, &content, &date);
    match args.out_file {
        Some(path) => {
            fs::write(&path, html).with_context(|| format!("Error writing {}", path))?;
            println!("Preview written to {}", path);
        }
        None => println!("{}", html),
    }
    Ok(())
}
